//! End-to-end run: segment → dispatch → reassemble inside scoped run dirs.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::config::RunParams;
use crate::dispatch::{self, DispatchConfig, DispatchSummary, EventSink};
use crate::error::ConfigError;
use crate::progress::{self, ProgressSnapshot, ProgressTracker};
use crate::reassemble;
use crate::segmenter::{self, STDIN_LABEL};
use crate::storage::RunDirs;

static RUN_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Where the text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `-` means standard input; anything else is a path resolved against `cwd`.
    pub fn from_arg(arg: &str, cwd: &Path) -> Self {
        if arg == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(cwd.join(arg))
        }
    }

    /// Label recorded in unit headers and result envelopes.
    pub fn label(&self) -> String {
        match self {
            InputSource::Stdin => STDIN_LABEL.to_string(),
            InputSource::File(p) => p.display().to_string(),
        }
    }

    /// Fails with [`ConfigError::MissingInput`] if the file does not exist.
    pub fn open(&self) -> Result<Box<dyn BufRead + Send>> {
        match self {
            InputSource::Stdin => Ok(Box::new(BufReader::new(io::stdin()))),
            InputSource::File(p) => {
                if !p.is_file() {
                    return Err(ConfigError::MissingInput(p.clone()).into());
                }
                let f = File::open(p).with_context(|| format!("open input {}", p.display()))?;
                Ok(Box::new(BufReader::new(f)))
            }
        }
    }
}

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub dispatch: DispatchSummary,
    /// Result files streamed to the output.
    pub results_written: usize,
    pub peak_running: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn all_succeeded(&self) -> bool {
        self.dispatch.all_succeeded()
    }
}

/// Run the whole pipeline over an already-open reader. Splitting runs on the
/// blocking pool. The run directory is created under `params.work_dir` and
/// removed before returning, on success or error. Progress snapshots go to
/// `progress_tx` when given.
pub async fn run_pipeline<R, W>(
    reader: R,
    source_label: &str,
    params: &RunParams,
    progress_tx: Option<mpsc::Sender<ProgressSnapshot>>,
    out: &mut W,
) -> Result<RunSummary>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    let started = Instant::now();
    let run_id = format!(
        "{}-{}",
        std::process::id(),
        RUN_SEQ.fetch_add(1, Ordering::Relaxed)
    );
    let dirs = RunDirs::create(&params.work_dir, &run_id)?;
    tracing::debug!(run_dir = %dirs.run_dir().display(), "run directories ready");

    let chunks = tokio::task::spawn_blocking({
        let label = source_label.to_string();
        let chunk_dir = dirs.chunk_dir().to_path_buf();
        let chunk_lines = params.chunk_lines;
        move || segmenter::split_into_chunks(reader, &label, chunk_lines, &chunk_dir)
    })
    .await
    .context("split task join")??;
    let total_bytes: usize = chunks.iter().map(|c| c.byte_count).sum();
    let avg_chunk_bytes = if chunks.is_empty() {
        0
    } else {
        (total_bytes as f64 / chunks.len() as f64).round() as u64
    };

    let (sink, events_rx) = EventSink::channel();
    let tracker = ProgressTracker::new(chunks.len(), params.concurrency, avg_chunk_bytes);
    let progress_handle =
        tokio::spawn(progress::run_progress_loop(events_rx, tracker, progress_tx));

    let cfg = DispatchConfig {
        concurrency: params.concurrency,
        command: params.command.clone(),
        template: params.template.clone(),
        instructions: params.instructions.clone(),
        retry: params.retry,
        output_dir: dirs.output_dir().to_path_buf(),
    };
    let dispatch_summary = dispatch::dispatch_all(chunks, cfg, sink).await?;
    let tracker = progress_handle.await.context("progress task join")?;

    let results_written = reassemble::stream_ordered_outputs(dirs.output_dir(), out)?;
    drop(dirs);

    let summary = RunSummary {
        dispatch: dispatch_summary,
        results_written,
        peak_running: tracker.peak_running(),
        elapsed: started.elapsed(),
    };
    tracing::info!(
        chunks = summary.dispatch.total,
        failed = summary.dispatch.failed,
        peak_running = summary.peak_running,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "run completed"
    );
    if !summary.dispatch.failed_indices.is_empty() {
        tracing::warn!(failed = ?summary.dispatch.failed_indices, "some chunks failed");
    }
    Ok(summary)
}
