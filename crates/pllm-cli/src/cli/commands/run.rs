//! Default action: chunk the input, dispatch, print the reassembled output.

use anyhow::{Context, Result};
use pllm_core::config::{self, PllmConfig, RunParams};
use pllm_core::pipeline::{self, InputSource};
use pllm_core::progress::ProgressSnapshot;
use std::io::{self, IsTerminal};

use crate::cli::progress_line;
use crate::cli::{Cli, EXIT_CHUNKS_FAILED};

/// Resolve parameters, run the pipeline, and map the outcome to an exit code:
/// 0 when every chunk succeeded, [`EXIT_CHUNKS_FAILED`] otherwise.
pub async fn run_chunked(cli: &Cli, cfg: &PllmConfig) -> Result<i32> {
    let default_work_dir =
        config::default_work_dir().unwrap_or_else(|_| std::env::temp_dir().join("pllm-work"));
    let params = RunParams::resolve(cfg, cli.overrides(), default_work_dir)?;

    let input_arg = cli.input.as_deref().context("missing input argument")?;
    let cwd = std::env::current_dir().context("current dir")?;
    let source = InputSource::from_arg(input_arg, &cwd);
    let reader = source.open()?;
    tracing::info!(
        source = %source.label(),
        chunk_lines = params.chunk_lines,
        concurrency = params.concurrency,
        max_retries = params.retry.max_retries,
        "starting run"
    );

    let show_progress = !cli.no_progress && io::stderr().is_terminal();
    let (progress_tx, renderer) = if show_progress {
        let (tx, rx) = tokio::sync::mpsc::channel::<ProgressSnapshot>(64);
        (Some(tx), Some(progress_line::spawn_renderer(rx)))
    } else {
        (None, None)
    };

    let mut stdout = io::stdout().lock();
    let result =
        pipeline::run_pipeline(reader, &source.label(), &params, progress_tx, &mut stdout).await;
    if let Some(handle) = renderer {
        let _ = handle.await;
    }
    let summary = result?;

    if summary.all_succeeded() {
        Ok(0)
    } else {
        eprintln!(
            "pllm: {} of {} chunk(s) failed: {:?}",
            summary.dispatch.failed, summary.dispatch.total, summary.dispatch.failed_indices
        );
        Ok(EXIT_CHUNKS_FAILED)
    }
}
