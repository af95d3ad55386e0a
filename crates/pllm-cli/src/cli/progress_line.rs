//! Single-line progress display on stderr.
//!
//! Redrawn on every snapshot and on a fixed tick so the spinner and elapsed
//! time keep moving while workers are busy. Cleared when the run ends.

use pllm_core::progress::ProgressSnapshot;
use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const TICK: Duration = Duration::from_millis(120);
const MAX_RUNNING_IDS: usize = 8;
const MAX_RETRY_ENTRIES: usize = 4;

/// Draw snapshots from `rx` until the sender side closes, then clear the line.
pub fn spawn_renderer(mut rx: mpsc::Receiver<ProgressSnapshot>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut line = StatusLine::new(io::stderr().is_terminal());
        let started = Instant::now();
        let mut last: Option<ProgressSnapshot> = None;
        let mut tick = tokio::time::interval(TICK);
        loop {
            tokio::select! {
                msg = rx.recv() => match msg {
                    Some(s) => last = Some(s),
                    None => break,
                },
                _ = tick.tick() => {}
            }
            if let Some(ref s) = last {
                line.draw(s, started.elapsed());
            }
        }
        line.clear();
    })
}

struct StatusLine {
    color: bool,
    frame: usize,
    last_len: usize,
}

impl StatusLine {
    fn new(color: bool) -> Self {
        Self {
            color,
            frame: 0,
            last_len: 0,
        }
    }

    fn draw(&mut self, s: &ProgressSnapshot, elapsed: Duration) {
        let spinner = SPINNER_FRAMES[self.frame % SPINNER_FRAMES.len()];
        self.frame += 1;
        let (plain, colored) = render_line(s, elapsed, spinner, self.color);
        let visible = plain.chars().count();
        let pad = " ".repeat(self.last_len.saturating_sub(visible));
        let mut err = io::stderr().lock();
        let _ = write!(err, "\r{}{}", colored, pad);
        let _ = err.flush();
        self.last_len = self.last_len.max(visible);
    }

    fn clear(&mut self) {
        let mut err = io::stderr().lock();
        let _ = write!(err, "\r\x1b[2K\r");
        let _ = err.flush();
        self.last_len = 0;
    }
}

/// Returns the line without escapes (for width math) and the line to print.
fn render_line(
    s: &ProgressSnapshot,
    elapsed: Duration,
    spinner: &str,
    color: bool,
) -> (String, String) {
    let rtt = s
        .last_rtt
        .map(|d| format_ms(d.as_millis() as u64))
        .unwrap_or_else(|| "-".to_string());
    let running: Vec<String> = s.running_ids.iter().map(|i| i.to_string()).collect();
    let retrying: Vec<String> = s
        .retrying
        .iter()
        .map(|(i, r)| {
            format!(
                "{}:{}/{}@{}",
                i,
                r.retry,
                r.max_retries,
                format_ms(r.wait.as_millis() as u64)
            )
        })
        .collect();

    let parts: [(String, (u8, u8, u8)); 10] = [
        (format!("{} {}", spinner, format_elapsed_compact(elapsed)), (120, 200, 255)),
        (format!("run {}/{}", s.running(), s.concurrency), (120, 220, 140)),
        (format!("done {}/{}", s.finished, s.total_chunks), (255, 200, 110)),
        (format!("started {}", s.started), (175, 145, 255)),
        (format!("failed {}", s.failed), (255, 110, 110)),
        (format!("avg {}", format_bytes_compact(s.avg_chunk_bytes)), (255, 170, 230)),
        (format!("calls {}", s.attempts), (120, 230, 255)),
        (format!("rtt {}", rtt), (255, 215, 120)),
        (format!("ids [{}]", truncate_list(&running, MAX_RUNNING_IDS)), (150, 210, 255)),
        (format!("retry [{}]", truncate_list(&retrying, MAX_RETRY_ENTRIES)), (255, 170, 120)),
    ];

    let plain = parts
        .iter()
        .map(|(t, _)| t.as_str())
        .collect::<Vec<_>>()
        .join(" | ");
    let colored = if color {
        parts
            .iter()
            .map(|(t, (r, g, b))| format!("\x1b[38;2;{};{};{}m{}\x1b[0m", r, g, b, t))
            .collect::<Vec<_>>()
            .join(" | ")
    } else {
        plain.clone()
    };
    (plain, colored)
}

/// `42s`, `3m5s`, `2h10m`.
pub(crate) fn format_elapsed_compact(d: Duration) -> String {
    let total = d.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{}h{}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// `850ms`, `2s`, `1.5s`.
pub(crate) fn format_ms(ms: u64) -> String {
    if ms < 1000 {
        return format!("{}ms", ms);
    }
    if ms % 1000 == 0 {
        format!("{}s", ms / 1000)
    } else {
        format!("{:.1}s", ms as f64 / 1000.0)
    }
}

/// `512B`, `4.2KB`, `1.0MB`.
pub(crate) fn format_bytes_compact(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes >= MB {
        format!("{:.1}MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1}KB", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

/// Comma-joined list, cut after `max` items with a `+N` tail.
pub(crate) fn truncate_list(items: &[String], max: usize) -> String {
    if items.len() <= max {
        return items.join(",");
    }
    format!("{},+{}", items[..max].join(","), items.len() - max)
}
