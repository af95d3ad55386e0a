//! Bounded-concurrency dispatcher.
//!
//! Every chunk is driven through the worker command to a terminal Result
//! file: success envelope or failure banner. Up to `concurrency` chunks are in
//! flight; failed attempts are retried with exponential backoff inside the
//! chunk's own task, so a waiting chunk never blocks its siblings.
//!
//! Infrastructure failures (cannot write a Result, task panic) abort the whole
//! dispatch; worker failures never do.

mod chunk_task;
mod envelope;
mod events;
mod invoke;
mod pool;
mod template;

use std::path::PathBuf;

use crate::retry::RetryPolicy;

pub use envelope::{failure_body, success_body};
pub use events::{ChunkEvent, ChunkStatus, EventSink};
pub use invoke::{run_attempt, DispatchAttempt};
pub use pool::dispatch_all;
pub use template::{CommandTemplate, TemplateVars};

/// Everything a chunk task needs besides the chunk itself.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Maximum chunks in flight (values below 1 are treated as 1).
    pub concurrency: usize,
    pub command: CommandTemplate,
    /// Value for `$TEMPLATE`.
    pub template: String,
    /// Value for `$INSTRUCTIONS`.
    pub instructions: String,
    pub retry: RetryPolicy,
    /// Where `<index>.out` result files are written.
    pub output_dir: PathBuf,
}

/// Terminal outcome of one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkOutcome {
    pub index: usize,
    pub status: ChunkStatus,
    /// Attempts made, including the first.
    pub attempts: u32,
}

/// Totals for a finished dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Indices of terminally failed chunks, ascending.
    pub failed_indices: Vec<usize>,
}

impl DispatchSummary {
    fn record(&mut self, outcome: &ChunkOutcome) {
        match outcome.status {
            ChunkStatus::Success => self.succeeded += 1,
            ChunkStatus::Failed => {
                self.failed += 1;
                let pos = self
                    .failed_indices
                    .partition_point(|&i| i < outcome.index);
                self.failed_indices.insert(pos, outcome.index);
            }
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}
