//! Event-folding counters and CLI-friendly snapshots.

use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use crate::dispatch::{ChunkEvent, ChunkStatus};

/// Pending retry of one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryInfo {
    /// 1-based retry number.
    pub retry: u32,
    pub max_retries: u32,
    pub wait: Duration,
}

/// Live counters for one run. Mutated only through [`ProgressTracker::apply`].
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total_chunks: usize,
    concurrency: usize,
    avg_chunk_bytes: u64,
    started_at: Instant,
    started: usize,
    finished: usize,
    failed: usize,
    attempts: u64,
    last_rtt: Option<Duration>,
    running: BTreeSet<usize>,
    retrying: BTreeMap<usize, RetryInfo>,
    peak_running: usize,
}

impl ProgressTracker {
    pub fn new(total_chunks: usize, concurrency: usize, avg_chunk_bytes: u64) -> Self {
        Self {
            total_chunks,
            concurrency,
            avg_chunk_bytes,
            started_at: Instant::now(),
            started: 0,
            finished: 0,
            failed: 0,
            attempts: 0,
            last_rtt: None,
            running: BTreeSet::new(),
            retrying: BTreeMap::new(),
            peak_running: 0,
        }
    }

    pub fn apply(&mut self, event: &ChunkEvent) {
        match *event {
            ChunkEvent::ChunkStarted { index } => {
                self.started += 1;
                self.running.insert(index);
                self.retrying.remove(&index);
                self.peak_running = self.peak_running.max(self.running.len());
            }
            ChunkEvent::AttemptStarted { index, .. } => {
                self.attempts += 1;
                self.retrying.remove(&index);
            }
            ChunkEvent::AttemptFinished { duration, .. } => {
                self.last_rtt = Some(duration);
            }
            ChunkEvent::RetryScheduled {
                index,
                retry,
                max_retries,
                wait,
            } => {
                self.retrying.insert(
                    index,
                    RetryInfo {
                        retry,
                        max_retries,
                        wait,
                    },
                );
            }
            ChunkEvent::ChunkFinished { index, status, .. } => {
                self.finished += 1;
                if status == ChunkStatus::Failed {
                    self.failed += 1;
                }
                self.running.remove(&index);
                self.retrying.remove(&index);
            }
        }
    }

    /// Highest number of chunks seen in flight at once.
    pub fn peak_running(&self) -> usize {
        self.peak_running
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.snapshot_at(self.started_at.elapsed())
    }

    /// Snapshot with an explicit elapsed time (deterministic in tests).
    pub fn snapshot_at(&self, elapsed: Duration) -> ProgressSnapshot {
        ProgressSnapshot {
            total_chunks: self.total_chunks,
            concurrency: self.concurrency,
            avg_chunk_bytes: self.avg_chunk_bytes,
            elapsed,
            started: self.started,
            finished: self.finished,
            failed: self.failed,
            attempts: self.attempts,
            last_rtt: self.last_rtt,
            running_ids: self.running.iter().copied().collect(),
            retrying: self.retrying.iter().map(|(i, r)| (*i, *r)).collect(),
            peak_running: self.peak_running,
        }
    }
}

/// Point-in-time view of a run (CLI-friendly).
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub total_chunks: usize,
    pub concurrency: usize,
    pub avg_chunk_bytes: u64,
    pub elapsed: Duration,
    pub started: usize,
    pub finished: usize,
    pub failed: usize,
    /// Worker invocations so far, retries included.
    pub attempts: u64,
    /// Round-trip of the most recent worker invocation.
    pub last_rtt: Option<Duration>,
    /// Chunks between started and finished, ascending.
    pub running_ids: Vec<usize>,
    /// Chunks waiting out a backoff, ascending by index.
    pub retrying: Vec<(usize, RetryInfo)>,
    pub peak_running: usize,
}

impl ProgressSnapshot {
    pub fn running(&self) -> usize {
        self.running_ids.len()
    }

    /// Finished chunks per second (0 if elapsed is 0).
    pub fn chunks_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.finished as f64 / secs
    }

    /// Estimated seconds remaining (None if nothing has finished yet).
    pub fn eta_secs(&self) -> Option<f64> {
        let remaining = self.total_chunks.saturating_sub(self.finished);
        if remaining == 0 {
            return Some(0.0);
        }
        let rate = self.chunks_per_sec();
        if rate <= 0.0 {
            return None;
        }
        Some(remaining as f64 / rate)
    }

    /// Fraction complete in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total_chunks == 0 {
            return 1.0;
        }
        (self.finished as f64 / self.total_chunks as f64).min(1.0)
    }
}
