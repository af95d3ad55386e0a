//! Progress tracking for a dispatch run.
//!
//! A single consumer owns all counters: it folds [`ChunkEvent`]s into a
//! [`ProgressTracker`] and publishes [`ProgressSnapshot`]s for the CLI. The
//! dispatcher never touches this state directly.
//!
//! [`ChunkEvent`]: crate::dispatch::ChunkEvent

mod tracker;
mod worker;

pub use tracker::{ProgressSnapshot, ProgressTracker, RetryInfo};
pub use worker::run_progress_loop;
