//! Lifecycle events emitted by the dispatcher.
//!
//! Events are immutable values sent over an unbounded channel to a single
//! consumer (the progress tracker or any other observer). Sending never
//! blocks and a dropped receiver is ignored.

use std::time::Duration;
use tokio::sync::mpsc;

/// Terminal status of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
    Success,
    Failed,
}

impl ChunkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkStatus::Success => "success",
            ChunkStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkEvent {
    /// First attempt of a chunk is about to start. Emitted once per chunk.
    ChunkStarted { index: usize },
    /// A worker invocation is starting (`attempt` is 0-based).
    AttemptStarted { index: usize, attempt: u32 },
    /// A worker invocation returned.
    AttemptFinished {
        index: usize,
        attempt: u32,
        duration: Duration,
        success: bool,
    },
    /// The chunk will be retried after `wait`; `retry` is 1-based.
    RetryScheduled {
        index: usize,
        retry: u32,
        max_retries: u32,
        wait: Duration,
    },
    /// Terminal Result written.
    ChunkFinished {
        index: usize,
        status: ChunkStatus,
        attempts: u32,
    },
}

impl ChunkEvent {
    pub fn index(&self) -> usize {
        match self {
            ChunkEvent::ChunkStarted { index }
            | ChunkEvent::AttemptStarted { index, .. }
            | ChunkEvent::AttemptFinished { index, .. }
            | ChunkEvent::RetryScheduled { index, .. }
            | ChunkEvent::ChunkFinished { index, .. } => *index,
        }
    }
}

/// Fire-and-forget sender for [`ChunkEvent`]s. The default sink drops everything.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<ChunkEvent>>,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<ChunkEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Sink plus the receiver its events arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ChunkEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn emit(&self, event: ChunkEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
