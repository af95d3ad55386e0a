pub mod config;
pub mod error;
pub mod logging;

// Pipeline stages: segmenter → dispatch → reassemble, observed by progress.
pub mod dispatch;
pub mod pipeline;
pub mod progress;
pub mod reassemble;
pub mod retry;
pub mod segmenter;
pub mod storage;
