//! Error types shared by the pipeline stages.
//!
//! `ConfigError` is raised before any chunk is produced; `PipelineError`
//! covers infrastructure failures that abort a run. Per-attempt worker
//! failures are not errors at this level: they end up in Result files.

use std::path::PathBuf;

/// Invalid or missing run parameters. Always fatal, always raised before the
/// pipeline touches the work directory.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid chunk line count: {0} (must be a positive integer)")]
    InvalidChunkLines(usize),
    #[error("invalid concurrency: {0} (must be a positive integer)")]
    InvalidConcurrency(usize),
    #[error("invalid backoff: {0}ms (must be a positive integer)")]
    InvalidBackoff(u64),
    #[error("worker command is empty")]
    EmptyCommand,
    #[error("input file not found: {}", .0.display())]
    MissingInput(PathBuf),
    #[error("config file not found: {}", .0.display())]
    MissingConfigFile(PathBuf),
    #[error("parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Infrastructure failure during a run (disk, directories, task join).
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("chunk task did not complete: {0}")]
    TaskJoin(String),
}

impl PipelineError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            op,
            path: path.into(),
            source,
        }
    }
}
