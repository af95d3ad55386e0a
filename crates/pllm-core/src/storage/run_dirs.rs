//! Scoped per-run work directories, removed when the guard is dropped.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// `<root>/run-<id>/{chunks,outputs}`. Created fresh by [`RunDirs::create`];
/// the whole run directory is deleted on drop, whichever way the run ends.
#[derive(Debug)]
pub struct RunDirs {
    run_dir: PathBuf,
    chunk_dir: PathBuf,
    output_dir: PathBuf,
}

impl RunDirs {
    /// Create the run directory under `root`, wiping any leftovers from an
    /// earlier run with the same id so stale results cannot be reassembled.
    pub fn create(root: &Path, run_id: &str) -> Result<Self, PipelineError> {
        let run_dir = root.join(format!("run-{}", run_id));
        if run_dir.exists() {
            tracing::debug!(path = %run_dir.display(), "removing stale run directory");
            fs::remove_dir_all(&run_dir)
                .map_err(|e| PipelineError::io("remove stale run dir", &run_dir, e))?;
        }
        let chunk_dir = run_dir.join("chunks");
        let output_dir = run_dir.join("outputs");
        for dir in [&chunk_dir, &output_dir] {
            fs::create_dir_all(dir).map_err(|e| PipelineError::io("create dir", dir, e))?;
        }
        Ok(Self {
            run_dir,
            chunk_dir,
            output_dir,
        })
    }

    /// Directory holding work unit files.
    pub fn chunk_dir(&self) -> &Path {
        &self.chunk_dir
    }

    /// Directory holding `<index>.out` result files.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }
}

impl Drop for RunDirs {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.run_dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.run_dir.display(), "could not remove run dir: {}", e);
            }
        }
    }
}
