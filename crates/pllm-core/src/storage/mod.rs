//! Disk I/O and file lifecycle for a run.
//!
//! Result files are written to a `.part` temp file and atomically renamed, so
//! the presence of `<index>.out` always means the chunk reached a terminal
//! state. The run directories themselves are owned by [`RunDirs`].

mod run_dirs;

pub use run_dirs::RunDirs;

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::PipelineError;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `3.out` → `3.out.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Extension of per-chunk result files.
pub const RESULT_EXT: &str = "out";

/// `<output_dir>/<index>.out`.
pub fn result_path(output_dir: &Path, index: usize) -> PathBuf {
    output_dir.join(format!("{}.{}", index, RESULT_EXT))
}

/// Chunk index encoded in a result file name, or `None` for anything else
/// (temp files, stray files, non-numeric stems).
pub fn parse_result_index(file_name: &str) -> Option<usize> {
    let stem = file_name.strip_suffix(RESULT_EXT)?.strip_suffix('.')?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

/// Write `data` to `final_path` via temp file + rename.
pub async fn write_atomic(final_path: &Path, data: &[u8]) -> Result<(), PipelineError> {
    let tp = temp_path(final_path);
    fs::write(&tp, data)
        .await
        .map_err(|e| PipelineError::io("write", &tp, e))?;
    fs::rename(&tp, final_path)
        .await
        .map_err(|e| PipelineError::io("rename", final_path, e))?;
    Ok(())
}

/// Remove a file; a file that is already gone is not an error.
pub async fn remove_if_exists(path: &Path) -> Result<(), PipelineError> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PipelineError::io("remove", path, e)),
    }
}
