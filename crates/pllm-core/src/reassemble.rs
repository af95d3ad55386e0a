//! Ordered reassembly of per-chunk Result files.
//!
//! Completion order is arbitrary, so the output order comes only from the
//! index encoded in each file name, sorted numerically (`10` after `9`).

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::storage;

/// Line written between consecutive chunk bodies.
pub const SEPARATOR: &str = "---\n";

/// Result files in `dir`, ascending by chunk index. Files whose names do not
/// parse as `<index>.out` are skipped.
pub fn ordered_result_files(dir: &Path) -> Result<Vec<(usize, PathBuf)>, PipelineError> {
    let entries = fs::read_dir(dir).map_err(|e| PipelineError::io("list results", dir, e))?;
    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PipelineError::io("list results", dir, e))?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name();
        let Some(index) = name.to_str().and_then(storage::parse_result_index) else {
            continue;
        };
        found.push((index, entry.path()));
    }
    found.sort_by_key(|(index, _)| *index);
    Ok(found)
}

/// Stream every Result in `dir` to `out` in index order, separated by
/// [`SEPARATOR`]. Returns the number of Results written.
pub fn stream_ordered_outputs<W: Write>(dir: &Path, out: &mut W) -> Result<usize, PipelineError> {
    let files = ordered_result_files(dir)?;
    for (i, (_, path)) in files.iter().enumerate() {
        if i > 0 {
            out.write_all(SEPARATOR.as_bytes())
                .map_err(|e| PipelineError::io("write output", "<output>", e))?;
        }
        let mut f = File::open(path).map_err(|e| PipelineError::io("open result", path, e))?;
        io::copy(&mut f, out).map_err(|e| PipelineError::io("copy result", path, e))?;
    }
    out.flush()
        .map_err(|e| PipelineError::io("flush output", "<output>", e))?;
    Ok(files.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn orders_by_index_with_separators_between() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "2.out", "two\n");
        write(dir.path(), "0.out", "zero\n");
        write(dir.path(), "1.out", "one\n");

        let mut out = Vec::new();
        let n = stream_ordered_outputs(dir.path(), &mut out).unwrap();
        assert_eq!(n, 3);
        assert_eq!(String::from_utf8(out).unwrap(), "zero\n---\none\n---\ntwo\n");
    }

    #[test]
    fn numeric_not_lexicographic() {
        let dir = tempfile::tempdir().unwrap();
        for i in [10, 9, 1, 100, 2] {
            write(dir.path(), &format!("{}.out", i), &format!("{}\n", i));
        }
        let order: Vec<usize> = ordered_result_files(dir.path())
            .unwrap()
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        assert_eq!(order, vec![1, 2, 9, 10, 100]);
    }

    #[test]
    fn skips_unrelated_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "0.out", "a\n");
        write(dir.path(), "1.out.part", "half-written\n");
        write(dir.path(), "README", "ignore me\n");
        write(dir.path(), "x.out", "ignore me too\n");
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::create_dir(dir.path().join("5.out")).unwrap();

        let mut out = Vec::new();
        assert_eq!(stream_ordered_outputs(dir.path(), &mut out).unwrap(), 1);
        assert_eq!(out, b"a\n");
    }

    #[test]
    fn empty_dir_gives_empty_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        assert_eq!(stream_ordered_outputs(dir.path(), &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn missing_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        let err = stream_ordered_outputs(&dir.path().join("gone"), &mut out).unwrap_err();
        assert!(matches!(err, PipelineError::Io { op: "list results", .. }));
    }
}
