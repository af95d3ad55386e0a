//! Streaming splitter: reads lines, flushes a unit file every `chunk_lines` lines.

use std::fs;
use std::io::BufRead;
use std::path::Path;

use crate::error::{ConfigError, PipelineError};

use super::chunk::{count_words, Chunk};
use super::unit::{render_with_header, sha256_hex, UnitHeader};

/// Errors from splitting: bad parameters are rejected before the first read.
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Split `reader` into chunks of `chunk_lines` lines and write each one to
/// `chunk_dir` as a unit file. Returns the descriptors in index order.
///
/// `\n` and `\r\n` both end a line. Empty input produces no chunks.
pub fn split_into_chunks<R: BufRead>(
    reader: R,
    source_label: &str,
    chunk_lines: usize,
    chunk_dir: &Path,
) -> Result<Vec<Chunk>, SplitError> {
    if chunk_lines == 0 {
        return Err(ConfigError::InvalidChunkLines(chunk_lines).into());
    }
    fs::create_dir_all(chunk_dir)
        .map_err(|e| PipelineError::io("create chunk dir", chunk_dir, e))?;

    let mut chunks = Vec::new();
    let mut buffer: Vec<String> = Vec::with_capacity(chunk_lines);
    let mut line_number = 0u64;
    let mut range_start = 1u64;

    for line in reader.lines() {
        let line = line.map_err(|e| PipelineError::io("read input", source_label, e))?;
        line_number += 1;
        buffer.push(line);
        if buffer.len() >= chunk_lines {
            let chunk = write_chunk(
                chunk_dir,
                &buffer,
                chunks.len(),
                source_label,
                range_start,
                line_number,
            )?;
            chunks.push(chunk);
            buffer.clear();
            range_start = line_number + 1;
        }
    }

    if !buffer.is_empty() {
        let chunk = write_chunk(
            chunk_dir,
            &buffer,
            chunks.len(),
            source_label,
            range_start,
            line_number,
        )?;
        chunks.push(chunk);
    }

    tracing::debug!(
        source = source_label,
        lines = line_number,
        chunks = chunks.len(),
        "input split into chunks"
    );
    Ok(chunks)
}

fn write_chunk(
    chunk_dir: &Path,
    lines: &[String],
    index: usize,
    source_label: &str,
    line_start: u64,
    line_end: u64,
) -> Result<Chunk, PipelineError> {
    let mut body = lines.join("\n");
    body.push('\n');
    let body_sha256 = sha256_hex(body.as_bytes());
    let word_count = count_words(&body);
    let byte_count = body.len();

    let doc = render_with_header(
        &UnitHeader {
            source_label,
            line_start,
            line_end,
            index,
            line_count: lines.len(),
            word_count,
            byte_count,
            body_sha256: &body_sha256,
        },
        &body,
    );
    let unit_sha256 = sha256_hex(doc.as_bytes());
    let path = chunk_dir.join(format!("{}.txt", unit_sha256));
    fs::write(&path, doc.as_bytes()).map_err(|e| PipelineError::io("write chunk", &path, e))?;

    Ok(Chunk {
        index,
        source_label: source_label.to_string(),
        line_start,
        line_end,
        line_count: lines.len(),
        word_count,
        byte_count,
        body_sha256,
        unit_sha256,
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmenter::body_from_unit;
    use std::io::Cursor;

    fn numbered_input(lines: usize) -> String {
        (1..=lines).map(|i| format!("line {}\n", i)).collect()
    }

    fn split(input: &str, k: usize, dir: &Path) -> Vec<Chunk> {
        split_into_chunks(Cursor::new(input.to_string()), "stdin", k, dir).unwrap()
    }

    #[test]
    fn chunk_count_and_sizes() {
        for (lines, k) in [(1, 1), (10, 3), (9, 3), (250, 100), (7, 100)] {
            let dir = tempfile::tempdir().unwrap();
            let chunks = split(&numbered_input(lines), k, dir.path());
            assert_eq!(chunks.len(), lines.div_ceil(k), "L={} k={}", lines, k);
            for (i, c) in chunks.iter().enumerate() {
                assert_eq!(c.index, i);
                if i + 1 < chunks.len() {
                    assert_eq!(c.line_count, k);
                } else {
                    assert!(c.line_count >= 1 && c.line_count <= k);
                }
            }
        }
    }

    #[test]
    fn bodies_concatenate_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = numbered_input(23);
        let chunks = split(&input, 5, dir.path());
        let mut rebuilt = String::new();
        for c in &chunks {
            let doc = fs::read_to_string(&c.path).unwrap();
            rebuilt.push_str(body_from_unit(&doc).unwrap());
        }
        assert_eq!(rebuilt, input);
    }

    #[test]
    fn line_ranges_for_250_by_100() {
        let dir = tempfile::tempdir().unwrap();
        let chunks = split(&numbered_input(250), 100, dir.path());
        let ranges: Vec<(u64, u64)> = chunks.iter().map(|c| (c.line_start, c.line_end)).collect();
        assert_eq!(ranges, vec![(1, 100), (101, 200), (201, 250)]);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let chunks = split("", 10, dir.path());
        assert!(chunks.is_empty());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn zero_chunk_lines_rejected_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("never-created");
        let err = split_into_chunks(Cursor::new("a\n"), "stdin", 0, &target).unwrap_err();
        assert!(matches!(
            err,
            SplitError::Config(ConfigError::InvalidChunkLines(0))
        ));
        assert!(!target.exists());
    }

    #[test]
    fn crlf_and_missing_final_newline() {
        let dir = tempfile::tempdir().unwrap();
        let chunks = split("a b\r\nc\r\nd", 2, dir.path());
        assert_eq!(chunks.len(), 2);
        let first = fs::read_to_string(&chunks[0].path).unwrap();
        assert_eq!(body_from_unit(&first), Some("a b\nc\n"));
        assert_eq!(chunks[0].word_count, 3);
        assert_eq!(chunks[0].byte_count, 6);
        assert_eq!(chunks[1].line_start, 3);
        assert_eq!(chunks[1].line_end, 3);
    }

    #[test]
    fn digests_are_stable_and_name_the_file() {
        let input = numbered_input(12);
        let d1 = tempfile::tempdir().unwrap();
        let d2 = tempfile::tempdir().unwrap();
        let a = split(&input, 4, d1.path());
        let b = split(&input, 4, d2.path());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.body_sha256, y.body_sha256);
            assert_eq!(x.unit_sha256, y.unit_sha256);
            assert_eq!(
                x.path.file_name().unwrap().to_string_lossy(),
                format!("{}.txt", x.unit_sha256)
            );
            let doc = fs::read(&x.path).unwrap();
            assert_eq!(sha256_hex(&doc), x.unit_sha256);
        }
    }

    #[test]
    fn identical_bodies_get_distinct_units() {
        let dir = tempfile::tempdir().unwrap();
        let chunks = split("same\nsame\n", 1, dir.path());
        assert_eq!(chunks[0].body_sha256, chunks[1].body_sha256);
        assert_ne!(chunks[0].unit_sha256, chunks[1].unit_sha256);
        assert_ne!(chunks[0].path, chunks[1].path);
    }

    #[test]
    fn invalid_utf8_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let bytes: &[u8] = b"ok\n\xff\xfe\n";
        let err = split_into_chunks(bytes, "stdin", 10, dir.path()).unwrap_err();
        assert!(matches!(err, SplitError::Pipeline(PipelineError::Io { .. })));
    }
}
