//! Chunk descriptor.

use std::path::PathBuf;

/// One contiguous range of input lines, already persisted as a work unit file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 0-based position in the input; the only ordering key for reassembly.
    pub index: usize,
    /// Input path, or `stdin`.
    pub source_label: String,
    /// First line, 1-based inclusive.
    pub line_start: u64,
    /// Last line, 1-based inclusive.
    pub line_end: u64,
    pub line_count: usize,
    pub word_count: usize,
    /// UTF-8 length of the body, trailing newline included.
    pub byte_count: usize,
    /// SHA-256 of the raw body.
    pub body_sha256: String,
    /// SHA-256 of the whole unit document; also the file stem.
    pub unit_sha256: String,
    /// Work unit file handed to the worker as `$BUFFER`.
    pub path: PathBuf,
}

impl Chunk {
    /// `source:start-end`, as used in result envelopes and report ids.
    pub fn report_id(&self) -> String {
        format!("{}:{}-{}", self.source_label, self.line_start, self.line_end)
    }
}

/// Number of whitespace-separated tokens.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
