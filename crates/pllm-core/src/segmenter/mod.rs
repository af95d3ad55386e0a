//! Line-based chunking of an input stream into content-addressed work units.
//!
//! Each chunk is written to `<chunk_dir>/<sha256 of unit document>.txt` as
//! soon as it is complete; the caller gets lightweight descriptors back.

mod chunk;
mod split;
mod unit;

pub use chunk::{count_words, Chunk};
pub use split::{split_into_chunks, SplitError};
pub use unit::{body_from_unit, render_unit, sha256_hex};

/// Label used for chunks read from standard input.
pub const STDIN_LABEL: &str = "stdin";
