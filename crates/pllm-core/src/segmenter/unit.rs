//! Work unit document: metadata header, raw body, empty report sections.

use sha2::{Digest, Sha256};

const TEXT_MARKER: &str = "### CHUNK_TEXT\n";
const REPORT_MARKER: &str = "### REPORT_FORMAT\n";

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Everything needed to render one unit document.
pub(super) struct UnitHeader<'a> {
    pub source_label: &'a str,
    pub line_start: u64,
    pub line_end: u64,
    pub index: usize,
    pub line_count: usize,
    pub word_count: usize,
    pub byte_count: usize,
    pub body_sha256: &'a str,
}

/// Render the full unit document for `body` (which must end with `\n`).
pub fn render_unit(
    source_label: &str,
    line_start: u64,
    line_end: u64,
    index: usize,
    body: &str,
) -> String {
    let body_sha256 = sha256_hex(body.as_bytes());
    let lines = body.lines().count();
    render_with_header(
        &UnitHeader {
            source_label,
            line_start,
            line_end,
            index,
            line_count: lines,
            word_count: super::count_words(body),
            byte_count: body.len(),
            body_sha256: &body_sha256,
        },
        body,
    )
}

pub(super) fn render_with_header(h: &UnitHeader<'_>, body: &str) -> String {
    let mut doc = String::with_capacity(body.len() + 320);
    doc.push_str("### CHUNK_METADATA\n");
    doc.push_str(&format!("source_file: {}\n", h.source_label));
    doc.push_str(&format!("line_range: {}-{}\n", h.line_start, h.line_end));
    doc.push_str(&format!("chunk_index: {}\n", h.index));
    doc.push_str(&format!("line_count: {}\n", h.line_count));
    doc.push_str(&format!("word_count: {}\n", h.word_count));
    doc.push_str(&format!("byte_count: {}\n", h.byte_count));
    doc.push_str(&format!("chunk_sha256: {}\n", h.body_sha256));
    doc.push_str(TEXT_MARKER);
    doc.push_str(body);
    doc.push_str(REPORT_MARKER);
    doc.push_str(&format!(
        "report_id: {}:{}-{}\n",
        h.source_label, h.line_start, h.line_end
    ));
    doc.push_str("summary: \n");
    doc.push_str("keywords: \n");
    doc
}

/// Extract the raw body from a rendered unit document.
///
/// The body sits between the text and report markers; the report marker is
/// searched from the end so body lines that look like markers are kept.
pub fn body_from_unit(doc: &str) -> Option<&str> {
    let start = doc.find(TEXT_MARKER)? + TEXT_MARKER.len();
    let end = doc.rfind(REPORT_MARKER)?;
    if end < start {
        return None;
    }
    Some(&doc[start..end])
}
