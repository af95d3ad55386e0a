//! Result file bodies.

use crate::segmenter::Chunk;

/// Success envelope: identity line, then the trimmed worker output.
pub fn success_body(chunk: &Chunk, worker_stdout: &str) -> String {
    format!(
        "{}: (summarizing {} words, {} bytes)\n{}\n",
        chunk.report_id(),
        chunk.word_count,
        chunk.byte_count,
        worker_stdout.trim()
    )
}

/// Failure banner with both streams of the last attempt. Both sections are
/// always present, even when the streams are empty.
pub fn failure_body(index: usize, attempts: u32, stdout: &str, stderr: &str) -> String {
    format!(
        "FAILED: chunk {} could not be completed successfully after {} attempts.\n\
         ----- STDOUT -----\n\
         {}\n\
         ----- STDERR -----\n\
         {}\n",
        index, attempts, stdout, stderr
    )
}
