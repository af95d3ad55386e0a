//! Integration test: full segment → dispatch → reassemble runs with real
//! shell workers, checking output order, envelopes and run-dir cleanup.
#![cfg(unix)]

use pllm_core::config::{PllmConfig, RunOverrides, RunParams};
use pllm_core::pipeline::run_pipeline;
use std::io::Cursor;
use std::path::Path;
use tempfile::tempdir;

fn numbered_input(lines: usize) -> String {
    (1..=lines).map(|i| format!("line number {}\n", i)).collect()
}

fn params(work_dir: &Path, command: &str, chunk_lines: usize, concurrency: usize, max_retries: u32) -> RunParams {
    RunParams::resolve(
        &PllmConfig::default(),
        RunOverrides {
            chunk_lines: Some(chunk_lines),
            concurrency: Some(concurrency),
            max_retries: Some(max_retries),
            backoff_ms: Some(5),
            command: Some(command.to_string()),
            ..Default::default()
        },
        work_dir.to_path_buf(),
    )
    .expect("valid params")
}

#[tokio::test]
async fn three_chunks_reassembled_in_line_order() {
    let work = tempdir().unwrap();
    let p = params(work.path(), "echo 'A fixed summary.'", 100, 3, 0);
    let mut out = Vec::new();

    let summary = run_pipeline(Cursor::new(numbered_input(250)), "input.txt", &p, None, &mut out)
        .await
        .expect("pipeline run");

    assert!(summary.all_succeeded());
    assert_eq!(summary.dispatch.total, 3);
    assert_eq!(summary.results_written, 3);

    let text = String::from_utf8(out).unwrap();
    let blocks: Vec<&str> = text.split("---\n").collect();
    assert_eq!(blocks.len(), 3, "two separators expected, got:\n{}", text);
    assert!(blocks[0].starts_with("input.txt:1-100: (summarizing 300 words, "));
    assert!(blocks[1].starts_with("input.txt:101-200: (summarizing 300 words, "));
    assert!(blocks[2].starts_with("input.txt:201-250: (summarizing 150 words, "));
    for b in &blocks {
        assert!(b.ends_with("bytes)\nA fixed summary.\n"), "bad block: {:?}", b);
    }
    assert_eq!(text.matches("---\n").count(), 2);
}

#[tokio::test]
async fn worker_sees_the_unit_file() {
    let work = tempdir().unwrap();
    // Print the chunk range straight out of the unit header.
    let p = params(work.path(), "grep '^line_range:' \"$BUFFER\"", 2, 2, 0);
    let mut out = Vec::new();

    run_pipeline(Cursor::new(numbered_input(5)), "stdin", &p, None, &mut out)
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    let ranges: Vec<&str> = text
        .lines()
        .filter(|l| l.starts_with("line_range:"))
        .collect();
    assert_eq!(ranges, vec!["line_range: 1-2", "line_range: 3-4", "line_range: 5-5"]);
}

#[tokio::test]
async fn completion_order_does_not_affect_output_order() {
    let work = tempdir().unwrap();
    // Earlier chunks sleep longer, so they finish last.
    let cmd = "idx=$(sed -n 's/^chunk_index: //p' \"$BUFFER\"); sleep 0.$(( 5 - idx )); echo \"chunk $idx\"";
    let p = params(work.path(), cmd, 1, 5, 0);
    let mut out = Vec::new();

    run_pipeline(Cursor::new(numbered_input(5)), "stdin", &p, None, &mut out)
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    let order: Vec<&str> = text.lines().filter(|l| l.starts_with("chunk ")).collect();
    assert_eq!(order, vec!["chunk 0", "chunk 1", "chunk 2", "chunk 3", "chunk 4"]);
}

#[tokio::test]
async fn failed_chunk_keeps_its_slot_and_others_continue() {
    let work = tempdir().unwrap();
    // Chunk 1 always fails; the rest succeed.
    let cmd = "if grep -q '^chunk_index: 1$' \"$BUFFER\"; then echo bad; echo worse >&2; exit 2; fi; echo good";
    let p = params(work.path(), cmd, 1, 2, 1);
    let mut out = Vec::new();

    let summary = run_pipeline(Cursor::new(numbered_input(3)), "stdin", &p, None, &mut out)
        .await
        .unwrap();

    assert!(!summary.all_succeeded());
    assert_eq!(summary.dispatch.failed_indices, vec![1]);
    let text = String::from_utf8(out).unwrap();
    let blocks: Vec<&str> = text.split("---\n").collect();
    assert_eq!(blocks.len(), 3);
    assert!(blocks[0].ends_with("\ngood\n"));
    assert!(blocks[1].starts_with("FAILED: chunk 1 could not be completed successfully after 2 attempts."));
    assert!(blocks[1].contains("----- STDOUT -----\nbad\n"));
    assert!(blocks[1].contains("----- STDERR -----\nworse\n"));
    assert!(blocks[2].ends_with("\ngood\n"));
}

#[tokio::test]
async fn empty_input_produces_empty_output() {
    let work = tempdir().unwrap();
    let p = params(work.path(), "echo never", 10, 4, 0);
    let mut out = Vec::new();

    let summary = run_pipeline(Cursor::new(String::new()), "stdin", &p, None, &mut out)
        .await
        .unwrap();

    assert_eq!(summary.dispatch.total, 0);
    assert_eq!(summary.results_written, 0);
    assert!(out.is_empty());
}

#[tokio::test]
async fn run_directory_is_removed_afterwards() {
    let work = tempdir().unwrap();
    let p = params(work.path(), "echo ok", 4, 2, 0);
    let mut out = Vec::new();

    run_pipeline(Cursor::new(numbered_input(9)), "stdin", &p, None, &mut out)
        .await
        .unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(work.path()).unwrap().collect();
    assert!(leftovers.is_empty(), "run dir not cleaned up: {:?}", leftovers);
}

#[tokio::test]
async fn progress_snapshots_reach_the_caller() {
    let work = tempdir().unwrap();
    let p = params(work.path(), "echo ok", 1, 2, 0);
    let (tx, mut rx) = tokio::sync::mpsc::channel(1024);
    let mut out = Vec::new();

    let summary = run_pipeline(Cursor::new(numbered_input(4)), "stdin", &p, Some(tx), &mut out)
        .await
        .unwrap();

    let mut last = None;
    while let Some(s) = rx.recv().await {
        assert!(s.running() <= 2);
        last = Some(s);
    }
    let last = last.expect("at least one snapshot");
    assert_eq!(last.finished, 4);
    assert_eq!(last.total_chunks, 4);
    assert!(summary.peak_running <= 2);
}
