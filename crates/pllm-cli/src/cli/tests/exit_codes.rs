//! Parse failures map to the fatal exit code, not the chunk-failure one.

use crate::cli::{parse_error_exit_code, Cli, EXIT_CHUNKS_FAILED, EXIT_FATAL};
use clap::Parser;

fn exit_code_for(args: &[&str]) -> i32 {
    match Cli::try_parse_from(args) {
        Ok(_) => panic!("expected {:?} to fail parsing", args),
        Err(e) => parse_error_exit_code(&e),
    }
}

#[test]
fn non_numeric_lines_is_fatal() {
    assert_eq!(exit_code_for(&["pllm", "-l", "abc", "in.txt"]), EXIT_FATAL);
}

#[test]
fn missing_input_is_fatal() {
    assert_eq!(exit_code_for(&["pllm"]), EXIT_FATAL);
    assert_eq!(exit_code_for(&["pllm", "-c", "4"]), EXIT_FATAL);
}

#[test]
fn unknown_flag_is_fatal() {
    assert_eq!(exit_code_for(&["pllm", "--bogus", "in.txt"]), EXIT_FATAL);
}

#[test]
fn help_and_version_exit_zero() {
    assert_eq!(exit_code_for(&["pllm", "--help"]), 0);
    assert_eq!(exit_code_for(&["pllm", "--version"]), 0);
}

#[test]
fn usage_errors_never_look_like_chunk_failures() {
    for args in [
        &["pllm", "-l", "abc", "in.txt"][..],
        &["pllm"][..],
        &["pllm", "--completions", "bash", "in.txt"][..],
    ] {
        assert_ne!(exit_code_for(args), EXIT_CHUNKS_FAILED, "{:?}", args);
    }
}
