//! CLI for pllm.

mod commands;
mod progress_line;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use pllm_core::config::{self, RunOverrides};
use std::path::PathBuf;

use commands::{print_completions, run_chunked};

/// Exit code for usage, configuration and infrastructure errors.
pub const EXIT_FATAL: i32 = 1;

/// Exit code when the run finished but at least one chunk failed.
pub const EXIT_CHUNKS_FAILED: i32 = 2;

/// Exit code for a clap parse outcome. `--help` and `--version` are not
/// failures; every other parse error is fatal, never [`EXIT_CHUNKS_FAILED`].
pub fn parse_error_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => EXIT_FATAL,
    }
}

/// Split a text file into line chunks, run a worker command on every chunk in
/// parallel, and print the worker outputs in input order.
#[derive(Debug, Parser)]
#[command(name = "pllm", version)]
#[command(about = "Parallel chunked command runner", long_about = None)]
pub struct Cli {
    /// Lines per chunk [config default: 100].
    #[arg(short = 'l', long = "lines", value_name = "N")]
    pub lines: Option<usize>,

    /// Maximum chunks processed at once [config default: 10].
    #[arg(short = 'c', long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Template name passed to the worker as $TEMPLATE [config default: chunker].
    #[arg(short = 't', long, value_name = "NAME")]
    pub template: Option<String>,

    /// Retries per chunk after the first attempt [config default: 3].
    #[arg(short = 'r', long, value_name = "N")]
    pub retries: Option<u32>,

    /// Base retry backoff in milliseconds, doubled on each retry [config default: 500].
    #[arg(short = 'b', long, value_name = "MS")]
    pub backoff_ms: Option<u64>,

    /// Worker command template ($BUFFER, $TEMPLATE, $INSTRUCTIONS are substituted).
    #[arg(long, value_name = "CMD")]
    pub command: Option<String>,

    /// Config file to use instead of ~/.config/pllm/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Root directory for temporary chunk and result files.
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Do not draw the progress line on stderr.
    #[arg(long)]
    pub no_progress: bool,

    /// Print a shell completion script and exit.
    #[arg(long, value_name = "SHELL", exclusive = true)]
    pub completions: Option<Shell>,

    /// Input file, or `-` to read standard input.
    #[arg(required_unless_present = "completions")]
    pub input: Option<String>,

    /// Extra instructions for the worker ($INSTRUCTIONS); words are joined with spaces.
    pub instructions: Vec<String>,
}

impl Cli {
    /// Command-line values that override the config file.
    pub fn overrides(&self) -> RunOverrides {
        RunOverrides {
            chunk_lines: self.lines,
            concurrency: self.concurrency,
            template: self.template.clone(),
            instructions: if self.instructions.is_empty() {
                None
            } else {
                Some(self.instructions.join(" "))
            },
            max_retries: self.retries,
            backoff_ms: self.backoff_ms,
            command: self.command.clone(),
            work_dir: self.work_dir.clone(),
        }
    }

    /// Parse arguments, run, and return the process exit code.
    pub async fn run_from_args() -> Result<i32> {
        let cli = match Cli::try_parse() {
            Ok(cli) => cli,
            Err(e) => {
                let _ = e.print();
                return Ok(parse_error_exit_code(&e));
            }
        };

        if let Some(shell) = cli.completions {
            print_completions(shell, &mut Cli::command());
            return Ok(0);
        }

        let cfg = match &cli.config {
            Some(path) => config::load_from_path(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);

        run_chunked(&cli, &cfg).await
    }
}

#[cfg(test)]
mod tests;
