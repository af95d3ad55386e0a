use pllm_core::logging;

mod cli;

use crate::cli::{Cli, EXIT_FATAL};

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible; stdout is reserved for results.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    match Cli::run_from_args().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("pllm error: {:#}", err);
            std::process::exit(EXIT_FATAL);
        }
    }
}
