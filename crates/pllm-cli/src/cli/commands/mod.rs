//! CLI command handlers.

mod completions;
mod run;

pub use completions::print_completions;
pub use run::run_chunked;
