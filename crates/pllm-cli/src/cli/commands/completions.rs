//! `pllm --completions <shell>`: print a completion script to stdout.

use clap_complete::{generate, Shell};
use std::io;

pub fn print_completions(shell: Shell, cmd: &mut clap::Command) {
    let name = cmd.get_name().to_string();
    generate(shell, cmd, name, &mut io::stdout());
}
