//! One worker invocation through the platform shell.

use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

use super::template::TemplateVars;

/// Record of a single invocation, used to decide retry vs. terminate and to
/// build the failure banner. Never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchAttempt {
    pub chunk_index: usize,
    /// 0-based.
    pub attempt: u32,
    /// `None` when the process was killed by a signal or could not be spawned.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl DispatchAttempt {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

/// Run `command` through the shell with stdin closed and both output streams
/// captured. The placeholder values are also exported as `BUFFER`, `TEMPLATE`
/// and `INSTRUCTIONS`. The child is killed if this future is dropped.
///
/// A spawn or wait failure is reported as a failed attempt, with the error
/// text in `stderr`, so it goes through the same retry path as a non-zero exit.
pub async fn run_attempt(
    chunk_index: usize,
    attempt: u32,
    command: &str,
    vars: &TemplateVars,
) -> DispatchAttempt {
    let mut cmd = shell_command(command);
    cmd.envs(vars.pairs())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let started = Instant::now();
    let result = cmd.output().await;
    let duration = started.elapsed();

    match result {
        Ok(output) => DispatchAttempt {
            chunk_index,
            attempt,
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration,
        },
        Err(e) => DispatchAttempt {
            chunk_index,
            attempt,
            exit_code: None,
            stdout: String::new(),
            stderr: format!("failed to run worker command: {}", e),
            duration,
        },
    }
}
