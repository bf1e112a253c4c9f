pub mod profiles;

use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

/// Outcome of running an external command to completion (or to a timeout).
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub command: String,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

/// Default wall-clock budget for a single command when the caller doesn't override it.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Run `command` through a shell, collecting complete (non-streamed) stdout/stderr.
///
/// Never returns `Err` — failures are encoded in the returned [`CommandResult`]:
/// a timeout sets `exit_code = -1`, any other spawn/wait failure sets `exit_code = -2`.
pub async fn run_command(command: &str, timeout_secs: Option<u64>) -> CommandResult {
    let effective_timeout = timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
    let started = Instant::now();

    debug!(command, timeout = effective_timeout, "running command");

    let child = Command::new("sh").arg("-c").arg(command).output();

    match tokio::time::timeout(Duration::from_secs(effective_timeout), child).await {
        Ok(Ok(output)) => CommandResult {
            command: command.to_string(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-2),
            duration: started.elapsed(),
        },
        Ok(Err(e)) => {
            warn!(command, error = %e, "command failed to spawn or complete");
            CommandResult {
                command: command.to_string(),
                success: false,
                stdout: String::new(),
                stderr: format!("unexpected error: {}", e),
                exit_code: -2,
                duration: started.elapsed(),
            }
        }
        Err(_) => {
            warn!(command, timeout = effective_timeout, "command timed out");
            CommandResult {
                command: command.to_string(),
                success: false,
                stdout: String::new(),
                stderr: format!("timeout expired after {}s", effective_timeout),
                exit_code: -1,
                duration: started.elapsed(),
            }
        }
    }
}
