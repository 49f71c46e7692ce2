// Shell command runner - executes one shutdown step under its timeout

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

use deadman_core::config::ShutdownCommand;
use deadman_core::port::{CommandRunner, RunOutcome};

/// Spawns the configured program with nulled stdio and waits under the
/// command's own timeout. Exactly one attempt; a command still running at
/// the deadline is killed and reported as timed out.
pub struct ShellCommandRunner;

impl ShellCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ShellCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run(&self, command: &ShutdownCommand) -> RunOutcome {
        info!(command = %command.display_line(), "Executing command");

        let child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        let mut child = match child {
            Ok(c) => c,
            Err(e) => {
                warn!(command = %command.display_line(), error = %e, "Spawn failed");
                return RunOutcome::SpawnFailed;
            }
        };

        match timeout(command.timeout(), child.wait()).await {
            Ok(Ok(status)) if status.success() => RunOutcome::Success,
            Ok(Ok(status)) => RunOutcome::Failed {
                exit_code: status.code(),
            },
            Ok(Err(e)) => {
                warn!(command = %command.display_line(), error = %e, "Wait failed");
                RunOutcome::SpawnFailed
            }
            Err(_) => RunOutcome::TimedOut,
        }
    }
}
