// Shutdown Escalation - graceful sequence, then unconditional poweroff

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::{MonitorConfig, ShutdownCommand};
use crate::port::{CommandRunner, RunOutcome};

/// The failure-response protocol.
///
/// The graceful sequence (unmount, crypto-close) exists only to reduce
/// data-corruption risk; it never gates whether shutdown happens. The first
/// graceful step that fails, times out, or cannot spawn abandons the rest of
/// the sequence, and the forced poweroff is issued either way. Each command
/// is attempted exactly once. Once invoked live, this ends the process's
/// useful lifetime.
pub struct ShutdownEscalation {
    runner: Arc<dyn CommandRunner>,
    graceful: Vec<ShutdownCommand>,
    poweroff: ShutdownCommand,
    test_mode: bool,
}

impl ShutdownEscalation {
    pub fn new(runner: Arc<dyn CommandRunner>, config: &MonitorConfig) -> Self {
        Self {
            runner,
            graceful: config.graceful_commands.clone(),
            poweroff: config.poweroff_command.clone(),
            test_mode: config.test_mode,
        }
    }

    /// Run the escalation to completion. Not interruptible by design.
    pub async fn execute(&self) {
        if self.test_mode {
            self.dry_run();
            return;
        }

        for (index, command) in self.graceful.iter().enumerate() {
            info!(
                step = index + 1,
                command = %command.display_line(),
                "Running graceful shutdown step"
            );
            let outcome = self.runner.run(command).await;
            if !outcome.is_success() {
                warn!(
                    step = index + 1,
                    command = %command.display_line(),
                    outcome = %outcome,
                    "Graceful step failed, abandoning remaining steps"
                );
                self.force_poweroff().await;
                return;
            }
            info!(step = index + 1, "Graceful shutdown step completed");
        }

        self.force_poweroff().await;
    }

    /// Log what a live run would execute, touching nothing.
    fn dry_run(&self) {
        for (index, command) in self.graceful.iter().enumerate() {
            info!(
                step = index + 1,
                command = %command.display_line(),
                "Test mode: would run graceful shutdown step"
            );
        }
        info!(
            command = %self.poweroff.display_line(),
            "Test mode: would force poweroff"
        );
    }

    async fn force_poweroff(&self) {
        info!(command = %self.poweroff.display_line(), "Issuing forced poweroff");
        let outcome = self.runner.run(&self.poweroff).await;
        if !outcome.is_success() {
            // Terminal action; nothing left to fall back to.
            error!(outcome = %outcome, "Forced poweroff command failed");
        }
    }
}
