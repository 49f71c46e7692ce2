// Command runner port - executes one shutdown step

use async_trait::async_trait;

use crate::config::ShutdownCommand;

/// Outcome of one command attempt.
///
/// There is no error channel: every way a command can go wrong collapses
/// into a non-success outcome, because the escalation policy treats them
/// all identically (abandon the graceful sequence, force poweroff).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    Failed { exit_code: Option<i32> },
    TimedOut,
    SpawnFailed,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success)
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutcome::Success => write!(f, "success"),
            RunOutcome::Failed { exit_code: Some(c) } => write!(f, "exit code {}", c),
            RunOutcome::Failed { exit_code: None } => write!(f, "killed by signal"),
            RunOutcome::TimedOut => write!(f, "timed out"),
            RunOutcome::SpawnFailed => write!(f, "failed to spawn"),
        }
    }
}

/// Command runner port.
///
/// Each command is attempted exactly once under its own timeout; the caller
/// decides what a failure means. Implementations must never retry.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &ShutdownCommand) -> RunOutcome;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Recording runner: scripted outcomes, consumed in order, with every
    /// invocation recorded for assertion.
    pub struct RecordingRunner {
        outcomes: Arc<Mutex<Vec<RunOutcome>>>,
        invocations: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingRunner {
        /// Runner whose every command succeeds.
        pub fn all_success() -> Self {
            Self::scripted(Vec::new())
        }

        /// Runner consuming `outcomes` front-first; once exhausted, every
        /// further command succeeds.
        pub fn scripted(outcomes: Vec<RunOutcome>) -> Self {
            Self {
                outcomes: Arc::new(Mutex::new(outcomes)),
                invocations: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Command lines actually run, in order.
        pub fn invocations(&self) -> Vec<String> {
            self.invocations.lock().unwrap().clone()
        }

        pub fn invocation_count(&self) -> usize {
            self.invocations.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, command: &ShutdownCommand) -> RunOutcome {
            self.invocations
                .lock()
                .unwrap()
                .push(command.display_line());
            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.is_empty() {
                RunOutcome::Success
            } else {
                outcomes.remove(0)
            }
        }
    }
}
