// Monitor configuration - constructed once at startup, immutable thereafter

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::application::constants;
use crate::domain::HostTarget;

/// Configuration validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("host list must not be empty")]
    NoHosts,

    #[error("failure_threshold must be at least 1")]
    ZeroThreshold,

    #[error("cadence_secs must be at least 1")]
    ZeroCadence,

    #[error("reset_failures_after_n_cycles must be at least 1")]
    ZeroResetCycles,

    #[error("probe_timeout_secs must be at least 1")]
    ZeroProbeTimeout,

    #[error("shutdown command must not be empty")]
    EmptyCommand,
}

/// One external invocation in the shutdown sequence.
#[derive(Debug, Clone, Deserialize)]
pub struct ShutdownCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_command_timeout_secs")]
    pub timeout_secs: u64,
}

impl ShutdownCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout_secs: u64) -> Self {
        Self {
            program: program.into(),
            args,
            timeout_secs,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Rendered form for logs and dry runs.
    pub fn display_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Policy for a failed hardware enumeration during an armed cycle.
///
/// `Trigger` treats the failure itself as tamper: an attacker able to break
/// device enumeration must not thereby silence the check. `Skip` logs a
/// warning and omits the tamper comparison for that cycle, for hosts with
/// flaky enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFailurePolicy {
    Trigger,
    Skip,
}

impl Default for SnapshotFailurePolicy {
    fn default() -> Self {
        SnapshotFailurePolicy::Trigger
    }
}

/// Immutable monitor configuration.
///
/// Built once by the daemon (file + environment), validated, then passed
/// into the engine by value and never mutated.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Hosts probed each observation cycle
    #[serde(default = "default_hosts")]
    pub hosts: Vec<HostTarget>,

    /// Seconds between armed cycles
    #[serde(default = "default_cadence_secs")]
    pub cadence_secs: u64,

    /// Per-host failure count that triggers shutdown
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Cycles after which all failure counters reset to 0
    #[serde(default = "default_reset_cycles")]
    pub reset_failures_after_n_cycles: u32,

    /// Max seconds allowed for one reachability check
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// Grace delay before baseline capture and arming, giving the operator
    /// time to detach keyboard/mouse after unlocking
    #[serde(default = "default_startup_delay_secs")]
    pub startup_delay_secs: u64,

    /// Ordered graceful pre-poweroff steps (unmount, crypto-close)
    #[serde(default)]
    pub graceful_commands: Vec<ShutdownCommand>,

    /// Unconditional final step
    #[serde(default = "default_poweroff_command")]
    pub poweroff_command: ShutdownCommand,

    /// Dry run: decisions are logged, nothing is executed
    #[serde(default)]
    pub test_mode: bool,

    /// What a failed hardware enumeration means while armed
    #[serde(default)]
    pub on_snapshot_failure: SnapshotFailurePolicy,
}

impl MonitorConfig {
    pub fn cadence(&self) -> Duration {
        Duration::from_secs(self.cadence_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_secs(self.startup_delay_secs)
    }

    /// Validate invariants that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hosts.is_empty() {
            return Err(ConfigError::NoHosts);
        }
        if self.failure_threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        if self.cadence_secs == 0 {
            return Err(ConfigError::ZeroCadence);
        }
        if self.reset_failures_after_n_cycles == 0 {
            return Err(ConfigError::ZeroResetCycles);
        }
        if self.probe_timeout_secs == 0 {
            return Err(ConfigError::ZeroProbeTimeout);
        }
        if self.poweroff_command.program.is_empty() {
            return Err(ConfigError::EmptyCommand);
        }
        if self.graceful_commands.iter().any(|c| c.program.is_empty()) {
            return Err(ConfigError::EmptyCommand);
        }
        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            hosts: default_hosts(),
            cadence_secs: default_cadence_secs(),
            failure_threshold: default_failure_threshold(),
            reset_failures_after_n_cycles: default_reset_cycles(),
            probe_timeout_secs: default_probe_timeout_secs(),
            startup_delay_secs: default_startup_delay_secs(),
            graceful_commands: Vec::new(),
            poweroff_command: default_poweroff_command(),
            test_mode: false,
            on_snapshot_failure: SnapshotFailurePolicy::default(),
        }
    }
}

fn default_hosts() -> Vec<HostTarget> {
    vec![
        HostTarget::new("www.google.com"),
        HostTarget::new("8.8.8.8"),
        HostTarget::new("1.1.1.1"),
    ]
}

fn default_cadence_secs() -> u64 {
    constants::DEFAULT_CADENCE_SECS
}

fn default_failure_threshold() -> u32 {
    constants::DEFAULT_FAILURE_THRESHOLD
}

fn default_reset_cycles() -> u32 {
    constants::DEFAULT_RESET_CYCLES
}

fn default_probe_timeout_secs() -> u64 {
    constants::DEFAULT_PROBE_TIMEOUT_SECS
}

fn default_startup_delay_secs() -> u64 {
    constants::DEFAULT_STARTUP_DELAY_SECS
}

fn default_command_timeout_secs() -> u64 {
    constants::DEFAULT_COMMAND_TIMEOUT_SECS
}

fn default_poweroff_command() -> ShutdownCommand {
    ShutdownCommand::new(
        "shutdown",
        vec!["now".to_string()],
        constants::DEFAULT_COMMAND_TIMEOUT_SECS,
    )
}
