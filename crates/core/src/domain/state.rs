// Engine run state and trigger reasons

use crate::domain::HostTarget;

/// The decision engine's run state.
///
/// `Starting` covers the grace delay and the initial connectivity
/// validation; `Armed` is the main loop; `Triggered` is terminal - once
/// escalation begins, no further cycles execute and no state is revisited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArmedState {
    Starting,
    Armed,
    Triggered,
}

impl std::fmt::Display for ArmedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArmedState::Starting => write!(f, "STARTING"),
            ArmedState::Armed => write!(f, "ARMED"),
            ArmedState::Triggered => write!(f, "TRIGGERED"),
        }
    }
}

/// Why the engine fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerReason {
    /// Live hardware snapshot differs from the arm-time baseline
    HardwareChanged,
    /// A host's failure counter reached the configured threshold
    HostUnreachable { host: HostTarget, failures: u32 },
    /// Hardware enumeration itself failed and policy treats that as tamper
    SnapshotUnavailable,
}

impl std::fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerReason::HardwareChanged => {
                write!(f, "attached hardware differs from baseline")
            }
            TriggerReason::HostUnreachable { host, failures } => {
                write!(f, "host {} unreachable {} times", host, failures)
            }
            TriggerReason::SnapshotUnavailable => {
                write!(f, "hardware snapshot unavailable")
            }
        }
    }
}
