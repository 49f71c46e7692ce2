// Port Layer - Interfaces for external dependencies

pub mod command_runner;
pub mod hardware_snapshotter;
pub mod reachability_prober;
pub mod time_provider; // For deterministic testing

// Re-exports
pub use command_runner::{CommandRunner, RunOutcome};
pub use hardware_snapshotter::{HardwareSnapshotter, SnapshotError};
pub use reachability_prober::ReachabilityProber;
pub use time_provider::TimeProvider;
