// Application Layer - the failure-detection and shutdown-decision machinery

pub mod constants;
pub mod engine;
pub mod failure_tracker;
pub mod shutdown;
pub mod tamper;

// Re-exports
pub use engine::{EngineExit, MonitorEngine};
pub use failure_tracker::FailureTracker;
pub use shutdown::ShutdownEscalation;
pub use tamper::TamperDetector;
