// Domain Layer - Pure entities, no behavior beyond equality and display

pub mod hardware;
pub mod host;
pub mod state;

// Re-exports
pub use hardware::{HardwareBaseline, HardwareDescriptor};
pub use host::HostTarget;
pub use state::{ArmedState, TriggerReason};
