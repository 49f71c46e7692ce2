// Application constants (no magic values in code)

/// Default seconds between armed observation cycles
pub const DEFAULT_CADENCE_SECS: u64 = 3;

/// Default per-host failure count that triggers shutdown
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Default number of cycles before all failure counters reset
pub const DEFAULT_RESET_CYCLES: u32 = 15;

/// Default max seconds for one reachability probe
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 4;

/// Default grace delay before baseline capture and arming
pub const DEFAULT_STARTUP_DELAY_SECS: u64 = 120;

/// Default timeout for a single shutdown step
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;
