// Reachability prober port
// reason: async-trait for object-safe async ports

use async_trait::async_trait;

use crate::domain::HostTarget;

/// Reachability prober port.
///
/// The adapter owns the per-probe timeout: a probe that exceeds its deadline
/// reports `false`, never an error. Probes are read-only and side-effect
/// free, so the engine may run them concurrently within one cycle.
#[async_trait]
pub trait ReachabilityProber: Send + Sync {
    /// Probe a single host once.
    ///
    /// # Returns
    /// true iff the host answered within the bounded timeout
    async fn probe(&self, host: &HostTarget) -> bool;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Scripted prober: per-host queues of outcomes, consumed one per probe.
    ///
    /// Once a host's script is exhausted, further probes report the
    /// configured fallback (default: reachable). Clones share the script
    /// and counters, so a clone kept outside the engine can assert on them.
    #[derive(Clone)]
    pub struct ScriptedProber {
        scripts: Arc<Mutex<HashMap<HostTarget, Vec<bool>>>>,
        fallback: bool,
        probe_count: Arc<Mutex<usize>>,
    }

    impl ScriptedProber {
        pub fn new() -> Self {
            Self {
                scripts: Arc::new(Mutex::new(HashMap::new())),
                fallback: true,
                probe_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn with_fallback(mut self, fallback: bool) -> Self {
            self.fallback = fallback;
            self
        }

        /// Queue outcomes for one host, consumed front-first.
        pub fn script(self, host: impl Into<HostTarget>, outcomes: &[bool]) -> Self {
            self.scripts
                .lock()
                .unwrap()
                .insert(host.into(), outcomes.to_vec());
            self
        }

        pub fn probe_count(&self) -> usize {
            *self.probe_count.lock().unwrap()
        }
    }

    impl Default for ScriptedProber {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ReachabilityProber for ScriptedProber {
        async fn probe(&self, host: &HostTarget) -> bool {
            *self.probe_count.lock().unwrap() += 1;
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(host) {
                Some(queue) if !queue.is_empty() => queue.remove(0),
                _ => self.fallback,
            }
        }
    }
}
