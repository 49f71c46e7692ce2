// Hardware snapshotter port

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::HardwareDescriptor;

/// Snapshot acquisition errors
#[derive(Error, Debug, Clone)]
pub enum SnapshotError {
    #[error("Enumeration command failed to spawn: {0}")]
    SpawnFailed(String),

    #[error("Enumeration command exited non-zero: {0}")]
    CommandFailed(i32),

    #[error("Enumeration command timed out after {0}ms")]
    Timeout(i64),

    #[error("Unreadable enumeration output: {0}")]
    UnparseableOutput(String),
}

/// Hardware snapshotter port.
///
/// Returns the currently attached devices as an unordered collection.
/// Acquisition failure is an explicit error the engine handles by policy;
/// it must never crash the loop.
#[async_trait]
pub trait HardwareSnapshotter: Send + Sync {
    async fn snapshot(&self) -> Result<Vec<HardwareDescriptor>, SnapshotError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Scripted snapshotter: a queue of results, consumed one per call.
    ///
    /// Once the queue is exhausted, further calls repeat the last result
    /// (or the initial snapshot if nothing was queued). Clones share state.
    #[derive(Clone)]
    pub struct ScriptedSnapshotter {
        queue: Arc<Mutex<Vec<Result<Vec<HardwareDescriptor>, SnapshotError>>>>,
        last: Arc<Mutex<Result<Vec<HardwareDescriptor>, SnapshotError>>>,
        call_count: Arc<Mutex<usize>>,
    }

    impl ScriptedSnapshotter {
        /// Snapshotter that always reports `devices`.
        pub fn steady(devices: Vec<HardwareDescriptor>) -> Self {
            Self {
                queue: Arc::new(Mutex::new(Vec::new())),
                last: Arc::new(Mutex::new(Ok(devices))),
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        /// Queue the next result, consumed front-first.
        pub fn then(self, result: Result<Vec<HardwareDescriptor>, SnapshotError>) -> Self {
            self.queue.lock().unwrap().push(result);
            self
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl HardwareSnapshotter for ScriptedSnapshotter {
        async fn snapshot(&self) -> Result<Vec<HardwareDescriptor>, SnapshotError> {
            *self.call_count.lock().unwrap() += 1;
            let mut queue = self.queue.lock().unwrap();
            if queue.is_empty() {
                self.last.lock().unwrap().clone()
            } else {
                let next = queue.remove(0);
                *self.last.lock().unwrap() = next.clone();
                next
            }
        }
    }
}
