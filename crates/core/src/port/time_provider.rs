// Time Provider Port (for testability)

use std::time::Duration;

use async_trait::async_trait;

/// Time provider interface (allows mocking in tests)
///
/// Owning the sleep as well as the clock lets end-to-end scenarios drive
/// the engine through many cycles without real delays.
#[async_trait]
pub trait TimeProvider: Send + Sync {
    /// Get current time in milliseconds since epoch
    fn now_millis(&self) -> i64;

    /// Sleep for the given duration
    async fn sleep(&self, duration: Duration);
}

/// System time provider (production)
pub struct SystemTimeProvider;

#[async_trait]
impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Instant time provider: sleeps return immediately, the clock advances
    /// by the requested duration.
    pub struct InstantTimeProvider {
        now_millis: Arc<Mutex<i64>>,
        sleeps: Arc<Mutex<Vec<Duration>>>,
    }

    impl InstantTimeProvider {
        pub fn new() -> Self {
            Self {
                now_millis: Arc::new(Mutex::new(0)),
                sleeps: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Durations passed to sleep, in order.
        pub fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.lock().unwrap().clone()
        }
    }

    impl Default for InstantTimeProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl TimeProvider for InstantTimeProvider {
        fn now_millis(&self) -> i64 {
            *self.now_millis.lock().unwrap()
        }

        async fn sleep(&self, duration: Duration) {
            *self.now_millis.lock().unwrap() += duration.as_millis() as i64;
            self.sleeps.lock().unwrap().push(duration);
        }
    }
}
