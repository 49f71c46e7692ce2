// Ping prober - one ICMP echo per probe via the system ping utility

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use deadman_core::domain::HostTarget;
use deadman_core::port::ReachabilityProber;

/// Shells out to `ping -c 1 <host>` with stdout/stderr nulled.
///
/// The probe deadline is enforced in-process: a ping still running when the
/// timeout elapses is killed and reported as unreachable. Spawn failure
/// (ping missing from PATH) is also unreachable, never an error - the
/// tracker is the only place probe outcomes go.
pub struct PingProber {
    probe_timeout: Duration,
}

impl PingProber {
    pub fn new(probe_timeout: Duration) -> Self {
        Self { probe_timeout }
    }
}

#[async_trait]
impl ReachabilityProber for PingProber {
    async fn probe(&self, host: &HostTarget) -> bool {
        let child = Command::new("ping")
            .arg("-c")
            .arg("1")
            .arg(host.as_str())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        let mut child = match child {
            Ok(c) => c,
            Err(e) => {
                warn!(host = %host, error = %e, "Failed to spawn ping");
                return false;
            }
        };

        match timeout(self.probe_timeout, child.wait()).await {
            Ok(Ok(status)) => {
                let reachable = status.success();
                debug!(host = %host, reachable, "Probe completed");
                reachable
            }
            Ok(Err(e)) => {
                warn!(host = %host, error = %e, "Ping wait failed");
                false
            }
            Err(_) => {
                debug!(host = %host, timeout_ms = self.probe_timeout.as_millis() as u64, "Probe timed out");
                false
            }
        }
    }
}
