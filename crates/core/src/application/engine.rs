// Monitor Engine - the STARTING -> ARMED -> TRIGGERED state machine

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use crate::application::failure_tracker::FailureTracker;
use crate::application::shutdown::ShutdownEscalation;
use crate::application::tamper::TamperDetector;
use crate::config::{MonitorConfig, SnapshotFailurePolicy};
use crate::domain::{ArmedState, HardwareBaseline, HostTarget, TriggerReason};
use crate::error::Result;
use crate::port::{CommandRunner, HardwareSnapshotter, ReachabilityProber, TimeProvider};

/// How a run ended.
///
/// `Triggered` is only ever observed by the caller in test mode; a live
/// trigger powers the machine off underneath the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineExit {
    /// Startup validation failed; the engine refused to arm.
    ValidationFailed,
    /// A trigger fired and the escalation ran to completion.
    Triggered(TriggerReason),
}

/// The decision engine.
///
/// Owns the failure tracker, the ordinal cycle counter, and the baseline
/// exclusively; ports only feed it observations. One cycle fully completes
/// (all probes joined, snapshot taken, decision made) before the next sleep
/// begins. A baseline that cannot be captured at arm-time is fatal to the
/// arming attempt, like failed validation: there is nothing valid to compare
/// against later.
pub struct MonitorEngine {
    config: MonitorConfig,
    prober: Arc<dyn ReachabilityProber>,
    snapshotter: Arc<dyn HardwareSnapshotter>,
    escalation: ShutdownEscalation,
    time: Arc<dyn TimeProvider>,
}

impl MonitorEngine {
    pub fn new(
        config: MonitorConfig,
        prober: Arc<dyn ReachabilityProber>,
        snapshotter: Arc<dyn HardwareSnapshotter>,
        runner: Arc<dyn CommandRunner>,
        time: Arc<dyn TimeProvider>,
    ) -> Self {
        let escalation = ShutdownEscalation::new(runner, &config);
        Self {
            config,
            prober,
            snapshotter,
            escalation,
            time,
        }
    }

    /// Drive the state machine to its terminal outcome.
    pub async fn run(&self) -> Result<EngineExit> {
        info!(
            state = %ArmedState::Starting,
            delay_secs = self.config.startup_delay_secs,
            "Delaying before baseline capture"
        );
        self.time.sleep(self.config.startup_delay()).await;

        if !self.validate_connectivity().await {
            info!("Refusing to arm");
            return Ok(EngineExit::ValidationFailed);
        }

        let devices = self.snapshotter.snapshot().await?;
        let baseline = TamperDetector::capture_baseline(devices);

        let mut tracker = FailureTracker::new(&self.config.hosts);
        let mut ordinal: u32 = 0;

        info!(
            state = %ArmedState::Armed,
            hosts = self.config.hosts.len(),
            baseline_devices = baseline.len(),
            cadence_secs = self.config.cadence_secs,
            "Armed"
        );

        loop {
            if ordinal >= self.config.reset_failures_after_n_cycles {
                tracker.reset();
                ordinal = 0;
                info!("Failure counters reset");
            }
            ordinal += 1;

            let results = self.probe_all_hosts().await;
            tracker.record_cycle(&results);

            if let Some(reason) = self.check_hardware(&baseline).await {
                return Ok(self.trigger(reason).await);
            }

            if let Some((host, failures)) =
                tracker.any_at_or_above(self.config.failure_threshold)
            {
                let reason = TriggerReason::HostUnreachable {
                    host: host.clone(),
                    failures,
                };
                return Ok(self.trigger(reason).await);
            }

            self.time.sleep(self.config.cadence()).await;
        }
    }

    /// Initial connectivity burst: `failure_threshold` attempts, each
    /// probing every host once. Any single failed probe aborts arming - a
    /// network that is down before arming is a pre-existing condition, not
    /// tampering, and a baseline taken then would never be valid.
    async fn validate_connectivity(&self) -> bool {
        for attempt in 1..=self.config.failure_threshold {
            for host in &self.config.hosts {
                if !self.prober.probe(host).await {
                    warn!(
                        attempt,
                        host = %host,
                        "Network unavailable before arming"
                    );
                    return false;
                }
            }
        }
        true
    }

    /// Probe every host concurrently; all results are joined before the
    /// decision step so it always sees a complete cycle.
    async fn probe_all_hosts(&self) -> HashMap<HostTarget, bool> {
        let probes = self.config.hosts.iter().map(|host| async move {
            let reachable = self.prober.probe(host).await;
            (host.clone(), reachable)
        });
        join_all(probes).await.into_iter().collect()
    }

    /// Tamper check for one cycle. Returns the trigger reason, if any.
    async fn check_hardware(&self, baseline: &HardwareBaseline) -> Option<TriggerReason> {
        match self.snapshotter.snapshot().await {
            Ok(current) => {
                if TamperDetector::has_changed(&current, baseline) {
                    warn!(
                        baseline_devices = baseline.len(),
                        current_devices = current.len(),
                        "Attached hardware differs from baseline"
                    );
                    Some(TriggerReason::HardwareChanged)
                } else {
                    None
                }
            }
            Err(e) => match self.config.on_snapshot_failure {
                SnapshotFailurePolicy::Trigger => {
                    warn!(error = %e, "Hardware snapshot failed, treating as tamper");
                    Some(TriggerReason::SnapshotUnavailable)
                }
                SnapshotFailurePolicy::Skip => {
                    warn!(error = %e, "Hardware snapshot failed, tamper check skipped this cycle");
                    None
                }
            },
        }
    }

    async fn trigger(&self, reason: TriggerReason) -> EngineExit {
        warn!(state = %ArmedState::Triggered, reason = %reason, "Executing failure action");
        self.escalation.execute().await;
        EngineExit::Triggered(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::command_runner::mocks::RecordingRunner;
    use crate::port::hardware_snapshotter::mocks::ScriptedSnapshotter;
    use crate::port::reachability_prober::mocks::ScriptedProber;
    use crate::port::time_provider::mocks::InstantTimeProvider;
    use crate::port::SnapshotError;

    fn config(hosts: &[&str]) -> MonitorConfig {
        MonitorConfig {
            hosts: hosts.iter().map(|h| HostTarget::new(*h)).collect(),
            test_mode: false,
            ..Default::default()
        }
    }

    fn engine(
        config: MonitorConfig,
        prober: ScriptedProber,
        snapshotter: ScriptedSnapshotter,
        runner: Arc<RecordingRunner>,
    ) -> MonitorEngine {
        MonitorEngine::new(
            config,
            Arc::new(prober),
            Arc::new(snapshotter),
            runner,
            Arc::new(InstantTimeProvider::new()),
        )
    }

    #[tokio::test]
    async fn validation_failure_refuses_to_arm() {
        // Threshold 3: one host fails on the 2nd of 3 validation attempts.
        let prober = ScriptedProber::new().script("a.example", &[true, false]);
        let snapshotter = ScriptedSnapshotter::steady(Vec::new());
        let runner = Arc::new(RecordingRunner::all_success());

        let exit = engine(config(&["a.example"]), prober, snapshotter, runner.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(exit, EngineExit::ValidationFailed);
        assert_eq!(runner.invocation_count(), 0);
    }

    #[tokio::test]
    async fn host_failures_reach_threshold_and_trigger() {
        // Validation (3 attempts x 2 hosts) passes, then A fails 3 cycles.
        let prober = ScriptedProber::new().script(
            "a.example",
            &[true, true, true, false, false, false],
        );
        let snapshotter = ScriptedSnapshotter::steady(Vec::new());
        let runner = Arc::new(RecordingRunner::all_success());

        let exit = engine(
            config(&["a.example", "b.example"]),
            prober,
            snapshotter,
            runner.clone(),
        )
        .run()
        .await
        .unwrap();

        assert_eq!(
            exit,
            EngineExit::Triggered(TriggerReason::HostUnreachable {
                host: HostTarget::new("a.example"),
                failures: 3,
            })
        );
        // Escalation ran exactly once: default config has no graceful steps.
        assert_eq!(runner.invocations(), vec!["shutdown now"]);
    }

    #[tokio::test]
    async fn hardware_change_triggers_even_with_zero_failures() {
        let x = crate::domain::HardwareDescriptor::new("/dev/bus/usb/001/002", "05ac:8290", "X");
        let z = crate::domain::HardwareDescriptor::new("/dev/bus/usb/002/001", "dead:beef", "Z");

        let prober = ScriptedProber::new();
        // Baseline {X}, first armed cycle sees {X, Z}.
        let snapshotter = ScriptedSnapshotter::steady(vec![x.clone()])
            .then(Ok(vec![x.clone()]))
            .then(Ok(vec![x, z]));
        let runner = Arc::new(RecordingRunner::all_success());

        let exit = engine(config(&["a.example"]), prober, snapshotter, runner.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(exit, EngineExit::Triggered(TriggerReason::HardwareChanged));
        assert_eq!(runner.invocation_count(), 1);
    }

    #[tokio::test]
    async fn counter_reset_delays_the_trigger() {
        // Threshold 3, reset every 5 cycles. A fails cycles 1-2, recovers
        // for 3-5, fails 6-8. The reset at the start of cycle 6 wipes the
        // two early failures, so the trigger lands on cycle 8 with exactly
        // three fresh failures, not on cycle 6 with stale ones.
        let mut config = config(&["a.example"]);
        config.reset_failures_after_n_cycles = 5;

        let prober = ScriptedProber::new().script(
            "a.example",
            &[
                true, true, true, // validation burst
                false, false, true, true, true, // cycles 1-5
                false, false, false, // cycles 6-8
            ],
        );
        let snapshotter = ScriptedSnapshotter::steady(Vec::new());
        let runner = Arc::new(RecordingRunner::all_success());
        let prober_calls = prober.clone();

        let exit = engine(config, prober, snapshotter, runner)
            .run()
            .await
            .unwrap();

        assert_eq!(
            exit,
            EngineExit::Triggered(TriggerReason::HostUnreachable {
                host: HostTarget::new("a.example"),
                failures: 3,
            })
        );
        // 3 validation probes + 8 armed cycles of one host each.
        assert_eq!(prober_calls.probe_count(), 11);
    }

    #[tokio::test]
    async fn snapshot_failure_triggers_under_default_policy() {
        let prober = ScriptedProber::new();
        let snapshotter = ScriptedSnapshotter::steady(Vec::new())
            .then(Ok(Vec::new()))
            .then(Err(SnapshotError::CommandFailed(1)));
        let runner = Arc::new(RecordingRunner::all_success());

        let exit = engine(config(&["a.example"]), prober, snapshotter, runner)
            .run()
            .await
            .unwrap();

        assert_eq!(exit, EngineExit::Triggered(TriggerReason::SnapshotUnavailable));
    }

    #[tokio::test]
    async fn snapshot_failure_is_skipped_under_skip_policy() {
        let mut config = config(&["a.example"]);
        config.on_snapshot_failure = SnapshotFailurePolicy::Skip;

        // Snapshot fails on the first armed cycle; the loop must survive it
        // and trigger later on host failures instead.
        let prober = ScriptedProber::new().script(
            "a.example",
            &[true, true, true, false, false, false],
        );
        let snapshotter = ScriptedSnapshotter::steady(Vec::new())
            .then(Ok(Vec::new()))
            .then(Err(SnapshotError::CommandFailed(1)))
            .then(Ok(Vec::new()));
        let runner = Arc::new(RecordingRunner::all_success());

        let exit = engine(config, prober, snapshotter, runner)
            .run()
            .await
            .unwrap();

        assert_eq!(
            exit,
            EngineExit::Triggered(TriggerReason::HostUnreachable {
                host: HostTarget::new("a.example"),
                failures: 3,
            })
        );
    }
}
