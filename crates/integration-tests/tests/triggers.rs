//! Armed-loop trigger scenarios: failure counters crossing the threshold,
//! hardware deviating from the baseline, and the escalation that follows.

use std::sync::Arc;
use std::time::Duration;

use deadman_core::application::{EngineExit, MonitorEngine};
use deadman_core::config::{MonitorConfig, ShutdownCommand};
use deadman_core::domain::{HardwareDescriptor, HostTarget, TriggerReason};
use deadman_core::port::command_runner::mocks::RecordingRunner;
use deadman_core::port::hardware_snapshotter::mocks::ScriptedSnapshotter;
use deadman_core::port::reachability_prober::mocks::ScriptedProber;
use deadman_core::port::time_provider::mocks::InstantTimeProvider;
use deadman_core::port::RunOutcome;

fn config(hosts: &[&str]) -> MonitorConfig {
    MonitorConfig {
        hosts: hosts.iter().map(|h| HostTarget::new(*h)).collect(),
        ..Default::default()
    }
}

fn dev(path: &str) -> HardwareDescriptor {
    HardwareDescriptor::new(path, "1a2b:3c4d", "Device")
}

fn build(
    config: MonitorConfig,
    prober: ScriptedProber,
    snapshotter: ScriptedSnapshotter,
    runner: Arc<RecordingRunner>,
) -> (MonitorEngine, Arc<InstantTimeProvider>) {
    let time = Arc::new(InstantTimeProvider::new());
    let engine = MonitorEngine::new(
        config,
        Arc::new(prober),
        Arc::new(snapshotter),
        runner,
        time.clone(),
    );
    (engine, time)
}

#[tokio::test]
async fn three_failed_cycles_trigger_exactly_one_escalation() {
    // hosts=[A,B], threshold=3, reset=5; A fails cycles 1-3, B always
    // answers. The trigger lands after cycle 3 and no further cycles run.
    let mut cfg = config(&["a.example", "b.example"]);
    cfg.reset_failures_after_n_cycles = 5;
    cfg.graceful_commands = vec![ShutdownCommand::new("umount", vec!["/mnt".into()], 10)];

    let prober = ScriptedProber::new().script(
        "a.example",
        &[true, true, true, false, false, false],
    );
    let prober_calls = prober.clone();
    let snapshotter = ScriptedSnapshotter::steady(Vec::new());
    let runner = Arc::new(RecordingRunner::all_success());

    let (engine, time) = build(cfg, prober, snapshotter, runner.clone());
    let exit = engine.run().await.unwrap();

    assert_eq!(
        exit,
        EngineExit::Triggered(TriggerReason::HostUnreachable {
            host: HostTarget::new("a.example"),
            failures: 3,
        })
    );
    assert_eq!(runner.invocations(), vec!["umount /mnt", "shutdown now"]);
    // 6 validation probes, then 3 cycles of 2 hosts; nothing after the
    // trigger.
    assert_eq!(prober_calls.probe_count(), 12);
    // One startup delay plus the sleeps between cycles 1-2 and 2-3.
    assert_eq!(
        time.sleeps(),
        vec![
            Duration::from_secs(120),
            Duration::from_secs(3),
            Duration::from_secs(3),
        ]
    );
}

#[tokio::test]
async fn new_device_triggers_with_all_counters_at_zero() {
    // Baseline {X, Y}; cycle 1 snapshot {X, Y, Z}. Every host answers, so
    // the hardware check alone fires the trigger.
    let x = dev("/dev/bus/usb/001/002");
    let y = dev("/dev/bus/usb/001/003");
    let z = dev("/dev/bus/usb/002/001");

    let prober = ScriptedProber::new();
    let snapshotter = ScriptedSnapshotter::steady(Vec::new())
        .then(Ok(vec![x.clone(), y.clone()]))
        .then(Ok(vec![x, y, z]));
    let runner = Arc::new(RecordingRunner::all_success());

    let (engine, _) = build(config(&["a.example"]), prober, snapshotter, runner.clone());
    let exit = engine.run().await.unwrap();

    assert_eq!(exit, EngineExit::Triggered(TriggerReason::HardwareChanged));
    assert_eq!(runner.invocations(), vec!["shutdown now"]);
}

#[tokio::test]
async fn removed_device_is_as_fatal_as_an_added_one() {
    let x = dev("/dev/bus/usb/001/002");
    let y = dev("/dev/bus/usb/001/003");

    let prober = ScriptedProber::new();
    let snapshotter = ScriptedSnapshotter::steady(Vec::new())
        .then(Ok(vec![x.clone(), y]))
        .then(Ok(vec![x]));
    let runner = Arc::new(RecordingRunner::all_success());

    let (engine, _) = build(config(&["a.example"]), prober, snapshotter, runner);
    let exit = engine.run().await.unwrap();

    assert_eq!(exit, EngineExit::Triggered(TriggerReason::HardwareChanged));
}

#[tokio::test]
async fn hardware_trigger_outranks_a_simultaneous_counter_trigger() {
    // Cycle 3: A's counter reaches the threshold AND the snapshot deviates.
    // The hardware check runs first, so the recorded reason is the tamper.
    let x = dev("/dev/bus/usb/001/002");
    let z = dev("/dev/bus/usb/002/001");

    let prober = ScriptedProber::new().script(
        "a.example",
        &[true, true, true, false, false, false],
    );
    let snapshotter = ScriptedSnapshotter::steady(Vec::new())
        .then(Ok(vec![x.clone()]))
        .then(Ok(vec![x.clone()]))
        .then(Ok(vec![x.clone()]))
        .then(Ok(vec![x, z]));
    let runner = Arc::new(RecordingRunner::all_success());

    let (engine, _) = build(config(&["a.example"]), prober, snapshotter, runner.clone());
    let exit = engine.run().await.unwrap();

    assert_eq!(exit, EngineExit::Triggered(TriggerReason::HardwareChanged));
    assert_eq!(runner.invocation_count(), 1);
}

#[tokio::test]
async fn test_mode_trigger_reports_but_runs_nothing() {
    let mut cfg = config(&["a.example"]);
    cfg.test_mode = true;
    cfg.graceful_commands = vec![ShutdownCommand::new("umount", vec!["/mnt".into()], 10)];

    let prober = ScriptedProber::new().script(
        "a.example",
        &[true, true, true, false, false, false],
    );
    let snapshotter = ScriptedSnapshotter::steady(Vec::new());
    let runner = Arc::new(RecordingRunner::all_success());

    let (engine, _) = build(cfg, prober, snapshotter, runner.clone());
    let exit = engine.run().await.unwrap();

    assert!(matches!(
        exit,
        EngineExit::Triggered(TriggerReason::HostUnreachable { .. })
    ));
    assert_eq!(runner.invocation_count(), 0);
}

#[tokio::test]
async fn failed_graceful_step_still_powers_off() {
    let mut cfg = config(&["a.example"]);
    cfg.graceful_commands = vec![
        ShutdownCommand::new("umount", vec!["/mnt".into()], 10),
        ShutdownCommand::new("cryptsetup", vec!["close".into(), "vault".into()], 10),
    ];

    let prober = ScriptedProber::new().script(
        "a.example",
        &[true, true, true, false, false, false],
    );
    let snapshotter = ScriptedSnapshotter::steady(Vec::new());
    // The unmount fails (the tampering broke the mount): cryptsetup is
    // skipped and poweroff is immediate.
    let runner = Arc::new(RecordingRunner::scripted(vec![RunOutcome::Failed {
        exit_code: Some(32),
    }]));

    let (engine, _) = build(cfg, prober, snapshotter, runner.clone());
    let exit = engine.run().await.unwrap();

    assert!(matches!(exit, EngineExit::Triggered(_)));
    assert_eq!(runner.invocations(), vec!["umount /mnt", "shutdown now"]);
}
