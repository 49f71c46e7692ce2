// Deadman Infra-System - adapters that shell out to OS utilities

mod ping_prober;
mod shell_runner;
mod usb_snapshotter;

pub use ping_prober::PingProber;
pub use shell_runner::ShellCommandRunner;
pub use usb_snapshotter::LsusbSnapshotter;
