// USB snapshotter - parses `lsusb` output into hardware descriptors

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;
use tracing::debug;

use deadman_core::domain::HardwareDescriptor;
use deadman_core::port::{HardwareSnapshotter, SnapshotError};

/// Enumerates attached USB devices by running `lsusb`.
///
/// Each matching output line becomes one descriptor keyed by the device's
/// bus/address path; lines that do not match are skipped. Any failure of
/// the `lsusb` invocation itself surfaces as `SnapshotError` for the engine
/// to handle by policy.
pub struct LsusbSnapshotter {
    line_re: Regex,
}

impl LsusbSnapshotter {
    pub fn new() -> Self {
        // "Bus 001 Device 004: ID 05ac:8290 Apple, Inc. FaceTime HD Camera"
        let line_re = Regex::new(
            r"(?i)Bus\s+(?P<bus>\d+)\s+Device\s+(?P<device>\d+).+ID\s(?P<id>\w+:\w+)\s(?P<tag>.+)$",
        )
        .expect("lsusb line regex is valid");
        Self { line_re }
    }

    fn parse(&self, output: &str) -> Vec<HardwareDescriptor> {
        output
            .lines()
            .filter_map(|line| {
                let caps = self.line_re.captures(line)?;
                Some(HardwareDescriptor::new(
                    format!("/dev/bus/usb/{}/{}", &caps["bus"], &caps["device"]),
                    caps["id"].to_string(),
                    caps["tag"].trim().to_string(),
                ))
            })
            .collect()
    }
}

impl Default for LsusbSnapshotter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HardwareSnapshotter for LsusbSnapshotter {
    async fn snapshot(&self) -> Result<Vec<HardwareDescriptor>, SnapshotError> {
        let output = Command::new("lsusb")
            .output()
            .await
            .map_err(|e| SnapshotError::SpawnFailed(e.to_string()))?;

        if !output.status.success() {
            return Err(SnapshotError::CommandFailed(
                output.status.code().unwrap_or(-1),
            ));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| SnapshotError::UnparseableOutput(e.to_string()))?;

        let devices = self.parse(&stdout);
        debug!(device_count = devices.len(), "Hardware snapshot taken");
        Ok(devices)
    }
}
