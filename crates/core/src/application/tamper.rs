// Tamper Detector - baseline comparison for hardware presence

use tracing::info;

use crate::domain::{HardwareBaseline, HardwareDescriptor};

/// Compares live hardware snapshots against the arm-time baseline.
///
/// Maximally sensitive on purpose: any added, removed, or moved device is a
/// change. A flaky hub that re-enumerates under a new address will trip it;
/// that false positive is an accepted tradeoff favoring security over
/// convenience, not something to soften with fuzzy matching.
pub struct TamperDetector;

impl TamperDetector {
    /// Freeze the current snapshot as the baseline. Invoked exactly once,
    /// after the startup delay, before the first armed cycle.
    pub fn capture_baseline(devices: Vec<HardwareDescriptor>) -> HardwareBaseline {
        info!(device_count = devices.len(), "Hardware baseline captured");
        HardwareBaseline::new(devices)
    }

    /// True iff `current` is not multiset-equal to the baseline.
    pub fn has_changed(current: &[HardwareDescriptor], baseline: &HardwareBaseline) -> bool {
        !baseline.matches(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev(path: &str, id: &str) -> HardwareDescriptor {
        HardwareDescriptor::new(path, id, "Test Device")
    }

    #[test]
    fn baseline_against_itself_is_unchanged() {
        let devices = vec![dev("/dev/bus/usb/001/002", "05ac:8290")];
        let baseline = TamperDetector::capture_baseline(devices.clone());
        assert!(!TamperDetector::has_changed(&devices, &baseline));
    }

    #[test]
    fn added_device_is_a_change() {
        let x = dev("/dev/bus/usb/001/002", "05ac:8290");
        let y = dev("/dev/bus/usb/001/003", "1a2b:3c4d");
        let z = dev("/dev/bus/usb/002/001", "dead:beef");
        let baseline = TamperDetector::capture_baseline(vec![x.clone(), y.clone()]);
        assert!(TamperDetector::has_changed(&[x, y, z], &baseline));
    }

    #[test]
    fn removed_device_is_a_change() {
        let x = dev("/dev/bus/usb/001/002", "05ac:8290");
        let y = dev("/dev/bus/usb/001/003", "1a2b:3c4d");
        let baseline = TamperDetector::capture_baseline(vec![x.clone(), y]);
        assert!(TamperDetector::has_changed(&[x], &baseline));
    }

    #[test]
    fn detection_is_symmetric() {
        let x = dev("/dev/bus/usb/001/002", "05ac:8290");
        let y = dev("/dev/bus/usb/001/003", "1a2b:3c4d");

        let small = TamperDetector::capture_baseline(vec![x.clone()]);
        let large = TamperDetector::capture_baseline(vec![x.clone(), y.clone()]);

        assert!(TamperDetector::has_changed(&[x.clone(), y], &small));
        assert!(TamperDetector::has_changed(&[x], &large));
    }

    #[test]
    fn replugged_device_on_new_address_is_a_change() {
        let baseline =
            TamperDetector::capture_baseline(vec![dev("/dev/bus/usb/001/002", "05ac:8290")]);
        let moved = dev("/dev/bus/usb/001/007", "05ac:8290");
        assert!(TamperDetector::has_changed(&[moved], &baseline));
    }

    #[test]
    fn empty_baseline_and_empty_snapshot_are_equal() {
        let baseline = TamperDetector::capture_baseline(Vec::new());
        assert!(!TamperDetector::has_changed(&[], &baseline));
    }
}
