// Hardware descriptors and the arm-time baseline

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One attached device, identified by its stable bus/address path.
///
/// Equality is full-field: a device re-plugged into a different port gets a
/// new device path and therefore compares unequal to its old descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HardwareDescriptor {
    /// Stable identity key, e.g. "/dev/bus/usb/001/004"
    pub device: String,
    /// Vendor:product identifier, e.g. "05ac:8290"
    pub id: String,
    /// Human-readable tag from the enumeration tool
    pub tag: String,
}

impl HardwareDescriptor {
    pub fn new(
        device: impl Into<String>,
        id: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            device: device.into(),
            id: id.into(),
            tag: tag.into(),
        }
    }
}

impl std::fmt::Display for HardwareDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}) {}", self.device, self.id, self.tag)
    }
}

/// The reference hardware snapshot captured exactly once at arm-time.
///
/// Comparison is unordered but count-sensitive: enumeration order carries no
/// meaning, but two identical descriptors appearing twice is a different
/// machine state than one appearing once.
#[derive(Debug, Clone)]
pub struct HardwareBaseline {
    devices: Vec<HardwareDescriptor>,
}

impl HardwareBaseline {
    pub fn new(devices: Vec<HardwareDescriptor>) -> Self {
        Self { devices }
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn devices(&self) -> &[HardwareDescriptor] {
        &self.devices
    }

    /// True iff `current` is multiset-equal to the baseline.
    pub fn matches(&self, current: &[HardwareDescriptor]) -> bool {
        if self.devices.len() != current.len() {
            return false;
        }
        multiset(&self.devices) == multiset(current)
    }
}

fn multiset(devices: &[HardwareDescriptor]) -> HashMap<&HardwareDescriptor, usize> {
    let mut counts = HashMap::new();
    for d in devices {
        *counts.entry(d).or_insert(0) += 1;
    }
    counts
}
