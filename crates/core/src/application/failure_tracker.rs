// Failure Tracker - per-host unreachability counters with bulk reset

use std::collections::HashMap;

use crate::domain::HostTarget;

/// Per-host failure counters.
///
/// Every configured host has exactly one entry at all times, kept in
/// configuration order so threshold checks are deterministic. A counter
/// tracks failures observed since the last reset; a successful probe never
/// decrements it (intentional: the periodic bulk reset is what bounds how
/// stale old failures can become).
#[derive(Debug, Clone)]
pub struct FailureTracker {
    counts: Vec<(HostTarget, u32)>,
}

impl FailureTracker {
    /// Tracker with every host at 0. Called at arm-time and every
    /// `reset_failures_after_n_cycles` cycles.
    pub fn new(hosts: &[HostTarget]) -> Self {
        Self {
            counts: hosts.iter().map(|h| (h.clone(), 0)).collect(),
        }
    }

    /// Zero every counter, keeping the host set and order.
    pub fn reset(&mut self) {
        for (_, count) in &mut self.counts {
            *count = 0;
        }
    }

    /// Record one cycle's probe results: each host that probed false is
    /// incremented by exactly 1; successful hosts are left unchanged.
    pub fn record_cycle(&mut self, results: &HashMap<HostTarget, bool>) {
        for (host, count) in &mut self.counts {
            if let Some(false) = results.get(host) {
                *count += 1;
            }
        }
    }

    /// First host in configuration order whose counter is at or above
    /// `threshold`, with its count.
    pub fn any_at_or_above(&self, threshold: u32) -> Option<(&HostTarget, u32)> {
        self.counts
            .iter()
            .find(|(_, count)| *count >= threshold)
            .map(|(host, count)| (host, *count))
    }

    /// Counter for one host (None if the host was never configured).
    pub fn count(&self, host: &HostTarget) -> Option<u32> {
        self.counts
            .iter()
            .find(|(h, _)| h == host)
            .map(|(_, count)| *count)
    }
}
