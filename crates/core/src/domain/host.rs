// Host Target - opaque reachability identifier

use serde::{Deserialize, Serialize};

/// A host probed each observation cycle (hostname or address string).
///
/// The configured set is fixed for the process lifetime; targets are
/// never added or removed while armed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostTarget(String);

impl HostTarget {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HostTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HostTarget {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
