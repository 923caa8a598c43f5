//! Port reachability status models.

use serde::{Deserialize, Serialize};

// ============================================================================
// PortStatus
// ============================================================================

/// Latest known reachability of a watched port.
///
/// Every configured port starts at `Unknown`. A worker moves it to
/// `Unreachable` on each failed attempt and to `Reachable` once a connect
/// succeeds; `Reachable` is never left again for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum PortStatus {
    /// No probe attempt has completed yet.
    #[default]
    Unknown,
    /// The last attempt was refused, timed out, or otherwise failed.
    Unreachable,
    /// A connect attempt succeeded.
    Reachable,
}

impl PortStatus {
    /// All status values, in lifecycle order.
    pub const ALL: [PortStatus; 3] = [
        PortStatus::Unknown,
        PortStatus::Unreachable,
        PortStatus::Reachable,
    ];

    /// Whether no further transitions follow this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PortStatus::Reachable)
    }

    /// Get the display name for this status.
    pub fn display_name(&self) -> &'static str {
        match self {
            PortStatus::Unknown => "unknown",
            PortStatus::Unreachable => "unreachable",
            PortStatus::Reachable => "reachable",
        }
    }

    pub(crate) fn to_u8(self) -> u8 {
        match self {
            PortStatus::Unknown => 0,
            PortStatus::Unreachable => 1,
            PortStatus::Reachable => 2,
        }
    }

    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            1 => PortStatus::Unreachable,
            2 => PortStatus::Reachable,
            _ => PortStatus::Unknown,
        }
    }
}

impl std::fmt::Display for PortStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// PortState
// ============================================================================

/// One entry of a status table snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortState {
    /// The configured port number.
    pub port: u16,
    /// Its status at the time the snapshot was taken.
    pub status: PortStatus,
}

impl PortState {
    /// Create a new snapshot entry.
    pub fn new(port: u16, status: PortStatus) -> Self {
        Self { port, status }
    }
}

impl std::fmt::Display for PortState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Port {} ({})", self.port, self.status)
    }
}
