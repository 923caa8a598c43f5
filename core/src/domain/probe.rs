//! Outcome of a single connect attempt.

use std::io;

use super::PortStatus;

/// Result of one probe against a `(host, port)` pair.
///
/// Only `Reachable` counts as success. The other variants exist for
/// diagnostics; the retry loop treats all of them the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The connection was accepted.
    Reachable,
    /// The host actively refused the connection (RST).
    Refused,
    /// The connect did not finish within the configured timeout.
    TimedOut,
    /// Any other failure: name resolution, unreachable network, etc.
    Failed(io::ErrorKind),
}

impl ProbeOutcome {
    /// Classify the error returned by a failed connect.
    pub fn from_io_error(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => ProbeOutcome::Refused,
            io::ErrorKind::TimedOut => ProbeOutcome::TimedOut,
            kind => ProbeOutcome::Failed(kind),
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeOutcome::Reachable)
    }

    /// The table status this outcome maps to.
    pub fn status(&self) -> PortStatus {
        match self {
            ProbeOutcome::Reachable => PortStatus::Reachable,
            _ => PortStatus::Unreachable,
        }
    }
}

impl std::fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeOutcome::Reachable => write!(f, "reachable"),
            ProbeOutcome::Refused => write!(f, "connection refused"),
            ProbeOutcome::TimedOut => write!(f, "timed out"),
            ProbeOutcome::Failed(kind) => write!(f, "failed ({})", kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_failure_maps_to_unreachable() {
        let failures = [
            ProbeOutcome::Refused,
            ProbeOutcome::TimedOut,
            ProbeOutcome::Failed(io::ErrorKind::NotFound),
        ];
        for outcome in failures {
            assert!(!outcome.is_reachable());
            assert_eq!(outcome.status(), PortStatus::Unreachable);
        }
        assert_eq!(ProbeOutcome::Reachable.status(), PortStatus::Reachable);
    }

    #[test]
    fn test_from_io_error() {
        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert_eq!(ProbeOutcome::from_io_error(&refused), ProbeOutcome::Refused);

        let other = io::Error::new(io::ErrorKind::AddrNotAvailable, "nope");
        assert_eq!(
            ProbeOutcome::from_io_error(&other),
            ProbeOutcome::Failed(io::ErrorKind::AddrNotAvailable)
        );
    }
}
