//! TCP connect probe.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::domain::ProbeOutcome;
use crate::ports::ProbePort;

/// Probes a port with a plain TCP connect bounded by a timeout.
///
/// SYN answered by SYN-ACK is `Reachable`, RST is `Refused`. A host that
/// silently drops the SYN would otherwise hang the attempt for the OS
/// connect timeout, so every attempt is capped at `connect_timeout`.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    connect_timeout: Duration,
}

impl TcpProbe {
    /// Timeout used by [`TcpProbe::default`].
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

    /// Create a probe with the given per-attempt connect timeout.
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CONNECT_TIMEOUT)
    }
}

impl ProbePort for TcpProbe {
    async fn attempt(&self, host: &str, port: u16) -> ProbeOutcome {
        match timeout(self.connect_timeout, TcpStream::connect((host, port))).await {
            // Dropping the stream closes the connection.
            Ok(Ok(_stream)) => ProbeOutcome::Reachable,
            Ok(Err(e)) => ProbeOutcome::from_io_error(&e),
            Err(_) => ProbeOutcome::TimedOut,
        }
    }
}
