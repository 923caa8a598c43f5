//! Probe port (interface).

use crate::domain::ProbeOutcome;

/// Port for testing whether a TCP endpoint accepts connections.
///
/// An implementation performs exactly one bounded attempt per call and
/// never retries internally; retrying is the worker's job. Failures are
/// reported as [`ProbeOutcome`] values, never as errors.
pub trait ProbePort: Send + Sync {
    /// Attempt a single connection to `host:port`.
    fn attempt(
        &self,
        host: &str,
        port: u16,
    ) -> impl std::future::Future<Output = ProbeOutcome> + Send;
}
