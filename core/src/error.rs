//! Error types for the portwatch-core library.
//!
//! Probe failures are not errors: a refused or timed-out connect is an
//! ordinary [`ProbeOutcome`](crate::domain::ProbeOutcome) that drives the
//! retry loop. The variants here cover misuse of the engine, worker task
//! failures, and configuration I/O.

use thiserror::Error;

use crate::domain::SupervisorState;

/// Result type alias for portwatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or driving the probing engine.
#[derive(Error, Debug)]
pub enum Error {
    /// Port 0 cannot be probed.
    #[error("Invalid port: {0} (expected 1-65535)")]
    InvalidPort(u16),

    /// A supervisor operation was invoked in the wrong lifecycle state.
    #[error("Cannot {operation} while supervisor is {state}")]
    InvalidState {
        operation: &'static str,
        state: SupervisorState,
    },

    /// A probe worker task panicked or was aborted before reporting done.
    #[error("Worker for port {port} failed: {reason}")]
    WorkerFailed { port: u16, reason: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
