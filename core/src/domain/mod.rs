//! Domain layer - Pure data models for the probing engine.
//!
//! These types have no I/O dependencies and can be tested in isolation.

mod lifecycle;
mod probe;
mod status;

// Re-export all domain types
pub use lifecycle::{SupervisorState, WorkerPhase, WorkerReport};
pub use probe::ProbeOutcome;
pub use status::{PortState, PortStatus};
