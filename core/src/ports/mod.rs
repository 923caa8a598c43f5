//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the seams the probing engine uses to talk to the
//! outside world. Implementations live in `adapters`.

mod notifier;
mod probe;

pub use notifier::ChangeNotifier;
pub use probe::ProbePort;
