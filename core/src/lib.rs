//! PortWatch Core Library
//!
//! Concurrent TCP reachability probing. Given an ordered list of ports on a
//! host, it runs one retrying probe per port until every port accepts a
//! connection, keeping a shared status table that a renderer can read at
//! any time.
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Status, lifecycle and probe outcome models
//! - `ports`: Trait definitions (probe, change notifier)
//! - `adapters`: TCP probe and redraw signal
//! - `application`: Status table, probe workers, supervisor
//!
//! # Example
//! ```no_run
//! use portwatch_core::{Config, ProbeSupervisor};
//!
//! # async fn run() -> portwatch_core::Result<()> {
//! let config = Config { ports: vec![22, 80], ..Config::default() };
//! let mut supervisor = ProbeSupervisor::new(config.host.clone(), config.watch_settings())
//!     .on_all_complete(|| println!("Ready to go!"));
//!
//! supervisor.configure(&config.ports)?;
//! supervisor.release_all();
//! supervisor.await_completion().await?;
//! # Ok(())
//! # }
//! ```

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod config;
pub mod error;

// Re-export domain types (primary API)
pub use domain::{PortState, PortStatus, ProbeOutcome, SupervisorState, WorkerPhase, WorkerReport};

// Re-export other commonly used types
pub use adapters::{RedrawSignal, TcpProbe};
pub use application::{ProbeSupervisor, StatusTable};
pub use config::{Config, ConfigStore, WatchSettings};
pub use error::{Error, Result};
pub use ports::{ChangeNotifier, ProbePort};
