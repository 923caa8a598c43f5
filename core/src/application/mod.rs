//! Application layer - The probing engine.
//!
//! - `status_table`: shared port → status mapping read by renderers
//! - `worker`: one retrying probe loop per port
//! - `supervisor`: start barrier, completion join, and shutdown hook

mod status_table;
mod supervisor;
mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use status_table::StatusTable;
pub use supervisor::ProbeSupervisor;
