//! Worker and supervisor lifecycle states.

use serde::{Deserialize, Serialize};

/// Where a single probe worker is in its run.
///
/// ```text
/// Gated -> Attempting -> (Attempting)* -> Cooling -> Done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum WorkerPhase {
    /// Spawned but waiting for the release signal; no network I/O yet.
    #[default]
    Gated,
    /// Probing in a loop until the port accepts a connection.
    Attempting,
    /// Port reached; pausing briefly before reporting completion.
    Cooling,
    /// Completion reported; no further I/O or table writes.
    Done,
}

impl WorkerPhase {
    pub(crate) fn to_u8(self) -> u8 {
        match self {
            WorkerPhase::Gated => 0,
            WorkerPhase::Attempting => 1,
            WorkerPhase::Cooling => 2,
            WorkerPhase::Done => 3,
        }
    }

    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            1 => WorkerPhase::Attempting,
            2 => WorkerPhase::Cooling,
            3 => WorkerPhase::Done,
            _ => WorkerPhase::Gated,
        }
    }
}

impl std::fmt::Display for WorkerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkerPhase::Gated => "gated",
            WorkerPhase::Attempting => "attempting",
            WorkerPhase::Cooling => "cooling",
            WorkerPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Lifecycle of a [`ProbeSupervisor`](crate::application::ProbeSupervisor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SupervisorState {
    /// Workers are being constructed; none may probe yet.
    #[default]
    Configuring,
    /// The start barrier has fired.
    Released,
    /// Joining outstanding workers.
    AwaitingCompletion,
    /// Every worker reported done.
    Completed,
    /// Shut down, or a worker failed, before every worker reported done.
    /// Completion can no longer be reached.
    Stopped,
}

impl std::fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SupervisorState::Configuring => "configuring",
            SupervisorState::Released => "released",
            SupervisorState::AwaitingCompletion => "awaiting completion",
            SupervisorState::Completed => "completed",
            SupervisorState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Point-in-time view of one worker, for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerReport {
    pub port: u16,
    pub phase: WorkerPhase,
    /// Number of probe attempts completed so far.
    pub attempts: u64,
}
