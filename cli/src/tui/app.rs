//! TUI application state.

use std::sync::Arc;

use portwatch_core::{PortState, PortStatus, StatusTable};

/// Read-only view over the shared status table.
pub struct App {
    table: Arc<StatusTable>,
    host: String,
    finished: bool,
}

impl App {
    pub fn new(table: Arc<StatusTable>, host: String) -> Self {
        Self {
            table,
            host,
            finished: false,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Every configured port with its current status, in config order.
    pub fn entries(&self) -> Vec<PortState> {
        self.table.snapshot()
    }

    /// Mark the run as complete; every port is reachable.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    pub fn status_line(&self) -> String {
        if self.finished {
            return "Ready to go!".to_string();
        }

        progress(&self.entries())
    }
}

fn progress(entries: &[PortState]) -> String {
    let up = entries
        .iter()
        .filter(|e| e.status == PortStatus::Reachable)
        .count();
    format!("{}/{} ports reachable", up, entries.len())
}
