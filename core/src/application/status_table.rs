//! Shared port → status table.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::{PortState, PortStatus};

/// Concurrency-safe mapping from port to its latest status.
///
/// The public surface is read-only. Writes go through the [`StatusSlot`]
/// each worker receives for its own port, so nothing outside the engine can
/// overwrite a worker's status or add ports that were never configured.
///
/// The lock only guards the table's structure (which ports exist, and in
/// what order). Each entry's status lives in its own atomic, so a reader
/// never sees a torn value and writers for different ports never contend
/// beyond a shared read lock. A snapshot may mix old and new values from
/// concurrent writers.
#[derive(Debug, Default)]
pub struct StatusTable {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    /// Configured order, duplicates included.
    order: Vec<u16>,
    slots: HashMap<u16, Arc<AtomicU8>>,
}

impl StatusTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table with every port set to `Unknown`.
    pub fn with_ports(ports: &[u16]) -> Self {
        let table = Self::new();
        table.initialize(ports);
        table
    }

    /// Replace the configured port list and reset every entry to `Unknown`.
    pub(crate) fn initialize(&self, ports: &[u16]) {
        let mut inner = self.inner.write();
        inner.order = ports.to_vec();
        inner.slots = ports
            .iter()
            .map(|&port| (port, Arc::new(AtomicU8::new(PortStatus::Unknown.to_u8()))))
            .collect();
    }

    /// Current status of `port`; `Unknown` if it was never set.
    pub fn get(&self, port: u16) -> PortStatus {
        self.inner
            .read()
            .slots
            .get(&port)
            .map(|slot| PortStatus::from_u8(slot.load(Ordering::Acquire)))
            .unwrap_or_default()
    }

    /// Every configured port with its status, in configuration order.
    pub fn snapshot(&self) -> Vec<PortState> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .map(|&port| {
                let status = inner
                    .slots
                    .get(&port)
                    .map(|slot| PortStatus::from_u8(slot.load(Ordering::Acquire)))
                    .unwrap_or_default();
                PortState::new(port, status)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().order.is_empty()
    }

    /// Whether every entry is `Reachable` (vacuously true when empty).
    pub fn all_reachable(&self) -> bool {
        self.inner
            .read()
            .slots
            .values()
            .all(|slot| PortStatus::from_u8(slot.load(Ordering::Acquire)) == PortStatus::Reachable)
    }

    /// Write handle scoped to a single configured port.
    pub(crate) fn slot(&self, port: u16) -> Option<StatusSlot> {
        self.inner.read().slots.get(&port).map(|cell| StatusSlot {
            port,
            cell: Arc::clone(cell),
        })
    }
}

/// Write access to exactly one entry of a [`StatusTable`].
///
/// Workers hold one of these instead of the whole table, so a worker can
/// only ever write its own port.
#[derive(Debug, Clone)]
pub(crate) struct StatusSlot {
    port: u16,
    cell: Arc<AtomicU8>,
}

impl StatusSlot {
    pub(crate) fn port(&self) -> u16 {
        self.port
    }

    pub(crate) fn set(&self, status: PortStatus) {
        self.cell.store(status.to_u8(), Ordering::Release);
    }

    #[cfg(test)]
    pub(crate) fn get(&self) -> PortStatus {
        PortStatus::from_u8(self.cell.load(Ordering::Acquire))
    }
}
