//! Redraw signal for renderers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

use crate::ports::ChangeNotifier;

/// A cloneable, coalescing "something changed" signal.
///
/// Workers call [`ChangeNotifier::notify`]; a renderer awaits
/// [`RedrawSignal::notified`]. Bursts of notifications between two waits
/// collapse into a single wake-up, so a slow renderer never falls behind.
#[derive(Debug, Clone, Default)]
pub struct RedrawSignal {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    notify: Notify,
    changes: AtomicU64,
}

impl RedrawSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until at least one change was signalled since the last wait.
    pub async fn notified(&self) {
        self.inner.notify.notified().await
    }

    /// Total number of notifications received.
    pub fn changes(&self) -> u64 {
        self.inner.changes.load(Ordering::Relaxed)
    }
}

impl ChangeNotifier for RedrawSignal {
    fn notify(&self) {
        self.inner.changes.fetch_add(1, Ordering::Relaxed);
        // notify_one stores a permit, so a change is never lost between waits.
        self.inner.notify.notify_one();
    }
}
