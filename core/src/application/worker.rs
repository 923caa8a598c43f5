//! Per-port retrying probe worker.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tracing::{debug, info};

use super::status_table::StatusSlot;
use crate::domain::{WorkerPhase, WorkerReport};
use crate::ports::{ChangeNotifier, ProbePort};

/// State shared between a running worker and its supervisor.
#[derive(Debug)]
pub(crate) struct WorkerHandle {
    port: u16,
    phase: AtomicU8,
    attempts: AtomicU64,
    /// Per-worker release, used by the supervisor's pre-join sweep.
    resume: Notify,
}

impl WorkerHandle {
    pub(crate) fn new(port: u16) -> Self {
        Self {
            port,
            phase: AtomicU8::new(WorkerPhase::Gated.to_u8()),
            attempts: AtomicU64::new(0),
            resume: Notify::new(),
        }
    }

    pub(crate) fn port(&self) -> u16 {
        self.port
    }

    pub(crate) fn phase(&self) -> WorkerPhase {
        WorkerPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Completed attempts. A nonzero count means this worker's status has
    /// already been written at least once.
    pub(crate) fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Acquire)
    }

    /// Let this worker past its gate even if the broadcast never reached it.
    ///
    /// The permit is stored, so this is effective whether or not the worker
    /// is already waiting.
    pub(crate) fn resume(&self) {
        self.resume.notify_one();
    }

    pub(crate) fn report(&self) -> WorkerReport {
        WorkerReport {
            port: self.port,
            phase: self.phase(),
            attempts: self.attempts(),
        }
    }

    fn set_phase(&self, phase: WorkerPhase) {
        self.phase.store(phase.to_u8(), Ordering::Release);
    }
}

/// Timing for a single worker.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WorkerTiming {
    pub(crate) retry_interval: Duration,
    pub(crate) cooldown: Duration,
}

/// Probes one port until it accepts a connection.
///
/// ```text
/// Gated ──release──► Attempting ──refused──► Attempting ...
///                         │
///                      success
///                         ▼
///                      Cooling ──cooldown──► Done
/// ```
///
/// Writes go to the worker's own [`StatusSlot`] only, followed by a change
/// notification. There is no retry limit: the loop ends on success or when
/// the task is aborted.
pub(crate) struct RetryingProbeWorker<P: ProbePort> {
    host: Arc<str>,
    probe: Arc<P>,
    slot: StatusSlot,
    notifier: Option<Arc<dyn ChangeNotifier>>,
    gate: watch::Receiver<bool>,
    handle: Arc<WorkerHandle>,
    timing: WorkerTiming,
}

impl<P: ProbePort> RetryingProbeWorker<P> {
    pub(crate) fn new(
        host: Arc<str>,
        probe: Arc<P>,
        slot: StatusSlot,
        notifier: Option<Arc<dyn ChangeNotifier>>,
        gate: watch::Receiver<bool>,
        timing: WorkerTiming,
    ) -> Self {
        let handle = Arc::new(WorkerHandle::new(slot.port()));
        Self {
            host,
            probe,
            slot,
            notifier,
            gate,
            handle,
            timing,
        }
    }

    pub(crate) fn handle(&self) -> Arc<WorkerHandle> {
        Arc::clone(&self.handle)
    }

    /// Run the worker to completion.
    pub(crate) async fn run(mut self) {
        let port = self.slot.port();

        self.wait_for_release().await;
        debug!(port, "probe worker released");

        loop {
            let outcome = self.probe.attempt(&self.host, port).await;
            let status = outcome.status();
            self.slot.set(status);
            // Counted after the write: readers that see the count see the status.
            let attempt = self.handle.attempts.fetch_add(1, Ordering::AcqRel) + 1;
            debug!(port, attempt, %outcome, "probe attempt finished");
            self.notify();

            if status.is_terminal() {
                info!(port, attempts = attempt, "port is reachable");
                break;
            }

            if self.timing.retry_interval.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(self.timing.retry_interval).await;
            }
        }

        self.handle.set_phase(WorkerPhase::Cooling);
        tokio::time::sleep(self.timing.cooldown).await;
        self.handle.set_phase(WorkerPhase::Done);
        debug!(port, "probe worker done");
    }

    /// Park until the broadcast release fires or the supervisor resumes
    /// this worker directly, then leave `Gated`.
    async fn wait_for_release(&mut self) {
        let gate = &mut self.gate;
        let released = async {
            // A closed gate never releases; only a direct resume can.
            let closed = gate.wait_for(|open| *open).await.is_err();
            if closed {
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = released => {}
            _ = self.handle.resume.notified() => {
                debug!(port = self.handle.port, "probe worker resumed directly");
            }
        }
        self.handle.set_phase(WorkerPhase::Attempting);
    }

    fn notify(&self) {
        if let Some(notifier) = &self.notifier {
            notifier.notify();
        }
    }
}
