//! Probe supervisor: start barrier, completion join, and shutdown hook.
//!
//! ```text
//! configure([p0, p1, ...])
//!     ├─ StatusTable.initialize()           every port = Unknown
//!     └─ spawn RetryingProbeWorker per port  (Gated, parked on the gate)
//!
//! release_all()
//!     └─ gate.send(true)  ──► one broadcast wakes every worker together
//!
//! await_completion()
//!     ├─ sleep(settle)
//!     ├─ sweep: any worker still Gated ──► WorkerHandle::resume()
//!     ├─ join every worker task
//!     └─ on_all_complete()  (exactly once)
//!
//! shutdown() / worker failure
//!     └─ abort what is left ──► Stopped  (completion is never reported)
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::status_table::StatusTable;
use super::worker::{RetryingProbeWorker, WorkerHandle, WorkerTiming};
use crate::adapters::TcpProbe;
use crate::config::WatchSettings;
use crate::domain::{SupervisorState, WorkerPhase, WorkerReport};
use crate::error::{Error, Result};
use crate::ports::{ChangeNotifier, ProbePort};

type CompletionHook = Box<dyn FnOnce() + Send>;

struct WorkerEntry {
    handle: Arc<WorkerHandle>,
    /// `None` once joined or aborted.
    task: Option<JoinHandle<()>>,
}

/// First worker task that ended without reporting done.
#[derive(Debug, Clone)]
struct WorkerFailure {
    port: u16,
    reason: String,
}

impl WorkerFailure {
    fn to_error(&self) -> Error {
        Error::WorkerFailed {
            port: self.port,
            reason: self.reason.clone(),
        }
    }
}

/// Owns one retrying probe worker per configured port.
///
/// Workers are spawned on the current tokio runtime by [`configure`] and
/// stay parked until [`release_all`] opens the shared gate. The status
/// table is shared read-only with renderers through [`table`].
///
/// [`configure`]: ProbeSupervisor::configure
/// [`release_all`]: ProbeSupervisor::release_all
/// [`table`]: ProbeSupervisor::table
pub struct ProbeSupervisor<P: ProbePort + 'static = TcpProbe> {
    host: Arc<str>,
    probe: Arc<P>,
    settings: WatchSettings,
    table: Arc<StatusTable>,
    notifier: Option<Arc<dyn ChangeNotifier>>,
    on_all_complete: Option<CompletionHook>,
    gate: watch::Sender<bool>,
    workers: Vec<WorkerEntry>,
    configured: bool,
    failure: Option<WorkerFailure>,
    state: SupervisorState,
}

impl ProbeSupervisor<TcpProbe> {
    /// Create a supervisor that probes `host` over TCP.
    pub fn new(host: impl Into<String>, settings: WatchSettings) -> Self {
        Self::with_probe(host, TcpProbe::new(settings.connect_timeout), settings)
    }
}

impl<P: ProbePort + 'static> ProbeSupervisor<P> {
    /// Create a supervisor using a custom probe implementation.
    pub fn with_probe(host: impl Into<String>, probe: P, settings: WatchSettings) -> Self {
        let (gate, _) = watch::channel(false);
        Self {
            host: Arc::from(host.into()),
            probe: Arc::new(probe),
            settings,
            table: Arc::new(StatusTable::new()),
            notifier: None,
            on_all_complete: None,
            gate,
            workers: Vec::new(),
            configured: false,
            failure: None,
            state: SupervisorState::Configuring,
        }
    }

    /// Invoke `notifier` after every status write.
    pub fn with_notifier(mut self, notifier: Arc<dyn ChangeNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Run `hook` once, after every worker has completed.
    pub fn on_all_complete<F>(mut self, hook: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_all_complete = Some(Box::new(hook));
        self
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Shared status table, for renderers.
    pub fn table(&self) -> Arc<StatusTable> {
        Arc::clone(&self.table)
    }

    /// Per-worker phase and attempt counts, in configuration order.
    pub fn workers(&self) -> Vec<WorkerReport> {
        self.workers.iter().map(|w| w.handle.report()).collect()
    }

    /// Create one gated worker per distinct port and mark every port `Unknown`.
    ///
    /// Must run inside a tokio runtime. Duplicate ports share one table entry
    /// and one worker. Fails if called twice, after release, or with port 0.
    pub fn configure(&mut self, ports: &[u16]) -> Result<()> {
        self.configure_gated(ports, &[])
    }

    /// Like [`configure`](Self::configure), but workers for ports listed in
    /// `detached` are never subscribed to the broadcast gate.
    fn configure_gated(&mut self, ports: &[u16], detached: &[u16]) -> Result<()> {
        if self.configured || self.state != SupervisorState::Configuring {
            return Err(Error::InvalidState {
                operation: "configure",
                state: self.state,
            });
        }
        if let Some(&port) = ports.iter().find(|&&p| p == 0) {
            return Err(Error::InvalidPort(port));
        }

        self.table.initialize(ports);
        self.configured = true;

        let timing = WorkerTiming {
            retry_interval: self.settings.retry_interval,
            cooldown: self.settings.cooldown,
        };

        let mut seen = HashSet::new();
        for &port in ports {
            if !seen.insert(port) {
                continue;
            }
            let Some(slot) = self.table.slot(port) else {
                continue;
            };

            let gate = if detached.contains(&port) {
                watch::channel(false).1
            } else {
                self.gate.subscribe()
            };

            let worker = RetryingProbeWorker::new(
                Arc::clone(&self.host),
                Arc::clone(&self.probe),
                slot,
                self.notifier.clone(),
                gate,
                timing,
            );
            let handle = worker.handle();
            let task = tokio::spawn(worker.run());
            self.workers.push(WorkerEntry {
                handle,
                task: Some(task),
            });
        }

        info!(
            host = %self.host,
            ports = ports.len(),
            workers = self.workers.len(),
            "probe workers configured"
        );
        Ok(())
    }

    /// Open the start gate for every worker at once.
    ///
    /// A second call is a no-op.
    pub fn release_all(&mut self) {
        if self.state != SupervisorState::Configuring {
            debug!(state = %self.state, "release ignored");
            return;
        }

        self.gate.send_replace(true);
        self.state = SupervisorState::Released;
        info!(workers = self.workers.len(), "probe workers released");
    }

    /// Wait until every worker has reported done, then fire the completion hook.
    ///
    /// Only the calling task waits. Before joining, any worker that still
    /// sits at its gate is resumed directly, so a lost release can never
    /// deadlock the join. Calling again after completion returns at once.
    ///
    /// If a worker task fails, the remaining workers are aborted and this
    /// and every later call return [`Error::WorkerFailed`]. After
    /// [`shutdown`](Self::shutdown) it returns [`Error::InvalidState`]. In
    /// neither case does the completion hook fire.
    pub async fn await_completion(&mut self) -> Result<()> {
        if let Some(failure) = &self.failure {
            return Err(failure.to_error());
        }
        match self.state {
            SupervisorState::Configuring | SupervisorState::Stopped => {
                return Err(Error::InvalidState {
                    operation: "await completion",
                    state: self.state,
                })
            }
            SupervisorState::Completed => return Ok(()),
            SupervisorState::Released | SupervisorState::AwaitingCompletion => {}
        }

        self.state = SupervisorState::AwaitingCompletion;

        if !self.workers.is_empty() {
            tokio::time::sleep(self.settings.settle).await;
            self.resume_gated_workers();
            self.join_workers().await?;
        }

        debug_assert!(self.table.all_reachable());
        self.state = SupervisorState::Completed;
        info!(ports = self.table.len(), "all ports reachable");

        if let Some(hook) = self.on_all_complete.take() {
            hook();
        }
        Ok(())
    }

    /// Abort any worker that is still running and drop every handle.
    ///
    /// Unless already completed, the supervisor moves to
    /// [`SupervisorState::Stopped`] and will never report completion.
    /// Safe to call any number of times.
    pub fn shutdown(&mut self) {
        let mut aborted = 0usize;
        for entry in self.workers.iter_mut() {
            if let Some(task) = entry.task.take() {
                task.abort();
                aborted += 1;
            }
        }

        if self.state != SupervisorState::Completed {
            self.state = SupervisorState::Stopped;
        }
        if aborted > 0 {
            debug!(aborted, "probe workers aborted");
        }
    }

    fn resume_gated_workers(&self) {
        for entry in &self.workers {
            if entry.handle.phase() == WorkerPhase::Gated {
                warn!(
                    port = entry.handle.port(),
                    "worker still gated after release, resuming it"
                );
                entry.handle.resume();
            }
        }
    }

    async fn join_workers(&mut self) -> Result<()> {
        for entry in self.workers.iter_mut() {
            let Some(task) = entry.task.as_mut() else {
                continue;
            };

            let joined = task.await;
            entry.task = None;

            if let Err(e) = joined {
                let port = entry.handle.port();
                error!(port, error = %e, "probe worker failed");
                self.failure = Some(WorkerFailure {
                    port,
                    reason: e.to_string(),
                });
                break;
            }
        }

        match &self.failure {
            Some(failure) => {
                let err = failure.to_error();
                self.shutdown();
                Err(err)
            }
            None => Ok(()),
        }
    }
}

impl<P: ProbePort + 'static> Drop for ProbeSupervisor<P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::ScriptedProbe;
    use crate::domain::{PortState, PortStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn settings() -> WatchSettings {
        WatchSettings {
            connect_timeout: Duration::from_millis(200),
            retry_interval: Duration::from_millis(1),
            cooldown: Duration::from_millis(100),
            settle: Duration::from_millis(20),
        }
    }

    fn supervisor(probe: ScriptedProbe) -> ProbeSupervisor<ScriptedProbe> {
        ProbeSupervisor::with_probe("127.0.0.1", probe, settings())
    }

    fn counting_hook() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        (fired, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_ports_start_unknown_and_nothing_probes_before_release() {
        let mut sup = supervisor(ScriptedProbe::new());
        sup.configure(&[22, 80, 443]).unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(sup.state(), SupervisorState::Configuring);
        assert!(sup
            .table()
            .snapshot()
            .iter()
            .all(|entry| entry.status == PortStatus::Unknown));
        assert!(sup
            .workers()
            .iter()
            .all(|w| w.phase == WorkerPhase::Gated && w.attempts == 0));
        assert_eq!(sup.probe.total_attempts(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_scenario_closed_port_blocks_until_opened() {
        let probe = ScriptedProbe::new();
        probe.open(80);
        let (fired, hook) = counting_hook();

        let mut sup = supervisor(probe).on_all_complete(hook);
        sup.configure(&[22, 80]).unwrap();
        let table = sup.table();
        let probe = Arc::clone(&sup.probe);

        sup.release_all();
        assert_eq!(sup.state(), SupervisorState::Released);

        let waiter = tokio::spawn(async move {
            sup.await_completion().await.unwrap();
            sup
        });

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(table.get(22), PortStatus::Unreachable);
        assert_eq!(table.get(80), PortStatus::Reachable);
        assert!(probe.attempts(22) > 1, "closed port should be retried");
        assert_eq!(probe.attempts(80), 1);
        assert!(!waiter.is_finished(), "must not return while 22 is closed");
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        probe.open(22);
        let sup = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("completion after port opens")
            .unwrap();

        assert_eq!(sup.state(), SupervisorState::Completed);
        assert_eq!(
            table.snapshot(),
            vec![
                PortState::new(22, PortStatus::Reachable),
                PortState::new(80, PortStatus::Reachable),
            ]
        );
        assert!(sup.workers().iter().all(|w| w.phase == WorkerPhase::Done));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_configuration_completes_immediately() {
        let (fired, hook) = counting_hook();
        let mut sup = supervisor(ScriptedProbe::new()).on_all_complete(hook);

        sup.configure(&[]).unwrap();
        sup.release_all();

        tokio::time::timeout(Duration::from_millis(50), sup.await_completion())
            .await
            .expect("empty supervisor must not wait")
            .unwrap();

        assert_eq!(sup.state(), SupervisorState::Completed);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(sup.table().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_workers_land_in_snapshot() {
        let probe = ScriptedProbe::with_latency(Duration::from_millis(5));
        probe.open_after(3000, 2);
        probe.open_after(3001, 2);

        let mut sup = supervisor(probe);
        sup.configure(&[3000, 3001]).unwrap();
        sup.release_all();
        sup.await_completion().await.unwrap();

        assert_eq!(
            sup.table().snapshot(),
            vec![
                PortState::new(3000, PortStatus::Reachable),
                PortState::new(3001, PortStatus::Reachable),
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_lost_release_is_swept_before_join() {
        let probe = ScriptedProbe::new();
        probe.open(22);
        probe.open(80);

        let mut sup = supervisor(probe);
        sup.configure_gated(&[22, 80], &[80]).unwrap();
        sup.release_all();

        tokio::time::sleep(Duration::from_millis(10)).await;
        let stuck = sup.workers().into_iter().find(|w| w.port == 80).unwrap();
        assert_eq!(stuck.phase, WorkerPhase::Gated);

        tokio::time::timeout(Duration::from_secs(2), sup.await_completion())
            .await
            .expect("sweep must unblock the detached worker")
            .unwrap();

        assert_eq!(sup.table().get(80), PortStatus::Reachable);
        assert!(sup.workers().iter().all(|w| w.phase == WorkerPhase::Done));
    }

    #[tokio::test]
    async fn test_completion_waits_for_slowest_cooldown() {
        let probe = ScriptedProbe::new();
        probe.open(22);
        probe.open_after(80, 20);

        let mut sup = supervisor(probe);
        sup.configure(&[22, 80]).unwrap();
        sup.release_all();
        sup.await_completion().await.unwrap();

        assert!(sup.workers().iter().all(|w| w.phase == WorkerPhase::Done));
        assert_eq!(sup.probe.attempts(80), 21);
    }

    #[tokio::test]
    async fn test_duplicate_ports_get_one_worker() {
        let probe = ScriptedProbe::new();
        probe.open(22);

        let mut sup = supervisor(probe);
        sup.configure(&[22, 80, 22]).unwrap();
        assert_eq!(sup.workers().len(), 2);
        assert_eq!(sup.table().len(), 3);

        sup.shutdown();
    }

    #[tokio::test]
    async fn test_misuse_is_rejected() {
        let mut sup = supervisor(ScriptedProbe::new());

        assert!(matches!(
            sup.await_completion().await,
            Err(Error::InvalidState { .. })
        ));
        assert!(matches!(sup.configure(&[22, 0]), Err(Error::InvalidPort(0))));

        sup.configure(&[22]).unwrap();
        assert!(matches!(
            sup.configure(&[80]),
            Err(Error::InvalidState { .. })
        ));

        sup.release_all();
        sup.release_all();
        assert_eq!(sup.state(), SupervisorState::Released);
        sup.shutdown();
    }

    #[tokio::test]
    async fn test_repeated_completion_and_shutdown_are_harmless() {
        let probe = ScriptedProbe::new();
        probe.open(22);
        let (fired, hook) = counting_hook();

        let mut sup = supervisor(probe).on_all_complete(hook);
        sup.configure(&[22]).unwrap();
        sup.release_all();

        sup.await_completion().await.unwrap();
        sup.await_completion().await.unwrap();
        sup.shutdown();
        sup.shutdown();
        assert_eq!(sup.state(), SupervisorState::Completed);
        drop(sup);

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_shutdown_before_completion_never_reports_done() {
        let (fired, hook) = counting_hook();
        let mut sup = supervisor(ScriptedProbe::new()).on_all_complete(hook);
        sup.configure(&[22]).unwrap();
        sup.release_all();
        tokio::time::sleep(Duration::from_millis(20)).await;

        sup.shutdown();
        assert_eq!(sup.state(), SupervisorState::Stopped);

        let result = sup.await_completion().await;
        assert!(matches!(
            result,
            Err(Error::InvalidState {
                state: SupervisorState::Stopped,
                ..
            })
        ));
        assert_eq!(sup.state(), SupervisorState::Stopped);
        assert_eq!(sup.table().get(22), PortStatus::Unreachable);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_failed_worker_fails_every_wait() {
        let probe = ScriptedProbe::new();
        probe.crash(22);
        let (fired, hook) = counting_hook();

        let mut sup = supervisor(probe).on_all_complete(hook);
        sup.configure(&[22, 80]).unwrap();
        let probe = Arc::clone(&sup.probe);
        sup.release_all();

        for _ in 0..2 {
            let result = tokio::time::timeout(Duration::from_secs(2), sup.await_completion())
                .await
                .expect("a failed worker must not hang the wait");
            assert!(matches!(result, Err(Error::WorkerFailed { port: 22, .. })));
        }
        assert_eq!(sup.state(), SupervisorState::Stopped);
        assert_eq!(sup.table().get(22), PortStatus::Unknown);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        // Port 80 never opens; its worker must have been aborted, not left retrying.
        tokio::time::sleep(Duration::from_millis(10)).await;
        let settled = probe.attempts(80);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(probe.attempts(80), settled);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_status_never_regresses_while_workers_race() {
        let probe = ScriptedProbe::with_latency(Duration::from_millis(1));
        let ports: Vec<u16> = (4000..4008).collect();
        for (i, &port) in ports.iter().enumerate() {
            probe.open_after(port, i as u64 * 3);
        }

        let mut sup = supervisor(probe);
        sup.configure(&ports).unwrap();
        let table = sup.table();
        sup.release_all();

        let mut reached = HashSet::new();
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let reports = sup.workers();
            for report in &reports {
                let status = table.get(report.port);
                if report.attempts > 0 {
                    assert_ne!(
                        status,
                        PortStatus::Unknown,
                        "port {} read Unknown after an attempt",
                        report.port
                    );
                }
                if reached.contains(&report.port) {
                    assert_eq!(
                        status,
                        PortStatus::Reachable,
                        "port {} left Reachable",
                        report.port
                    );
                } else if status == PortStatus::Reachable {
                    reached.insert(report.port);
                }
            }

            if reports.iter().all(|r| r.phase == WorkerPhase::Done) {
                break;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "workers did not finish"
            );
            tokio::task::yield_now().await;
        }

        sup.await_completion().await.unwrap();
        assert_eq!(reached.len(), ports.len());
    }

    #[tokio::test]
    async fn test_notifier_sees_every_write() {
        let probe = ScriptedProbe::new();
        probe.open_after(22, 2);
        probe.open(80);

        let writes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&writes);
        let notifier: Arc<dyn ChangeNotifier> = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut sup = supervisor(probe).with_notifier(notifier);
        sup.configure(&[22, 80]).unwrap();
        sup.release_all();
        sup.await_completion().await.unwrap();

        // 22: two refusals plus one success; 80: one success.
        assert_eq!(writes.load(Ordering::SeqCst), 4);
    }
}
