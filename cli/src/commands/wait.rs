//! Wait command - block until every port is reachable.

use std::collections::HashMap;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use portwatch_core::{Config, PortState, PortStatus, ProbeSupervisor, RedrawSignal, StatusTable};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::tui;

/// Exit code used when the wait is interrupted (128 + SIGINT).
const INTERRUPTED: u8 = 130;

/// How a wait ended.
pub enum WaitOutcome {
    /// Every port became reachable.
    Completed,
    /// The user gave up first.
    Interrupted,
}

/// Handles the renderer needs while the supervisor runs.
pub struct WaitSession {
    pub table: Arc<StatusTable>,
    pub signal: RedrawSignal,
    pub done: oneshot::Receiver<()>,
    pub supervisor: JoinHandle<portwatch_core::Result<()>>,
}

impl WaitSession {
    /// Called once the completion hook was dropped without firing: surface
    /// the supervisor's error.
    pub async fn failure(self) -> anyhow::Error {
        match self.supervisor.await {
            Ok(Err(e)) => e.into(),
            Err(e) => e.into(),
            Ok(Ok(())) => anyhow!("supervisor finished without signalling completion"),
        }
    }
}

pub async fn run(config: Config, json: bool, interactive: bool) -> Result<ExitCode> {
    let session = start(&config)?;
    let table = Arc::clone(&session.table);

    let outcome = if interactive {
        tui::run(session, &config).await?
    } else {
        watch_plain(session).await?
    };

    match outcome {
        WaitOutcome::Completed => {
            if json {
                println!("{}", serde_json::to_string_pretty(&table.snapshot())?);
            } else if !interactive {
                eprintln!("Ready to go!");
            }
            if !interactive {
                tokio::time::sleep(config.exit_delay()).await;
            }
            Ok(ExitCode::SUCCESS)
        }
        WaitOutcome::Interrupted => {
            eprintln!("Interrupted before all ports were reachable.");
            Ok(ExitCode::from(INTERRUPTED))
        }
    }
}

/// Configure, release, and start joining the probe workers.
fn start(config: &Config) -> Result<WaitSession> {
    let (done_tx, done) = oneshot::channel();
    let signal = RedrawSignal::new();

    let mut supervisor = ProbeSupervisor::new(config.host.clone(), config.watch_settings())
        .with_notifier(Arc::new(signal.clone()))
        .on_all_complete(move || {
            let _ = done_tx.send(());
        });

    supervisor.configure(&config.ports)?;
    let table = supervisor.table();
    supervisor.release_all();

    let supervisor = tokio::spawn(async move { supervisor.await_completion().await });

    Ok(WaitSession {
        table,
        signal,
        done,
        supervisor,
    })
}

/// Print one line per status transition until done or Ctrl-C.
async fn watch_plain(mut session: WaitSession) -> Result<WaitOutcome> {
    let mut reported = HashMap::new();
    // One listener for the whole wait, so a Ctrl-C landing mid-report is kept.
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    let completed = loop {
        tokio::select! {
            _ = session.signal.notified() => {
                report_changes(&session.table.snapshot(), &mut reported);
            }
            done = &mut session.done => {
                report_changes(&session.table.snapshot(), &mut reported);
                break done.is_ok();
            }
            _ = &mut interrupted => {
                return Ok(WaitOutcome::Interrupted);
            }
        }
    };

    if !completed {
        return Err(session.failure().await);
    }
    Ok(WaitOutcome::Completed)
}

fn report_changes(entries: &[PortState], reported: &mut HashMap<u16, PortStatus>) {
    for entry in entries {
        let previous = reported.insert(entry.port, entry.status);
        if previous == Some(entry.status) {
            continue;
        }
        match entry.status {
            PortStatus::Unreachable => eprintln!("port {} not ready yet!", entry.port),
            PortStatus::Reachable => eprintln!("port {} is ready!", entry.port),
            PortStatus::Unknown => {}
        }
    }
}
