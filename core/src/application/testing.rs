//! Test doubles shared by the application layer's unit tests.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::RwLock;

use crate::domain::ProbeOutcome;
use crate::ports::ProbePort;

/// A probe whose answers are scripted per port.
///
/// Ports are refused until opened, either explicitly with [`open`] or
/// automatically after a number of refusals with [`open_after`].
///
/// [`open`]: ScriptedProbe::open
/// [`open_after`]: ScriptedProbe::open_after
#[derive(Debug, Default)]
pub(crate) struct ScriptedProbe {
    ports: RwLock<HashMap<u16, Script>>,
    latency: Duration,
}

#[derive(Debug, Default, Clone, Copy)]
struct Script {
    open: bool,
    crash: bool,
    refusals_left: Option<u64>,
    attempts: u64,
}

impl ScriptedProbe {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Every attempt takes at least `latency`.
    pub(crate) fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub(crate) fn open(&self, port: u16) {
        self.ports.write().entry(port).or_default().open = true;
    }

    /// Refuse the next `refusals` attempts, then accept.
    pub(crate) fn open_after(&self, port: u16, refusals: u64) {
        self.ports.write().entry(port).or_default().refusals_left = Some(refusals);
    }

    /// Panic on the next attempt, taking the worker task down with it.
    pub(crate) fn crash(&self, port: u16) {
        self.ports.write().entry(port).or_default().crash = true;
    }

    pub(crate) fn attempts(&self, port: u16) -> u64 {
        self.ports.read().get(&port).map(|s| s.attempts).unwrap_or(0)
    }

    pub(crate) fn total_attempts(&self) -> u64 {
        self.ports.read().values().map(|s| s.attempts).sum()
    }
}

impl ProbePort for ScriptedProbe {
    async fn attempt(&self, _host: &str, port: u16) -> ProbeOutcome {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let crash = {
            let mut ports = self.ports.write();
            let script = ports.entry(port).or_default();
            script.attempts += 1;
            script.crash
        };
        if crash {
            panic!("scripted crash on port {port}");
        }

        let mut ports = self.ports.write();
        let script = ports.entry(port).or_default();

        if let Some(left) = script.refusals_left.as_mut() {
            if *left == 0 {
                script.open = true;
            } else {
                *left -= 1;
            }
        }

        if script.open {
            ProbeOutcome::Reachable
        } else {
            ProbeOutcome::Refused
        }
    }
}
