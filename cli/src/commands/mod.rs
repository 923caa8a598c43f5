//! Subcommand implementations.

pub mod check;
pub mod config;
pub mod wait;

use std::path::PathBuf;

use anyhow::{bail, Result};
use portwatch_core::{Config, ConfigStore};
use tracing::debug;

use crate::Targets;

/// Open the config store at `path`, or at the default location.
pub fn open_store(path: Option<PathBuf>) -> Result<ConfigStore> {
    Ok(match path {
        Some(path) => ConfigStore::with_path(path),
        None => ConfigStore::new()?,
    })
}

/// Load the config file and apply command-line overrides.
pub async fn load_config(store: &ConfigStore, targets: &Targets) -> Result<Config> {
    let mut config = store.load().await?;

    if let Some(host) = &targets.host {
        config.host = host.clone();
    }
    if !targets.ports.is_empty() {
        config.ports = targets.ports.clone();
    }
    if let Some(timeout_ms) = targets.timeout_ms {
        config.connect_timeout_ms = timeout_ms;
    }
    config.validate()?;

    if config.ports.is_empty() {
        bail!(
            "no ports to watch: pass --port or add some with `portwatch config add <port>` ({})",
            store.path().display()
        );
    }

    debug!(
        path = %store.path().display(),
        host = %config.host,
        ports = ?config.ports,
        "configuration loaded"
    );
    Ok(config)
}
