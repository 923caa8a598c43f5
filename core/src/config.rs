//! Configuration management for the watched port list and probe timing.
//!
//! Stores configuration in JSON format at `~/.portwatch/config.json`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};

/// Configuration data stored in JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Host every port is probed on.
    #[serde(default = "default_host")]
    pub host: String,

    /// Ports to wait for, in display order.
    #[serde(default)]
    pub ports: Vec<u16>,

    /// Upper bound for a single connect attempt, in milliseconds.
    #[serde(default = "default_connect_timeout", rename = "connectTimeoutMs")]
    pub connect_timeout_ms: u64,

    /// Pause between failed attempts, in milliseconds (0 retries at once).
    #[serde(default = "default_retry_interval", rename = "retryIntervalMs")]
    pub retry_interval_ms: u64,

    /// Pause after a port first becomes reachable, in milliseconds.
    #[serde(default = "default_cooldown", rename = "cooldownMs")]
    pub cooldown_ms: u64,

    /// Delay between release and the pre-join sweep, in milliseconds.
    #[serde(default = "default_settle", rename = "settleMs")]
    pub settle_ms: u64,

    /// How long the CLI lingers after every port is up, in milliseconds.
    #[serde(default = "default_exit_delay", rename = "exitDelayMs")]
    pub exit_delay_ms: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_connect_timeout() -> u64 {
    3_000
}

fn default_retry_interval() -> u64 {
    5
}

fn default_cooldown() -> u64 {
    100
}

fn default_settle() -> u64 {
    100
}

fn default_exit_delay() -> u64 {
    1_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            ports: Vec::new(),
            connect_timeout_ms: default_connect_timeout(),
            retry_interval_ms: default_retry_interval(),
            cooldown_ms: default_cooldown(),
            settle_ms: default_settle(),
            exit_delay_ms: default_exit_delay(),
        }
    }
}

impl Config {
    /// Check the values that serde cannot reject on its own.
    pub fn validate(&self) -> Result<()> {
        if let Some(&port) = self.ports.iter().find(|&&p| p == 0) {
            return Err(Error::InvalidPort(port));
        }
        if self.host.trim().is_empty() {
            return Err(Error::Config("host must not be empty".to_string()));
        }
        if self.connect_timeout_ms == 0 {
            return Err(Error::Config(
                "connectTimeoutMs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Timing knobs for the probing engine.
    pub fn watch_settings(&self) -> WatchSettings {
        WatchSettings {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            retry_interval: Duration::from_millis(self.retry_interval_ms),
            cooldown: Duration::from_millis(self.cooldown_ms),
            settle: Duration::from_millis(self.settle_ms),
        }
    }

    pub fn exit_delay(&self) -> Duration {
        Duration::from_millis(self.exit_delay_ms)
    }
}

/// Timing used by the supervisor and its workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSettings {
    /// Upper bound for one connect attempt.
    pub connect_timeout: Duration,
    /// Pause after a failed attempt; zero only yields to the scheduler.
    pub retry_interval: Duration,
    /// Pause between first success and reporting completion.
    pub cooldown: Duration,
    /// Delay before the supervisor sweeps for workers that missed the release.
    pub settle: Duration,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Config::default().watch_settings()
    }
}

/// Configuration store for the watched port list.
///
/// Handles reading and writing configuration to `~/.portwatch/config.json`.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.portwatch/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        let config_path = home.join(".portwatch").join("config.json");

        Ok(Self { config_path })
    }

    /// Create a config store with a custom path.
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &std::path::Path {
        &self.config_path
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub async fn load(&self) -> Result<Config> {
        if !fs::try_exists(&self.config_path).await.unwrap_or(false) {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub async fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;

        if let Some(config_dir) = self.config_path.parent() {
            fs::create_dir_all(config_dir)
                .await
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(config)?;

        // Write atomically by writing to temp file then renaming
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        file.sync_all()
            .await
            .map_err(|e| Error::Config(format!("Failed to sync config: {}", e)))?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        Ok(())
    }

    /// Get the configured ports, in order.
    pub async fn get_ports(&self) -> Result<Vec<u16>> {
        Ok(self.load().await?.ports)
    }

    /// Append a port to the watch list.
    pub async fn add_port(&self, port: u16) -> Result<()> {
        if port == 0 {
            return Err(Error::InvalidPort(port));
        }

        let mut config = self.load().await?;
        if config.ports.contains(&port) {
            return Err(Error::Config(format!(
                "Port {} is already being watched",
                port
            )));
        }

        config.ports.push(port);
        self.save(&config).await
    }

    /// Remove every occurrence of a port from the watch list.
    pub async fn remove_port(&self, port: u16) -> Result<()> {
        let mut config = self.load().await?;
        let before = config.ports.len();
        config.ports.retain(|&p| p != port);

        if config.ports.len() == before {
            return Err(Error::Config(format!("Port {} is not being watched", port)));
        }
        self.save(&config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn test_store() -> (ConfigStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        (ConfigStore::with_path(path), dir)
    }

    #[tokio::test]
    async fn test_load_nonexistent() {
        let (store, _dir) = test_store().await;
        let config = store.load().await.unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.host, "localhost");
        assert!(config.ports.is_empty());
    }

    #[tokio::test]
    async fn test_minimal_file_uses_defaults() {
        let (store, _dir) = test_store().await;
        let path = store.path().to_path_buf();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{ "ports": [22, 80] }"#).unwrap();

        let config = store.load().await.unwrap();
        assert_eq!(config.ports, vec![22, 80]);
        assert_eq!(config.cooldown_ms, 100);
        assert_eq!(config.connect_timeout_ms, 3_000);
    }

    #[tokio::test]
    async fn test_load_rejects_port_zero() {
        let (store, _dir) = test_store().await;
        let path = store.path().to_path_buf();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{ "ports": [22, 0] }"#).unwrap();

        assert!(matches!(store.load().await, Err(Error::InvalidPort(0))));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let (store, _dir) = test_store().await;

        let config = Config {
            host: "10.0.0.5".to_string(),
            ports: vec![2222, 2223],
            retry_interval_ms: 0,
            ..Config::default()
        };
        store.save(&config).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, config);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("retryIntervalMs"));
    }

    #[tokio::test]
    async fn test_add_and_remove_ports() {
        let (store, _dir) = test_store().await;

        store.add_port(22).await.unwrap();
        store.add_port(80).await.unwrap();
        assert_eq!(store.get_ports().await.unwrap(), vec![22, 80]);

        assert!(store.add_port(22).await.is_err());
        assert!(store.add_port(0).await.is_err());

        store.remove_port(22).await.unwrap();
        assert_eq!(store.get_ports().await.unwrap(), vec![80]);
        assert!(store.remove_port(22).await.is_err());
    }

    #[test]
    fn test_watch_settings() {
        let settings = Config::default().watch_settings();
        assert_eq!(settings.connect_timeout, Duration::from_secs(3));
        assert_eq!(settings.cooldown, Duration::from_millis(100));
        assert_eq!(settings.settle, Duration::from_millis(100));
    }
}
