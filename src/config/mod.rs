//! Configuration management

use crate::protocol::{Endpoint, ProtocolKind, DEFAULT_RAW_PORT};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub session: SessionConfig,
    pub appearance: AppearanceConfig,
}

/// Where and how to connect
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Chat server host
    pub host: String,

    /// Port used with the JSON protocol
    pub port: u16,

    /// Port used with the raw protocol
    pub raw_port: u16,

    /// Wire format
    pub protocol: ProtocolKind,

    /// Give up on the initial connect after this many seconds
    pub connect_timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: ProtocolKind::Json.default_port(),
            raw_port: DEFAULT_RAW_PORT,
            protocol: ProtocolKind::Json,
            connect_timeout_secs: 10,
        }
    }
}

impl ConnectionConfig {
    /// Endpoint for `protocol`, each format using its own port
    pub fn endpoint(&self, protocol: ProtocolKind) -> Endpoint {
        let port = match protocol {
            ProtocolKind::Json => self.port,
            ProtocolKind::Raw => self.raw_port,
        };
        Endpoint::new(self.host.clone(), port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Session settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Pre-filled into the connect form
    pub username: String,

    /// Let an empty username through to the server
    pub allow_empty_username: bool,
}

/// Appearance settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    /// Show the bracketed timestamp column
    pub show_timestamps: bool,

    /// Maximum rows kept in the chat list
    pub history_limit: usize,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            show_timestamps: true,
            history_limit: 1000,
        }
    }
}

impl Config {
    /// Load config from `path`, or from the default location when `None`.
    ///
    /// A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::config_path);

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    /// Parse a config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wschat")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Log file written while the terminal UI owns the screen
    pub fn log_path() -> PathBuf {
        Self::config_dir().join("wschat.log")
    }
}
