use crate::messages::wire::{WireConfig, DEFAULT_READ_TIMEOUT, DEFAULT_WRITE_TIMEOUT, MAX_MESSAGE_SIZE};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_PORT: u16 = 3000;
/// Environment variable overriding the relay's listen port
pub const PORT_ENV: &str = "PORT";

/// Framing limits as stored in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireSettings {
    pub max_message_size: usize,
    pub read_timeout_secs: u64,
    pub write_timeout_secs: u64,
}

impl Default for WireSettings {
    fn default() -> Self {
        Self {
            max_message_size: MAX_MESSAGE_SIZE,
            read_timeout_secs: DEFAULT_READ_TIMEOUT.as_secs(),
            write_timeout_secs: DEFAULT_WRITE_TIMEOUT.as_secs(),
        }
    }
}

impl From<&WireSettings> for WireConfig {
    fn from(settings: &WireSettings) -> Self {
        WireConfig::new(
            settings.max_message_size,
            Duration::from_secs(settings.read_timeout_secs),
            Duration::from_secs(settings.write_timeout_secs),
        )
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the relay listens on
    pub bind_addr: String,
    /// Relay address `play` connects to when none is given
    pub server_addr: String,
    /// Draw pieces with Unicode chess glyphs
    pub unicode: bool,
    pub wire: WireSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{}", DEFAULT_PORT),
            server_addr: format!("127.0.0.1:{}", DEFAULT_PORT),
            unicode: false,
            wire: WireSettings::default(),
        }
    }
}

impl Config {
    /// Get the default config directory
    pub fn default_config_dir() -> Result<PathBuf> {
        ProjectDirs::from("dev", "duel", "duel")
            .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    /// Get the default config file path
    pub fn default_config_file() -> Result<PathBuf> {
        Ok(Self::default_config_dir()?.join("config.toml"))
    }

    /// Load from `path`, or the default location when `None`.
    /// A missing file yields the defaults without writing anything.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_file = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_config_file()?,
        };

        if !config_file.exists() {
            debug!("No configuration at {}, using defaults", config_file.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_file)
            .with_context(|| format!("Failed to read configuration file {}", config_file.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file {}", config_file.display()))?;
        debug!("Loaded configuration from {}", config_file.display());
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path, content).context("Failed to write configuration file")?;
        info!("Wrote configuration to {}", path.display());
        Ok(())
    }

    /// Write the defaults to `path` unless a file is already there.
    /// Returns whether a file was written.
    pub fn init_at(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        Config::default().save_to(path)?;
        Ok(true)
    }

    /// Listen address after applying a port override
    pub fn bind_addr_with_port(&self, port: Option<&str>) -> Result<String> {
        let Some(port) = port else {
            return Ok(self.bind_addr.clone());
        };
        let port: u16 = port
            .trim()
            .parse()
            .with_context(|| format!("Invalid {} value: {:?}", PORT_ENV, port))?;
        let host = self
            .bind_addr
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or(&self.bind_addr);
        Ok(format!("{}:{}", host, port))
    }

    /// Listen address with the `PORT` environment variable applied
    pub fn effective_bind_addr(&self) -> Result<String> {
        let port = std::env::var(PORT_ENV).ok();
        self.bind_addr_with_port(port.as_deref())
    }

    pub fn wire_config(&self) -> WireConfig {
        WireConfig::from(&self.wire)
    }
}
