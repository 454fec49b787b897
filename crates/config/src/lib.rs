#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for trust-receive
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/trust-receive/config.toml)
//! - Environment variables (`TR_*`)
//! - CLI flags (applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tr_errors::{ConfigError, Error};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub verify: VerifyConfig,

    #[serde(default)]
    pub alert: AlertConfig,
}

/// Membership filter sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_capacity")]
    pub capacity: u64,
    #[serde(default = "default_fp_rate")]
    pub fp_rate: f64,
}

/// Which key-value engine backs the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Sqlite,
}

/// Persistent store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Database file for the sqlite backend
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

/// Verification engine settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerifyConfig {
    /// Per-report deadline for store I/O in milliseconds (unset = none)
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

/// Alert delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// External command run on each conflict; the message is appended as the
    /// last argument. Unset means alerts are only logged.
    #[serde(default)]
    pub command: Option<Vec<String>>,
    #[serde(default = "default_alert_timeout")]
    pub timeout_secs: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            fp_rate: default_fp_rate(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            path: None,
            key_prefix: default_key_prefix(),
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            command: None,
            timeout_secs: default_alert_timeout(),
        }
    }
}

// Default value functions for serde
fn default_capacity() -> u64 {
    1_000_000
}

fn default_fp_rate() -> f64 {
    0.01
}

fn default_key_prefix() -> String {
    "file:".to_string()
}

fn default_alert_timeout() -> u64 {
    10
}

fn invalid(field: &str, value: String) -> Error {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value,
    }
    .into()
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("trust-receive").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // TR_FILTER_CAPACITY
        if let Ok(capacity) = std::env::var("TR_FILTER_CAPACITY") {
            self.filter.capacity = capacity
                .parse()
                .map_err(|_| invalid("TR_FILTER_CAPACITY", capacity))?;
        }

        // TR_FILTER_FP_RATE
        if let Ok(rate) = std::env::var("TR_FILTER_FP_RATE") {
            self.filter.fp_rate = rate
                .parse()
                .map_err(|_| invalid("TR_FILTER_FP_RATE", rate))?;
        }

        // TR_STORE_BACKEND
        if let Ok(backend) = std::env::var("TR_STORE_BACKEND") {
            self.store.backend = match backend.as_str() {
                "memory" => StoreBackend::Memory,
                "sqlite" => StoreBackend::Sqlite,
                _ => return Err(invalid("TR_STORE_BACKEND", backend)),
            };
        }

        // TR_STORE_PATH
        if let Ok(path) = std::env::var("TR_STORE_PATH") {
            self.store.path = Some(PathBuf::from(path));
        }

        // TR_KEY_PREFIX
        if let Ok(prefix) = std::env::var("TR_KEY_PREFIX") {
            self.store.key_prefix = prefix;
        }

        // TR_DEADLINE_MS
        if let Ok(deadline) = std::env::var("TR_DEADLINE_MS") {
            let ms = deadline
                .parse()
                .map_err(|_| invalid("TR_DEADLINE_MS", deadline))?;
            self.verify.deadline_ms = Some(ms);
        }

        Ok(())
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero filter capacity, a false-positive rate
    /// outside (0, 1), a zero deadline, or an empty alert command.
    pub fn validate(&self) -> Result<(), Error> {
        if self.filter.capacity == 0 {
            return Err(invalid("filter.capacity", "0".to_string()));
        }
        if !(self.filter.fp_rate > 0.0 && self.filter.fp_rate < 1.0) {
            return Err(invalid("filter.fp_rate", self.filter.fp_rate.to_string()));
        }
        if self.verify.deadline_ms == Some(0) {
            return Err(invalid("verify.deadline_ms", "0".to_string()));
        }
        if matches!(&self.alert.command, Some(cmd) if cmd.is_empty()) {
            return Err(ConfigError::Invalid {
                message: "alert.command must name a program".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Get the sqlite database path (with default)
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.store.path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("trust-receive")
                .join("trust.sqlite")
        })
    }

    /// Per-report deadline, if configured
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.verify.deadline_ms.map(Duration::from_millis)
    }

    #[must_use]
    pub fn alert_timeout(&self) -> Duration {
        Duration::from_secs(self.alert.timeout_secs)
    }
}
