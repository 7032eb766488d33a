//! Exporter configuration.
//!
//! Loaded once at startup from a YAML file, with `BLUTRV_*` environment
//! variables layered on top:
//!
//! ```yaml
//! address: 192.168.1.50
//! username: admin
//! password: secret
//! timeout_seconds: 5
//! ```

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/shelly-blu-trv-exporter/config.yaml";

/// Prefix for environment variable overrides (`BLUTRV_ADDRESS`, ...).
pub const ENV_PREFIX: &str = "BLUTRV";

/// Timeout applied when `timeout_seconds` is missing or zero.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 5;

/// Default HTTP listen address.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or parsed.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A required field is missing or empty.
    #[error("Missing required configuration field: {0}")]
    MissingField(&'static str),
}

/// Exporter settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExporterConfig {
    /// Gateway `host` or `host:port`.
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Gateway request timeout; 0 means [`DEFAULT_TIMEOUT_SECONDS`].
    #[serde(default)]
    pub timeout_seconds: u64,
    /// Address the exporter listens on.
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Device sub-type to export.
    #[serde(default = "default_subtype")]
    pub subtype: String,
    /// Metric name prefix.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

fn default_subtype() -> String {
    blutrv_gateway::DEFAULT_SUBTYPE.to_string()
}

fn default_namespace() -> String {
    blutrv_metrics::DEFAULT_NAMESPACE.to_string()
}

impl ExporterConfig {
    /// Load from a file plus environment overrides, then validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        settings.try_deserialize::<Self>()?.validated()
    }

    /// Parse YAML text without consulting the environment, then validate.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?;

        settings.try_deserialize::<Self>()?.validated()
    }

    /// Apply defaults and reject incomplete settings.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.timeout_seconds == 0 {
            self.timeout_seconds = DEFAULT_TIMEOUT_SECONDS;
        }

        if self.address.is_empty() {
            return Err(ConfigError::MissingField("address"));
        }
        if self.username.is_empty() {
            return Err(ConfigError::MissingField("username"));
        }
        if self.password.is_empty() {
            return Err(ConfigError::MissingField("password"));
        }

        Ok(self)
    }

    /// Gateway request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
