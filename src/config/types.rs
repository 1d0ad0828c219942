//! Core configuration types and loading.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

use super::defaults::{default_http_address, default_http_path, default_metrics_path, default_true};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Gateway configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Webhook listener.
    #[serde(default)]
    pub http: HttpConfig,
    /// Prometheus endpoint.
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// Request validation shared by every trigger word.
    #[serde(default)]
    pub dispatcher: DispatcherSettings,
    /// Trigger bindings, keyed by an arbitrary binding name.
    #[serde(default)]
    pub triggers: BTreeMap<String, BindingConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Webhook listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Address to bind to (e.g., "0.0.0.0:8080").
    #[serde(default = "default_http_address")]
    pub address: SocketAddr,
    /// Path the platform posts to (e.g., "/outgoing").
    #[serde(default = "default_http_path")]
    pub path: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: default_http_address(),
            path: default_http_path(),
        }
    }
}

/// Prometheus endpoint configuration, served on the webhook listener.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_metrics_path(),
        }
    }
}

/// Dispatcher-level request validation.
///
/// When `validate_token` is set and `tokens` is non-empty, a request must
/// carry one of `tokens`. An empty list disables the check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DispatcherSettings {
    #[serde(default)]
    pub validate_token: bool,
    #[serde(default)]
    pub tokens: Vec<String>,
}

/// One trigger binding: a word, an optional sub-command path, and the
/// drivers chained at that path.
///
/// ```toml
/// [triggers.deploy]
/// word = "!deploy"
/// commands = ["app", "web"]
/// drivers = ["gogap-confirm", "gogap-commands"]
///
/// [triggers.deploy.gogap-commands]
/// timeout = 60
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BindingConfig {
    pub word: String,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub drivers: Vec<String>,
    /// Per-driver option tables, keyed by driver name.
    #[serde(flatten)]
    pub options: toml::Table,
}
