//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("http.path must start with '/', got '{0}'")]
    InvalidHttpPath(String),
    #[error("metrics.path must start with '/' and differ from http.path, got '{0}'")]
    InvalidMetricsPath(String),
    #[error("triggers.{0}.word is required")]
    MissingWord(String),
    #[error("triggers.{0}.drivers must list at least one driver")]
    MissingDrivers(String),
    #[error("triggers.{0}.drivers contains a blank driver name")]
    BlankDriver(String),
    #[error("triggers.{0}.commands contains an empty or spaced token")]
    InvalidCommand(String),
    #[error("triggers.{0} binds the same word and commands as triggers.{1}")]
    DuplicatePath(String, String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !config.http.path.starts_with('/') {
        errors.push(ValidationError::InvalidHttpPath(config.http.path.clone()));
    }
    if config.metrics.enabled
        && (!config.metrics.path.starts_with('/') || config.metrics.path == config.http.path)
    {
        errors.push(ValidationError::InvalidMetricsPath(config.metrics.path.clone()));
    }

    if config.dispatcher.validate_token && config.dispatcher.tokens.is_empty() {
        warn!("dispatcher.validate_token is set but no tokens are configured; token check disabled");
    }

    let mut paths: HashMap<(&str, &[String]), &str> = HashMap::new();
    for (name, binding) in &config.triggers {
        let path = (binding.word.trim(), binding.commands.as_slice());
        if let Some(first) = paths.insert(path, name) {
            errors.push(ValidationError::DuplicatePath(name.clone(), first.to_string()));
        }
        if binding.word.trim().is_empty() {
            errors.push(ValidationError::MissingWord(name.clone()));
        }
        if binding.drivers.is_empty() {
            errors.push(ValidationError::MissingDrivers(name.clone()));
        }
        if binding.drivers.iter().any(|d| d.trim().is_empty()) {
            errors.push(ValidationError::BlankDriver(name.clone()));
        }
        // Sub-command tokens are matched against whitespace-split text
        if binding
            .commands
            .iter()
            .any(|c| c.is_empty() || c.chars().any(char::is_whitespace))
        {
            errors.push(ValidationError::InvalidCommand(name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
