//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions (Config, HttpConfig, BindingConfig)
//! - [`defaults`]: serde default value functions
//! - [`validation`]: startup checks over a parsed config

pub(crate) mod defaults;
mod types;
mod validation;

pub use types::{
    BindingConfig, Config, ConfigError, DispatcherSettings, HttpConfig, MetricsConfig,
};
pub use validation::{ValidationError, validate};
