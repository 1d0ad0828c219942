//! Trigger driver registry.
//!
//! Maps a driver name to the factory that builds its trigger. A process-wide
//! instance, pre-loaded with the built-in drivers, is available through
//! [`global`]. Registration is append-only: a name is taken once, for the
//! life of the process.

use crate::error::BindError;
use crate::triggers::{Trigger, TriggerFactory, register_builtins};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, error};

/// Catalog of trigger drivers by name.
#[derive(Default)]
pub struct DriverRegistry {
    drivers: BTreeMap<String, TriggerFactory>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in drivers.
    pub fn with_builtins() -> Result<Self, BindError> {
        let mut registry = Self::new();
        register_builtins(&mut registry).inspect_err(|e| {
            error!(error = %e, "Failed to register built-in trigger drivers");
        })?;
        Ok(registry)
    }

    /// Register a driver under `name`.
    pub fn register(&mut self, name: &str, factory: TriggerFactory) -> Result<(), BindError> {
        if self.drivers.contains_key(name) {
            return Err(BindError::DuplicateDriver(name.to_string()));
        }
        self.drivers.insert(name.to_string(), factory);
        debug!(driver = %name, "Trigger driver registered");
        Ok(())
    }

    /// Look up the factory for `name`.
    pub fn resolve(&self, name: &str) -> Result<TriggerFactory, BindError> {
        self.drivers
            .get(name)
            .copied()
            .ok_or_else(|| BindError::UnknownDriver(name.to_string()))
    }

    /// Registered driver names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.drivers.keys().cloned().collect()
    }

    /// Build the trigger chain for one binding.
    ///
    /// Duplicate driver names are dropped, keeping the first occurrence.
    /// Each driver receives its own option table from `options`, or an empty
    /// table when none is configured.
    pub fn build_chain(
        &self,
        word: &str,
        drivers: &[String],
        options: &toml::Table,
    ) -> Result<Vec<Arc<dyn Trigger>>, BindError> {
        let empty = toml::Table::new();
        let mut seen: Vec<&str> = Vec::with_capacity(drivers.len());
        let mut chain = Vec::with_capacity(drivers.len());

        for name in drivers {
            if seen.contains(&name.as_str()) {
                continue;
            }
            seen.push(name);

            let factory = self.resolve(name)?;
            let table = options
                .get(name)
                .and_then(|v| v.as_table())
                .unwrap_or(&empty);
            chain.push(factory(word, table)?);
        }

        Ok(chain)
    }
}

static DRIVERS: OnceLock<RwLock<DriverRegistry>> = OnceLock::new();

/// The process-wide registry, pre-loaded with the built-in drivers.
///
/// Fails if the built-ins cannot be registered; nothing is cached then.
pub fn global() -> Result<&'static RwLock<DriverRegistry>, BindError> {
    if let Some(registry) = DRIVERS.get() {
        return Ok(registry);
    }
    let registry = DriverRegistry::with_builtins()?;
    Ok(DRIVERS.get_or_init(|| RwLock::new(registry)))
}

/// Register a driver in the process-wide registry.
///
/// Call during startup, before any dispatcher is built.
pub fn register_driver(name: &str, factory: TriggerFactory) -> Result<(), BindError> {
    global()?.write().register(name, factory)
}

/// Driver names in the process-wide registry, sorted.
pub fn driver_names() -> Result<Vec<String>, BindError> {
    Ok(global()?.read().names())
}
