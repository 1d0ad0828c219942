//! Trigger trait and the built-in trigger drivers.
//!
//! A trigger inspects a [`Request`] and mutates the shared [`Response`].
//! Drivers are factories that build a trigger from the bound trigger word
//! and the driver's option table; they are looked up by name in the
//! [`DriverRegistry`](crate::registry::DriverRegistry).
//!
//! ## Built-in Drivers
//!
//! | name | trigger |
//! |------|---------|
//! | `gogap-auth` | [`auth::Auth`] |
//! | `gogap-greeter` | [`greeter::Greeter`] |
//! | `gogap-user-filter` | [`filter::UserFilter`] |
//! | `gogap-channel-filter` | [`filter::ChannelFilter`] |
//! | `gogap-sensitive-filter` | [`sensitive::Sensitive`] |
//! | `gogap-commands` | [`commands::Commands`] |
//! | `gogap-confirm` | [`confirm::Confirm`] |
//! | `gogap-confirm-totp` | [`confirm::TotpConfirm`] |

pub mod auth;
pub mod commands;
pub mod confirm;
pub mod filter;
pub mod greeter;
pub mod sensitive;

use crate::error::{BindError, TriggerError};
use crate::protocol::{Request, Response};
use crate::registry::DriverRegistry;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// How the chain continues after a trigger returns successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Run the next trigger.
    Continue,
    /// Stop the chain and reply with the response built so far.
    Break,
    /// Stop the chain and acknowledge with an empty body.
    NoContent,
    /// Run the rest of the chain against this request instead.
    Replay(Request),
}

/// Result type for triggers.
pub type TriggerResult = Result<Outcome, TriggerError>;

/// A pluggable handler bound to a command path.
#[async_trait]
pub trait Trigger: Send + Sync {
    /// Handle one request, mutating the shared response.
    async fn handle(&self, req: &Request, resp: &mut Response) -> TriggerResult;
}

/// Builds a trigger from its bound word and its option table.
pub type TriggerFactory = fn(word: &str, options: &toml::Table) -> Result<Arc<dyn Trigger>, BindError>;

/// Deserialize a driver's option table into its typed options.
pub(crate) fn parse_options<T: DeserializeOwned>(
    driver: &str,
    options: &toml::Table,
) -> Result<T, BindError> {
    toml::Value::Table(options.clone())
        .try_into()
        .map_err(|source| BindError::InvalidOptions {
            driver: driver.to_string(),
            source,
        })
}

/// Register every built-in driver.
pub fn register_builtins(registry: &mut DriverRegistry) -> Result<(), BindError> {
    registry.register(auth::DRIVER, auth::Auth::build)?;
    registry.register(greeter::DRIVER, greeter::Greeter::build)?;
    registry.register(filter::USER_DRIVER, filter::UserFilter::build)?;
    registry.register(filter::CHANNEL_DRIVER, filter::ChannelFilter::build)?;
    registry.register(sensitive::DRIVER, sensitive::Sensitive::build)?;
    registry.register(commands::DRIVER, commands::Commands::build)?;
    registry.register(confirm::DRIVER, confirm::Confirm::build)?;
    registry.register(confirm::TOTP_DRIVER, confirm::TotpConfirm::build)?;
    Ok(())
}
