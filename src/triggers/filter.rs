//! User and channel allow-lists.

use super::{Outcome, Trigger, TriggerResult, parse_options};
use crate::error::{BindError, TriggerError};
use crate::protocol::{Request, Response};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

pub const USER_DRIVER: &str = "gogap-user-filter";
pub const CHANNEL_DRIVER: &str = "gogap-channel-filter";

#[derive(Debug, Default, Deserialize)]
struct UserFilterOptions {
    #[serde(default)]
    users: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChannelFilterOptions {
    #[serde(default)]
    channels: Vec<String>,
}

/// Only lets listed users through. An empty list denies everyone.
pub struct UserFilter {
    users: HashSet<String>,
}

impl UserFilter {
    pub fn new<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            users: users.into_iter().map(Into::into).collect(),
        }
    }

    pub fn build(_word: &str, options: &toml::Table) -> Result<Arc<dyn Trigger>, BindError> {
        let opts: UserFilterOptions = parse_options(USER_DRIVER, options)?;
        Ok(Arc::new(Self::new(opts.users)))
    }
}

#[async_trait]
impl Trigger for UserFilter {
    async fn handle(&self, req: &Request, _resp: &mut Response) -> TriggerResult {
        if !self.users.contains(&req.user_name) {
            debug!(user = %req.user_name, "User not in allow-list");
            return Err(TriggerError::PermissionDenied(req.user_name.clone()));
        }
        Ok(Outcome::Continue)
    }
}

/// Only lets listed channels through. An empty list denies every channel.
pub struct ChannelFilter {
    channels: HashSet<String>,
}

impl ChannelFilter {
    pub fn new<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            channels: channels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn build(_word: &str, options: &toml::Table) -> Result<Arc<dyn Trigger>, BindError> {
        let opts: ChannelFilterOptions = parse_options(CHANNEL_DRIVER, options)?;
        Ok(Arc::new(Self::new(opts.channels)))
    }
}

#[async_trait]
impl Trigger for ChannelFilter {
    async fn handle(&self, req: &Request, _resp: &mut Response) -> TriggerResult {
        if !self.channels.contains(&req.channel_name) {
            debug!(channel = %req.channel_name, "Channel not in allow-list");
            return Err(TriggerError::IllegalChannel(req.channel_name.clone()));
        }
        Ok(Outcome::Continue)
    }
}
