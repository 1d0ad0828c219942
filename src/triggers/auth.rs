//! Per-binding token check.
//!
//! Complements the dispatcher-wide token allow-list with a single token
//! scoped to one trigger word.

use super::{Outcome, Trigger, TriggerResult, parse_options};
use crate::error::{BindError, TriggerError};
use crate::protocol::{Request, Response};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;

pub const DRIVER: &str = "gogap-auth";

#[derive(Debug, Default, Deserialize)]
struct AuthOptions {
    #[serde(default)]
    token: String,
}

/// Rejects requests whose token differs from the configured one.
pub struct Auth {
    word: String,
    token: String,
}

impl Auth {
    pub fn new(word: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            token: token.into(),
        }
    }

    pub fn build(word: &str, options: &toml::Table) -> Result<Arc<dyn Trigger>, BindError> {
        let opts: AuthOptions = parse_options(DRIVER, options)?;
        Ok(Arc::new(Self::new(word, opts.token)))
    }
}

#[async_trait]
impl Trigger for Auth {
    async fn handle(&self, req: &Request, _resp: &mut Response) -> TriggerResult {
        if req.trigger_word.trim() != self.word {
            return Err(TriggerError::TriggerWordMismatch);
        }
        if !bool::from(req.token.as_bytes().ct_eq(self.token.as_bytes())) {
            return Err(TriggerError::BadAuthToken);
        }
        Ok(Outcome::Continue)
    }
}
