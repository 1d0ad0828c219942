//! Step-up confirmation before a sensitive trigger runs.
//!
//! A confirmation trigger sits in front of the triggers it guards. The first
//! message from a user issues a challenge and stops the chain; the user's
//! next message is checked against it exactly once.
//!
//! ## States
//!
//! - **Idle**: no pending record for the user. The message issues a
//!   challenge, stores `{issued_at, expected, original request}` and returns
//!   [`Outcome::Break`] so the prompt is the whole reply.
//! - **Pending**: the record is removed on the user's next message,
//!   whatever happens next:
//!   - past its window: treated as Idle, a fresh challenge is issued;
//!   - argument not a single positive integer: `InvalidInputFormat`;
//!   - wrong code: the variant's mismatch error;
//!   - right code: [`Outcome::Replay`] with the original request, so the
//!     rest of the chain runs as if the challenge never happened.
//!
//! Records are keyed by user name; a pending challenge for one user is never
//! consulted by another user's message. Issuing any challenge also drops
//! every record past its window, so abandoned challenges do not pile up.
//!
//! Two variants share this machinery through [`Challenge`]:
//! [`RandomCode`] (driver `gogap-confirm`) and [`TotpCode`]
//! (driver `gogap-confirm-totp`).

mod totp;

pub use totp::{TOTP_DRIVER, TotpCode, TotpConfirm, totp_code, verify_totp};

use super::{Outcome, Trigger, TriggerResult, parse_options};
use crate::config::defaults::{default_confirm_expiry, default_confirm_prompt};
use crate::error::{BindError, TriggerError};
use crate::protocol::{Request, Response};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use rand::Rng;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const DRIVER: &str = "gogap-confirm";

/// Largest random confirmation code.
pub const MAX_CODE: u32 = 99_998;

/// A challenge variant: how a code is issued and how a reply is checked.
pub trait Challenge: Send + Sync {
    /// What the pending record remembers about the issued challenge.
    type Expected: Send + Sync;

    /// Issue a challenge for `req`, writing the prompt into `resp`.
    fn issue(&self, req: &Request, resp: &mut Response) -> Result<Self::Expected, TriggerError>;

    /// Check `code` from `user` against the pending challenge.
    fn verify(&self, user: &str, expected: &Self::Expected, code: u32, now: DateTime<Utc>) -> bool;

    /// Error returned when [`Challenge::verify`] fails.
    fn mismatch(&self) -> TriggerError;
}

/// One user's outstanding challenge.
#[derive(Debug, Clone)]
pub struct Pending<E> {
    pub issued_at: DateTime<Utc>,
    pub expected: E,
    pub original: Request,
}

impl<E> Pending<E> {
    /// Whether the challenge is past its window at `now`.
    pub fn is_expired(&self, window: Duration, now: DateTime<Utc>) -> bool {
        match TimeDelta::from_std(window) {
            Ok(window) => now.signed_duration_since(self.issued_at) > window,
            Err(_) => false,
        }
    }
}

/// What to do with an incoming message, given the user's pending record.
#[derive(Debug)]
pub enum Transition<E> {
    /// Idle, or the record expired: issue a fresh challenge.
    Issue,
    /// Check the message against this record.
    Verify(Pending<E>),
}

/// Decide the transition for a record already taken from the store.
pub fn transition<E>(pending: Option<Pending<E>>, window: Duration, now: DateTime<Utc>) -> Transition<E> {
    match pending {
        Some(p) if !p.is_expired(window, now) => Transition::Verify(p),
        _ => Transition::Issue,
    }
}

/// Parse the sole argument of a confirmation reply as a positive integer.
pub fn parse_code(args: &[&str]) -> Result<u32, TriggerError> {
    match args {
        [code] => code
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or(TriggerError::InvalidInputFormat),
        _ => Err(TriggerError::InvalidInputFormat),
    }
}

/// The confirmation state machine, generic over the challenge variant.
pub struct ConfirmGate<C: Challenge> {
    challenge: C,
    window: Duration,
    pending: DashMap<String, Pending<C::Expected>>,
}

impl<C: Challenge> ConfirmGate<C> {
    pub fn new(challenge: C, window: Duration) -> Self {
        Self {
            challenge,
            window,
            pending: DashMap::new(),
        }
    }

    /// Whether `user` has an outstanding challenge.
    pub fn is_pending(&self, user: &str) -> bool {
        self.pending.contains_key(user)
    }

    /// Drop every record past its window at `now`. Returns how many were removed.
    pub fn prune_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, p| !p.is_expired(self.window, now));
        before.saturating_sub(self.pending.len())
    }

    /// Run the state machine for `req` at time `now`.
    pub fn handle_at(&self, req: &Request, resp: &mut Response, now: DateTime<Utc>) -> TriggerResult {
        let user = req.user_name.as_str();
        // Removing up front makes every pending record single-use.
        let taken = self.pending.remove(user).map(|(_, p)| p);
        let was_pending = taken.is_some();

        match transition(taken, self.window, now) {
            Transition::Verify(pending) => self.verify(req, pending, now),
            Transition::Issue => {
                if was_pending {
                    debug!(user = %user, "Confirmation expired, issuing a new challenge");
                    crate::metrics::record_confirmation("expired");
                }
                self.issue(req, resp, now)
            }
        }
    }

    fn issue(&self, req: &Request, resp: &mut Response, now: DateTime<Utc>) -> TriggerResult {
        let removed = self.prune_expired(now);
        if removed > 0 {
            debug!(removed, "Expired confirmations pruned");
        }

        let expected = self.challenge.issue(req, resp)?;
        self.pending.insert(
            req.user_name.clone(),
            Pending {
                issued_at: now,
                expected,
                original: req.clone(),
            },
        );
        info!(user = %req.user_name, word = %req.trigger_word, "Confirmation challenge issued");
        crate::metrics::record_confirmation("issued");
        Ok(Outcome::Break)
    }

    fn verify(&self, req: &Request, pending: Pending<C::Expected>, now: DateTime<Utc>) -> TriggerResult {
        let code = parse_code(&req.args()).inspect_err(|_| {
            debug!(user = %req.user_name, "Confirmation reply is not a code");
            crate::metrics::record_confirmation("rejected");
        })?;

        if !self.challenge.verify(&req.user_name, &pending.expected, code, now) {
            debug!(user = %req.user_name, "Confirmation code mismatch");
            crate::metrics::record_confirmation("rejected");
            return Err(self.challenge.mismatch());
        }

        info!(user = %req.user_name, "Confirmation accepted");
        crate::metrics::record_confirmation("accepted");
        Ok(Outcome::Replay(pending.original))
    }
}

#[async_trait]
impl<C: Challenge> Trigger for ConfirmGate<C> {
    async fn handle(&self, req: &Request, resp: &mut Response) -> TriggerResult {
        self.handle_at(req, resp, Utc::now())
    }
}

// ============================================================================
// Random code variant
// ============================================================================

#[derive(Debug, Deserialize)]
struct ConfirmOptions {
    #[serde(default = "default_confirm_prompt")]
    prompt: String,
    #[serde(default = "default_confirm_expiry")]
    expiry: u64,
}

/// Challenge with a random number the user echoes back.
pub struct RandomCode {
    prompt: String,
}

impl RandomCode {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl Challenge for RandomCode {
    type Expected = u32;

    fn issue(&self, _req: &Request, resp: &mut Response) -> Result<u32, TriggerError> {
        let code = rand::thread_rng().gen_range(1..=MAX_CODE);
        resp.text = format!("{}: {}", self.prompt, code);
        Ok(code)
    }

    fn verify(&self, _user: &str, expected: &u32, code: u32, _now: DateTime<Utc>) -> bool {
        *expected == code
    }

    fn mismatch(&self) -> TriggerError {
        TriggerError::ConfirmMismatch
    }
}

/// Random-code confirmation trigger.
pub type Confirm = ConfirmGate<RandomCode>;

impl ConfirmGate<RandomCode> {
    pub fn build(_word: &str, options: &toml::Table) -> Result<Arc<dyn Trigger>, BindError> {
        let opts: ConfirmOptions = parse_options(DRIVER, options)?;
        Ok(Arc::new(Self::new(
            RandomCode::new(opts.prompt),
            Duration::from_secs(opts.expiry),
        )))
    }
}
