//! Unified error handling for slashgate.
//!
//! Three layers, matching when they can happen:
//! - [`BindError`]: configuration problems found while binding drivers to
//!   command paths. Fatal at startup.
//! - [`DispatchError`]: per-request validation and routing failures, plus
//!   wrapped [`TriggerError`]s. Rendered to the user by the error handler.
//! - [`TriggerError`]: failures raised by a trigger while it runs.
//!
//! Control signals (break, no-content) are not errors; see
//! [`crate::triggers::Outcome`].

use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Bind Errors (startup)
// ============================================================================

/// Configuration errors raised while building the dispatcher.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("trigger driver already registered: {0}")]
    DuplicateDriver(String),

    #[error("unknown trigger driver: {0}")]
    UnknownDriver(String),

    #[error("command already has triggers: {word} {path}")]
    DuplicateBinding { word: String, path: String },

    #[error("command node already has a child named {0}")]
    DuplicateChild(String),

    #[error("trigger word could not be empty")]
    EmptyWord,

    #[error("no drivers bound for {0}")]
    NoDrivers(String),

    #[error("invalid options for driver {driver}: {source}")]
    InvalidOptions {
        driver: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid expression {expression:?}: {source}")]
    InvalidExpression {
        expression: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid one time password secret for user {0}")]
    InvalidSecret(String),
}

// ============================================================================
// Trigger Errors (chain execution)
// ============================================================================

/// Errors raised by a trigger while handling a request.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("please input number")]
    InvalidInputFormat,

    #[error("bad confirm number")]
    ConfirmMismatch,

    #[error("bad one time password")]
    BadOneTimePassword,

    #[error("user totp secret not exist: {0}")]
    UserSecretNotConfigured(String),

    #[error("error auth token")]
    BadAuthToken,

    #[error("bad request trigger word")]
    TriggerWordMismatch,

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("illegal channel: {0}")]
    IllegalChannel(String),

    #[error("command argument is too less")]
    MissingCommand,

    #[error("command not exist: {0}")]
    UnknownCommand(String),

    #[error("execute timeout after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    CommandFailed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl TriggerError {
    /// Static error code for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInputFormat => "invalid_input_format",
            Self::ConfirmMismatch => "confirm_mismatch",
            Self::BadOneTimePassword => "bad_one_time_password",
            Self::UserSecretNotConfigured(_) => "user_secret_not_configured",
            Self::BadAuthToken => "trigger_bad_auth_token",
            Self::TriggerWordMismatch => "trigger_word_mismatch",
            Self::PermissionDenied(_) => "permission_denied",
            Self::IllegalChannel(_) => "illegal_channel",
            Self::MissingCommand => "missing_command",
            Self::UnknownCommand(_) => "unknown_command",
            Self::Timeout(_) => "timeout",
            Self::CommandFailed(_) => "command_failed",
            Self::Io(_) => "io_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

// ============================================================================
// Dispatch Errors (per request)
// ============================================================================

/// Errors that can occur while routing one request.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("empty trigger word")]
    EmptyTriggerWord,

    #[error("bad auth token")]
    BadAuthToken,

    #[error("trigger of {0} not exist!")]
    UnknownTrigger(String),

    #[error("unknown sub-command: {0}")]
    UnknownSubCommand(String),

    #[error("unfinished sub-command: {0}")]
    IncompleteSubCommand(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Trigger(#[from] TriggerError),
}

impl DispatchError {
    /// Static error code for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyTriggerWord => "empty_trigger_word",
            Self::BadAuthToken => "bad_auth_token",
            Self::UnknownTrigger(_) => "unknown_trigger",
            Self::UnknownSubCommand(_) => "unknown_sub_command",
            Self::IncompleteSubCommand(_) => "incomplete_sub_command",
            Self::MalformedPayload(_) => "malformed_payload",
            Self::Trigger(e) => e.error_code(),
        }
    }
}

// ============================================================================
// Incoming Webhook Errors
// ============================================================================

/// Errors from posting to a remote incoming webhook.
#[derive(Debug, Error)]
pub enum IncomingError {
    #[error("url is empty")]
    EmptyUrl,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("code: {code}, {error}")]
    Remote { code: i64, error: String },
}
