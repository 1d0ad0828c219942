//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::net::SocketAddr;

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// HTTP Defaults
// =============================================================================

pub fn default_http_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

pub fn default_http_path() -> String {
    "/outgoing".to_string()
}

pub fn default_metrics_path() -> String {
    "/metrics".to_string()
}

// =============================================================================
// Trigger Defaults
// =============================================================================

pub fn default_confirm_prompt() -> String {
    "please input number for confirm".to_string()
}

pub fn default_totp_prompt() -> String {
    "please input one time password for confirm".to_string()
}

/// Seconds a random confirmation code stays valid.
pub fn default_confirm_expiry() -> u64 {
    10
}

/// TOTP time step, also the confirmation window, in seconds.
pub fn default_totp_period() -> u64 {
    30
}

/// Seconds a shell command may run before it is killed.
pub fn default_command_timeout() -> u64 {
    30
}
