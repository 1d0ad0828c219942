//! Telemetry utilities for dispatch timing and tracing spans.

use std::time::Instant;

/// Guard for timing one dispatch and recording its latency.
///
/// Records when dropped.
pub struct DispatchTimer {
    trigger_word: String,
    start: Instant,
}

impl DispatchTimer {
    /// Start timing a dispatch.
    pub fn new(trigger_word: impl Into<String>) -> Self {
        Self {
            trigger_word: trigger_word.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for DispatchTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_latency(&self.trigger_word, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Level, Span, span};

    /// Span for one dispatched request.
    pub fn dispatch(trigger_word: &str, user: &str, channel: &str) -> Span {
        span!(
            Level::DEBUG,
            "dispatch",
            trigger_word = %trigger_word,
            user = %user,
            channel = %channel,
        )
    }

    /// Span for one HTTP delivery.
    pub fn delivery(method: &str, path: &str) -> Span {
        span!(Level::DEBUG, "delivery", method = %method, path = %path)
    }
}
