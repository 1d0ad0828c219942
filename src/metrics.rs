//! Prometheus metrics collection for slashgate.
//!
//! - `slashgate_requests_total{trigger_word}` - Requests routed to a chain
//! - `slashgate_request_duration_seconds{trigger_word}` - End-to-end dispatch latency
//! - `slashgate_request_errors_total{code}` - Per-request errors by code
//! - `slashgate_confirmations_total{outcome}` - Confirmation handshake outcomes
//!
//! Recording before [`init`] is a no-op, so library users and tests that
//! never start the HTTP surface pay nothing.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// Requests routed to a trigger chain, by trigger word.
pub static REQUESTS: OnceLock<IntCounterVec> = OnceLock::new();

/// Dispatch latency by trigger word.
pub static REQUEST_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Per-request errors by error code.
pub static REQUEST_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Confirmation outcomes (issued, accepted, rejected, expired).
pub static CONFIRMATIONS: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Call once at startup before serving the metrics endpoint.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(REQUESTS, IntCounterVec::new(Opts::new("slashgate_requests_total", "Requests routed by trigger word"), &["trigger_word"]));
    register!(REQUEST_LATENCY, HistogramVec::new(
        HistogramOpts::new("slashgate_request_duration_seconds", "Dispatch latency by trigger word")
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]),
        &["trigger_word"]));
    register!(REQUEST_ERRORS, IntCounterVec::new(Opts::new("slashgate_request_errors_total", "Request errors by code"), &["code"]));
    register!(CONFIRMATIONS, IntCounterVec::new(Opts::new("slashgate_confirmations_total", "Confirmation handshake outcomes"), &["outcome"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

/// Record a request routed to a chain.
#[inline]
pub fn record_request(trigger_word: &str) {
    if let Some(c) = REQUESTS.get() {
        c.with_label_values(&[trigger_word]).inc();
    }
}

/// Record dispatch latency.
#[inline]
pub fn record_latency(trigger_word: &str, duration_secs: f64) {
    if let Some(h) = REQUEST_LATENCY.get() {
        h.with_label_values(&[trigger_word]).observe(duration_secs);
    }
}

/// Record a per-request error.
#[inline]
pub fn record_error(code: &str) {
    if let Some(c) = REQUEST_ERRORS.get() {
        c.with_label_values(&[code]).inc();
    }
}

/// Record a confirmation outcome.
#[inline]
pub fn record_confirmation(outcome: &str) {
    if let Some(c) = CONFIRMATIONS.get() {
        c.with_label_values(&[outcome]).inc();
    }
}
