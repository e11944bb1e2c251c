//! Prometheus metrics for the vault factory.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A registration failure means a
//! duplicate metric name, which is a startup-time programming error. These
//! panics only occur during static initialization, never at runtime.

use crate::error::{TelemetryError, TelemetryResult};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_gauge, CounterVec, Encoder,
    HistogramVec, IntGauge, TextEncoder,
};

/// Terminal operation outcomes.
/// Labels: operation, outcome (confirmed or an error kind label)
pub static OPERATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "vault_operations_total",
        "Total vault operations by terminal outcome",
        &["operation", "outcome"]
    )
    .unwrap()
});

/// Gas profiles replaced with the safe default.
pub static GAS_SUBSTITUTIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "vault_gas_substitutions_total",
        "Gas profiles below the chain floor replaced with the safe default",
        &["operation"]
    )
    .unwrap()
});

/// Time from submission to a terminal chain status, in seconds.
pub static CONFIRMATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "vault_confirmation_seconds",
        "Time from submission to terminal chain status in seconds",
        &["operation"],
        vec![0.5, 1.0, 2.0, 5.0, 10.0, 15.0, 20.0, 30.0, 60.0]
    )
    .unwrap()
});

/// Venue order submissions.
/// Labels: outcome (accepted/failed)
pub static VENUE_SUBMISSIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "vault_venue_submissions_total",
        "Production trade orders submitted to the external venue",
        &["outcome"]
    )
    .unwrap()
});

/// Re-attempts made by the retry wrapper.
pub static RETRY_ATTEMPTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "vault_retry_attempts_total",
        "Operation re-attempts after a retryable failure",
        &["operation", "kind"]
    )
    .unwrap()
});

/// Operations currently holding a wallet session.
pub static SESSION_INFLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "vault_session_inflight",
        "Operations between signature request and confirmation"
    )
    .unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    pub fn operation_finished(operation: &str, outcome: &str) {
        OPERATIONS_TOTAL
            .with_label_values(&[operation, outcome])
            .inc();
    }

    pub fn gas_substituted(operation: &str) {
        GAS_SUBSTITUTIONS_TOTAL
            .with_label_values(&[operation])
            .inc();
    }

    pub fn confirmation_latency(operation: &str, seconds: f64) {
        CONFIRMATION_SECONDS
            .with_label_values(&[operation])
            .observe(seconds);
    }

    pub fn venue_submission(accepted: bool) {
        let outcome = if accepted { "accepted" } else { "failed" };
        VENUE_SUBMISSIONS_TOTAL.with_label_values(&[outcome]).inc();
    }

    pub fn retry_attempt(operation: &str, kind: &str) {
        RETRY_ATTEMPTS_TOTAL
            .with_label_values(&[operation, kind])
            .inc();
    }

    pub fn session_acquired() {
        SESSION_INFLIGHT.inc();
    }

    pub fn session_released() {
        SESSION_INFLIGHT.dec();
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buf)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
