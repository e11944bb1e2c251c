//! Prometheus metrics and structured logging for the vault factory.
//!
//! - Structured logging with tracing (JSON in production, pretty otherwise)
//! - Prometheus counters for operation outcomes, gas substitutions, venue
//!   submissions and retries
//! - Confirmation latency histogram

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
