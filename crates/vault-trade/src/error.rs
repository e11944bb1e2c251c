//! Trade error types.

use thiserror::Error;
use vault_core::{truncate_message, ErrorKind, OperationError};

#[derive(Debug, Error)]
pub enum TradeError {
    #[error("Venue credential is not configured")]
    ConfigurationMissing,

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Venue credential is empty")]
    EmptyCredential,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Venue rejected order: HTTP {status}: {body}")]
    VenueRejected { status: u16, body: String },

    #[error("Invalid trade payload: {0}")]
    InvalidPayload(String),
}

pub type TradeResult<T> = Result<T, TradeError>;

/// Response bodies and transport errors can be arbitrarily long; the
/// message is bounded. Callers log the full error.
impl From<TradeError> for OperationError {
    fn from(e: TradeError) -> Self {
        let kind = match &e {
            TradeError::ConfigurationMissing
            | TradeError::EnvVarNotFound(_)
            | TradeError::EmptyCredential
            | TradeError::Io(_) => ErrorKind::ConfigurationMissing,
            TradeError::HttpClient(_) => ErrorKind::NetworkFault,
            TradeError::VenueRejected { .. } => ErrorKind::Unknown,
            TradeError::InvalidPayload(_) => ErrorKind::MalformedArguments,
        };
        OperationError::new(kind, truncate_message(&e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_maps_to_configuration_missing() {
        let err: OperationError = TradeError::ConfigurationMissing.into();
        assert_eq!(err.kind, ErrorKind::ConfigurationMissing);
        assert_eq!(err.message, "Venue credential is not configured");
    }

    #[test]
    fn test_transport_failure_maps_to_network_fault() {
        let err: OperationError = TradeError::HttpClient("connection reset".to_string()).into();
        assert_eq!(err.kind, ErrorKind::NetworkFault);
    }

    #[test]
    fn test_venue_rejection_message_is_bounded() {
        let body = format!("<html><body>{}</body></html>", "x".repeat(5000));
        let err: OperationError = TradeError::VenueRejected { status: 502, body }.into();
        assert_eq!(err.kind, ErrorKind::Unknown);
        assert_eq!(err.message.chars().count(), vault_core::MAX_MESSAGE_CHARS);
        assert!(err.message.starts_with("Venue rejected order: HTTP 502"));
        assert!(err.message.ends_with("..."));

        let err: OperationError = TradeError::HttpClient("e".repeat(3000)).into();
        assert!(err.message.chars().count() <= vault_core::MAX_MESSAGE_CHARS);
    }
}
