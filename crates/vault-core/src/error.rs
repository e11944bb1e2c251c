//! Error types for vault-core.
//!
//! Two layers live here:
//! - [`CoreError`]: parse failures of the value types themselves.
//! - [`ErrorKind`] / [`OperationError`]: the stable taxonomy every terminal
//!   failure of an operation is reported in.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Core error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Unknown trade mode: {0}")]
    UnknownTradeMode(String),

    #[error("Unknown order side: {0}")]
    UnknownSide(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

// ============================================================================
// ContractStatus
// ============================================================================

/// Abort codes raised by the `VaultFactory` Move module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    VaultNotFound,
    InsufficientBalance,
    NotAuthorized,
    InvalidAmount,
    VaultPaused,
    NotSubscriber,
    AlreadySubscriber,
    VaultAlreadyExists,
}

impl ContractStatus {
    /// Every status in ascending code order.
    pub const ALL: [ContractStatus; 8] = [
        Self::VaultNotFound,
        Self::InsufficientBalance,
        Self::NotAuthorized,
        Self::InvalidAmount,
        Self::VaultPaused,
        Self::NotSubscriber,
        Self::AlreadySubscriber,
        Self::VaultAlreadyExists,
    ];

    /// Numeric abort code as emitted by the contract.
    pub fn code(&self) -> u64 {
        match self {
            Self::VaultNotFound => 1001,
            Self::InsufficientBalance => 1002,
            Self::NotAuthorized => 1003,
            Self::InvalidAmount => 1004,
            Self::VaultPaused => 1005,
            Self::NotSubscriber => 1006,
            Self::AlreadySubscriber => 1007,
            Self::VaultAlreadyExists => 1008,
        }
    }

    /// User-facing reason.
    pub fn message(&self) -> &'static str {
        match self {
            Self::VaultNotFound => "Vault not found",
            Self::InsufficientBalance => "Insufficient balance",
            Self::NotAuthorized => "Not authorized to perform this action",
            Self::InvalidAmount => "Invalid amount (must be greater than 0)",
            Self::VaultPaused => "Vault is currently paused",
            Self::NotSubscriber => "User is not a subscriber of this vault",
            Self::AlreadySubscriber => "User is already a subscriber of this vault",
            Self::VaultAlreadyExists => "Vault already exists for this address",
        }
    }

    /// Look up a status by its abort code.
    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

// ============================================================================
// ErrorKind
// ============================================================================

/// Closed taxonomy of operation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller input rejected before any chain interaction.
    ValidationError,
    /// Transaction builder received arguments that do not fit the entry
    /// function. Always a bug in this codebase.
    MalformedArguments,
    /// A required external credential is absent.
    ConfigurationMissing,
    /// User declined the signature request in the wallet.
    UserRejected,
    /// User cancelled before the wallet was asked to sign.
    UserCancelled,
    InsufficientFunds,
    GasMisconfigured,
    StaleSequence,
    /// Confirmation window elapsed; the transaction may still land.
    Expired,
    /// The contract aborted with a known status code.
    ContractRejected(ContractStatus),
    NetworkFault,
    Unknown,
}

impl ErrorKind {
    /// True for kinds that reflect a deliberate user decision.
    pub fn is_user_intent(&self) -> bool {
        matches!(self, Self::UserRejected | Self::UserCancelled)
    }

    /// True for kinds the optional retry wrapper may re-attempt.
    ///
    /// Everything else is either deterministic (resubmitting gives the same
    /// answer) or user intent.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkFault | Self::StaleSequence | Self::Unknown)
    }

    /// Stable snake_case label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ValidationError => "validation_error",
            Self::MalformedArguments => "malformed_arguments",
            Self::ConfigurationMissing => "configuration_missing",
            Self::UserRejected => "user_rejected",
            Self::UserCancelled => "user_cancelled",
            Self::InsufficientFunds => "insufficient_funds",
            Self::GasMisconfigured => "gas_misconfigured",
            Self::StaleSequence => "stale_sequence",
            Self::Expired => "expired",
            Self::ContractRejected(_) => "contract_rejected",
            Self::NetworkFault => "network_fault",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContractRejected(status) => write!(f, "contract_rejected[{}]", status.code()),
            other => write!(f, "{}", other.label()),
        }
    }
}

// ============================================================================
// OperationError
// ============================================================================

/// Upper bound on a free-form operation error message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 100;

/// Bound `text` to [`MAX_MESSAGE_CHARS`], ending in `...` when cut.
pub fn truncate_message(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_MESSAGE_CHARS - 3).collect();
    out.push_str("...");
    out
}

/// A classified, user-presentable failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct OperationError {
    pub kind: ErrorKind,
    pub message: String,
}

impl OperationError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, reason)
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedArguments, detail)
    }

    pub fn configuration_missing(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigurationMissing, what)
    }

    pub fn user_cancelled() -> Self {
        Self::new(ErrorKind::UserCancelled, "Operation cancelled by user")
    }

    pub fn contract(status: ContractStatus) -> Self {
        Self::new(ErrorKind::ContractRejected(status), status.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_status_codes_are_distinct() {
        let mut codes: Vec<u64> = ContractStatus::ALL.iter().map(|s| s.code()).collect();
        codes.dedup();
        assert_eq!(codes.len(), ContractStatus::ALL.len());
    }

    #[test]
    fn test_contract_status_from_code() {
        assert_eq!(
            ContractStatus::from_code(1008),
            Some(ContractStatus::VaultAlreadyExists)
        );
        assert_eq!(ContractStatus::from_code(999), None);
    }

    #[test]
    fn test_user_intent_never_retryable() {
        assert!(!ErrorKind::UserRejected.is_retryable());
        assert!(!ErrorKind::UserCancelled.is_retryable());
        assert!(ErrorKind::UserRejected.is_user_intent());
        assert!(ErrorKind::NetworkFault.is_retryable());
    }

    #[test]
    fn test_truncate_message() {
        assert_eq!(truncate_message("short"), "short");
        let cut = truncate_message(&"é".repeat(150));
        assert_eq!(cut.chars().count(), MAX_MESSAGE_CHARS);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_operation_error_display_is_message() {
        let err = OperationError::contract(ContractStatus::VaultPaused);
        assert_eq!(err.to_string(), "Vault is currently paused");
        assert_eq!(
            err.kind,
            ErrorKind::ContractRejected(ContractStatus::VaultPaused)
        );
    }
}
