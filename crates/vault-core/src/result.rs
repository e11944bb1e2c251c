//! Structured outcome of one orchestrator invocation.

use crate::error::{ErrorKind, OperationError};
use crate::operation::OperationKind;
use crate::order::TradePayload;
use serde::Serialize;
use std::fmt;

/// Terminal status of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Handed to the chain, final status unknown (confirmation window elapsed).
    Submitted,
    Confirmed,
    Failed,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted => write!(f, "submitted"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Result returned to the UI for the current interaction only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionResult {
    pub operation: OperationKind,
    pub status: TransactionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
    /// Venue payload generated for `execute_trade`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade: Option<TradePayload>,
    /// True if the gas profile was replaced with the safe default.
    pub gas_substituted: bool,
}

impl TransactionResult {
    pub fn confirmed(operation: OperationKind, hash: String) -> Self {
        Self {
            operation,
            status: TransactionStatus::Confirmed,
            transaction_hash: Some(hash),
            error: None,
            trade: None,
            gas_substituted: false,
        }
    }

    pub fn failed(operation: OperationKind, error: OperationError) -> Self {
        Self {
            operation,
            status: TransactionStatus::Failed,
            transaction_hash: None,
            error: Some(error),
            trade: None,
            gas_substituted: false,
        }
    }

    /// Failure after the transaction was committed (e.g. a Move abort).
    pub fn failed_on_chain(operation: OperationKind, hash: String, error: OperationError) -> Self {
        Self {
            transaction_hash: Some(hash),
            ..Self::failed(operation, error)
        }
    }

    /// Confirmation window elapsed. The caller must re-check `hash`.
    pub fn expired(operation: OperationKind, hash: String, error: OperationError) -> Self {
        Self {
            operation,
            status: TransactionStatus::Submitted,
            transaction_hash: Some(hash),
            error: Some(error),
            trade: None,
            gas_substituted: false,
        }
    }

    #[must_use]
    pub fn with_trade(mut self, trade: Option<TradePayload>) -> Self {
        self.trade = trade;
        self
    }

    #[must_use]
    pub fn with_gas_substituted(mut self, substituted: bool) -> Self {
        self.gas_substituted = substituted;
        self
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == TransactionStatus::Confirmed
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }

    /// Outcome label for logs and metrics.
    pub fn outcome_label(&self) -> &'static str {
        match (&self.status, &self.error) {
            (TransactionStatus::Confirmed, _) => "confirmed",
            (_, Some(err)) => err.kind.label(),
            (TransactionStatus::Submitted, None) => "submitted",
            (TransactionStatus::Failed, None) => "failed",
        }
    }
}
