//! Transaction builder error types.

use thiserror::Error;
use vault_core::{OperationError, OperationKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TxError {
    /// Arguments do not match the entry function's fixed shape.
    #[error("Malformed arguments for {operation}: {detail}")]
    MalformedArguments {
        operation: OperationKind,
        detail: String,
    },
}

pub type TxResult<T> = Result<T, TxError>;

impl From<TxError> for OperationError {
    fn from(e: TxError) -> Self {
        OperationError::malformed(e.to_string())
    }
}
