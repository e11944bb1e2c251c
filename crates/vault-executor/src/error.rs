//! Wallet and chain boundary errors.
//!
//! Both carry raw text from the other side of the boundary. The orchestrator
//! hands that text to the error classifier; nothing here interprets it.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Wallet is not connected")]
    NotConnected,

    /// Failure reported by the wallet, verbatim.
    #[error("{0}")]
    Failed(String),
}

pub type WalletResult<T> = Result<T, WalletError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Chain query failed: {0}")]
pub struct ChainError(pub String);

pub type ChainResult<T> = Result<T, ChainError>;
