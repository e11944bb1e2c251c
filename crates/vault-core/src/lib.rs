//! Core domain types for the vault factory transaction layer.
//!
//! This crate provides the value types shared by every other crate:
//! - `Address`: Canonical `0x`-prefixed account identifier
//! - `Amount`: Precision-safe positive decimal amounts
//! - `OperationKind`, `OperationRequest`: The ten vault entry points
//! - `GasProfile`, `ContractCall`: Fully specified entry function calls
//! - `TradePayload`: Venue-facing order payload (demo or production)
//! - `TransactionResult`, `ErrorKind`: Structured outcome of one invocation
//!
//! The [`validate`] module holds the pure input predicates that run before
//! anything touches a wallet or the chain.

pub mod address;
pub mod amount;
pub mod call;
pub mod error;
pub mod operation;
pub mod order;
pub mod result;
pub mod validate;

pub use address::Address;
pub use amount::Amount;
pub use call::{ArgKind, CallArg, ContractCall, GasProfile};
pub use error::{
    truncate_message, ContractStatus, CoreError, ErrorKind, OperationError, Result,
    MAX_MESSAGE_CHARS,
};
pub use operation::{Network, OperationKind, OperationRequest, TradeMode};
pub use order::{OrderSide, TradePayload};
pub use result::{TransactionResult, TransactionStatus};
pub use validate::ValidationFailure;
