//! Transaction construction for the vault factory.
//!
//! Everything in this crate is a pure function of explicit inputs:
//! - [`GasPolicy`]: {operation, network} -> execution limits, with flagged
//!   fallback to a safe default when a configured profile is invalid
//! - [`FunctionRegistry`]: operation -> module-qualified entry function and
//!   parameter shape
//! - [`TransactionBuilder`]: operation + arguments -> [`vault_core::ContractCall`]
//! - [`ErrorClassifier`]: raw wallet/chain failure text -> stable error kind
//!
//! The tables are built once at startup and shared by reference.

pub mod builder;
pub mod classify;
pub mod error;
pub mod gas;
pub mod registry;

pub use builder::{BuiltCall, TransactionBuilder};
pub use classify::{ErrorClassifier, MAX_MESSAGE_CHARS};
pub use error::{TxError, TxResult};
pub use gas::{GasOverride, GasPolicy, GasSubstitution, GasTier, ResolvedGas};
pub use registry::{EntryFunction, FunctionRegistry};
