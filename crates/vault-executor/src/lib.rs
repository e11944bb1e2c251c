//! Operation orchestration for the vault factory.
//!
//! # Key Components
//!
//! - [`Orchestrator`]: validate -> build -> (venue) -> sign -> confirm
//! - [`WalletSession`]: serializes chain-submitting operations per wallet
//! - [`Wallet`], [`ChainClient`]: injected boundaries, with recording mocks
//! - [`RetryPolicy`]: optional bounded retry for transient failures
//!
//! # State machine (in `Orchestrator::execute`)
//!
//! 1. Validating -> ValidationError, wallet never reached
//! 2. Building -> MalformedArguments, internal defect
//! 3. ExternalSubmit (production trades) -> venue failure, no on-chain call
//! 4. AwaitingSignature -> UserRejected / classified wallet failure
//! 5. AwaitingConfirmation -> Confirmed, Failed (classified) or Expired

pub mod chain;
pub mod error;
pub mod orchestrator;
pub mod retry;
pub mod wallet;

pub use vault_trade::BoxFuture;

pub use chain::{ChainClient, DynChainClient, MockChain, TxStatus};
pub use error::{ChainError, ChainResult, WalletError, WalletResult};
pub use orchestrator::{OperationState, Orchestrator, OrchestratorConfig};
pub use retry::RetryPolicy;
pub use wallet::{
    ConnectionState, DynWallet, MockWallet, SessionGuard, SubmittedTx, Wallet, WalletSession,
};
