//! Vault factory application layer.
//!
//! Loads [`AppConfig`], wires the transaction, trade and executor crates into
//! an [`Application`], and backs the `vault-cli` binary.

pub mod app;
pub mod config;
pub mod error;

pub use app::{parse_request, Application, DRY_RUN_ACCOUNT};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
