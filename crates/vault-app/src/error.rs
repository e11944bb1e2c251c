//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Core error: {0}")]
    Core(#[from] vault_core::CoreError),

    #[error("Operation failed: {0}")]
    Operation(#[from] vault_core::OperationError),

    #[error("Trade error: {0}")]
    Trade(#[from] vault_trade::TradeError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] vault_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
