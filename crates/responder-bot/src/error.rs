//! Application error types.

use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Signal error: {0}")]
    Signal(#[from] signal_client::SignalError),

    #[error("Rules error: {0}")]
    Rules(#[from] command_table::RulesError),

    #[error("Macro registry error: {0}")]
    Registry(#[from] response_macros::RegistryError),
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;
