// Dory: Top-level error types
//
// Aggregates the per-module errors into a single enum for the application
// boundary.

use thiserror::Error;

/// Top-level error type for all Dory operations.
#[derive(Debug, Error)]
pub enum DoryError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Gate error: {0}")]
    Gate(#[from] crate::gate::GateError),

    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("{0}")]
    Vault(#[from] crate::vault::VaultError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DoryError>;
