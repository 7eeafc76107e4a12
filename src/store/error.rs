// Dory: Store error types

use thiserror::Error;

use super::Action;

/// Everything that can go wrong talking to the record store. All variants are
/// transport-level from the user's point of view: the current snapshot stays
/// as it was.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Record store answered with HTTP {0}")]
    Status(u16),

    #[error("Malformed record store response: {0}")]
    Decode(String),

    #[error("Record store rejected the {action} request: {reason}")]
    Rejected { action: Action, reason: String },
}
