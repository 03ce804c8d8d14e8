//! Error types for execution state and checkpoint operations

use thiserror::Error;

/// Result type for checkpoint operations
pub type Result<T> = std::result::Result<T, CheckpointError>;

/// Errors that can occur while tracking execution state or persisting checkpoints.
///
/// Checkpoint write failures are surfaced to the caller immediately; pruning failures are not
/// (see [`crate::manager::CheckpointManager::create_checkpoint`]) and are only ever logged.
#[derive(Error, Debug)]
pub enum CheckpointError {
    /// No checkpoint matched the requested ID or execution.
    #[error("checkpoint not found: {0}")]
    NotFound(String),

    /// No persisted execution state matched the requested execution ID.
    #[error("execution state not found: {0}")]
    StateNotFound(String),

    /// A checkpoint failed `validate_checkpoint` (nil state, empty IDs, or zero operations).
    #[error("invalid checkpoint: {0}")]
    Invalid(String),

    /// JSON (de)serialization of state or checkpoint payloads failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A filesystem operation against the state or checkpoint directory failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An operation status transition was attempted that the state machine rejects, e.g.
    /// updating an operation ID the execution never registered.
    #[error("invalid state transition: {0}")]
    InvalidTransition(String),
}
