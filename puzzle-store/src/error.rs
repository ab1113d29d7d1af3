//! Error types for the puzzle store.

use thiserror::Error;

/// Result type alias for puzzle store operations.
pub type Result<T> = std::result::Result<T, PuzzleStoreError>;

/// Errors that can occur in the puzzle store.
#[derive(Error, Debug)]
pub enum PuzzleStoreError {
    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The draft violates a record invariant.
    #[error("invalid puzzle draft: {0}")]
    InvalidDraft(String),

    /// Another writer published the index this commit claimed.
    #[error("puzzle index {index} was claimed by another writer")]
    IndexConflict { index: u64 },

    /// A published artifact could not be read back.
    #[error("corrupt puzzle artifact: {0}")]
    Corrupt(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to create storage directory.
    #[error("failed to create directory: {0}")]
    CreateDirectory(String),

    /// Failed to read an artifact.
    #[error("failed to read file: {0}")]
    ReadFile(String),

    /// Failed to write an artifact.
    #[error("failed to write file: {0}")]
    WriteFile(String),

    /// Failed to acquire the commit lock.
    #[error("failed to lock store: {0}")]
    Lock(String),

    /// Failed to publish a staged record.
    #[error("failed to publish record: {0}")]
    Publish(String),
}
