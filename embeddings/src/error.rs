//! Error types for the embeddings system.

use thiserror::Error;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors that can occur in the embeddings system.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Store not configured.
    #[error("embedding store not configured: {0}")]
    NotConfigured(String),

    /// A vector component could not be normalized to a float.
    #[error("malformed vector for '{word}': {reason}")]
    MalformedVector { word: String, reason: String },

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Zero-norm vector; cosine similarity is undefined.
    #[error("degenerate zero-norm vector")]
    DegenerateVector,

    /// Invalid response from the remote store.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Remote store returned an unexpected status.
    #[error("store request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid store URL.
    #[error("invalid store url: {0}")]
    Url(#[from] url::ParseError),
}

impl EmbeddingError {
    /// Whether the error concerns a single entry and the caller may skip it
    /// and keep going.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedVector { .. } | Self::DimensionMismatch { .. } | Self::DegenerateVector
        )
    }
}
