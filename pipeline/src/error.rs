//! Error types for the daily pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can end a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Vocabulary or target selection error.
    #[error("lexicon error: {0}")]
    Lexicon(#[from] simword_lexicon::LexiconError),

    /// Embedding store or ranking error.
    #[error("embedding error: {0}")]
    Embedding(#[from] simword_embeddings::EmbeddingError),

    /// Puzzle store error.
    #[error("puzzle store error: {0}")]
    PuzzleStore(#[from] simword_puzzle_store::PuzzleStoreError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The ranking is too short to publish.
    #[error("ranking for '{target}' has {len} entries, at least {min} required")]
    RankingTooShort {
        target: String,
        len: usize,
        min: usize,
    },

    /// A blocking task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
