//! Error types for the lexicon.

use std::path::PathBuf;

use thiserror::Error;

use simword_embeddings::EmbeddingError;

/// Result type alias for lexicon operations.
pub type Result<T> = std::result::Result<T, LexiconError>;

/// Errors that can occur while building a vocabulary or selecting a target.
#[derive(Error, Debug)]
pub enum LexiconError {
    /// No word survived filtering.
    #[error("no viable words at frequency threshold {threshold}")]
    EmptyVocabulary { threshold: u64 },

    /// No valid target was drawn within the attempt bound.
    #[error("no valid target word found after {attempts} attempts")]
    SelectionExhausted { attempts: usize },

    /// A forced target has no embedding.
    #[error("no embedding for target word: {0}")]
    TargetNotFound(String),

    /// Input is not a single normalized word.
    #[error("not a single word: {0:?}")]
    InvalidWord(String),

    /// A data file could not be read.
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A data file line could not be parsed.
    #[error("{path}:{line}: {reason}")]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Embedding store error.
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
}
