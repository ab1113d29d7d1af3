//! The embedding store capability.
//!
//! A store resolves single words to vectors and enumerates everything it
//! holds. Ranking code only sees this trait, so a snapshot loaded into memory
//! and a remote key-value service are interchangeable.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::vector::EmbeddingVector;
use crate::word::Word;

/// A word and its vector, as produced by [`EmbeddingStore::scan_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingEntry {
    pub word: Word,
    pub vector: EmbeddingVector,
}

impl EmbeddingEntry {
    pub fn new(word: Word, vector: EmbeddingVector) -> Self {
        Self { word, vector }
    }
}

/// Lazy, finite sequence of store entries.
///
/// Items that fail for a single entry carry a recoverable error (see
/// [`crate::EmbeddingError::is_recoverable`]); any other error ends the scan.
pub type EntryStream<'a> = BoxStream<'a, Result<EmbeddingEntry>>;

/// Trait for embedding stores.
#[async_trait]
pub trait EmbeddingStore: Send + Sync {
    /// Get the name of this store backing.
    fn name(&self) -> &str;

    /// Vector dimension, when the backing knows it up front.
    fn dimension(&self) -> Option<usize>;

    /// Look up one word. The key is lowercased before lookup.
    ///
    /// `Ok(None)` means the store has no vector for the word.
    async fn get(&self, word: &str) -> Result<Option<EmbeddingVector>>;

    /// Enumerate every single-word entry.
    ///
    /// Multi-word keys are never yielded. Each call starts a fresh scan.
    fn scan_all(&self) -> EntryStream<'_>;
}
