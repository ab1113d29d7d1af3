//! # Embeddings
//!
//! This crate provides word embedding storage and similarity ranking for the
//! daily word puzzle.
//!
//! ## Features
//!
//! - **Normalized words**: lowercased single tokens, no multi-word expressions
//! - **Embedding stores**: an in-memory snapshot or a remote key-value service
//! - **Numeric normalization**: heterogeneous vector encodings become `f64`
//! - **Similarity ranking**: deterministic top-K by cosine similarity
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embeddings System                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  SnapshotStore ─┐                                               │
//! │                 ├──► EmbeddingStore ──► SimilarityRanker         │
//! │  RemoteStore ───┘         │                   │                 │
//! │                           ▼                   ▼                 │
//! │                    EmbeddingVector      Ranking (top-K)          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod ranking;
pub mod remote;
pub mod similarity;
pub mod snapshot;
pub mod store;
pub mod vector;
pub mod word;

pub use error::{EmbeddingError, Result};
pub use ranking::{DEFAULT_RANKING_LIMIT, Ranking, RankingStats, SimilarityRanker};
pub use remote::RemoteStore;
pub use similarity::{ScoredWord, cosine_similarity};
pub use snapshot::{LoadStats, SnapshotStore};
pub use store::{EmbeddingEntry, EmbeddingStore, EntryStream};
pub use vector::EmbeddingVector;
pub use word::{MULTIWORD_SEPARATOR, Word, is_multiword};
