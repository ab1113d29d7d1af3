//! # Daily Pipeline
//!
//! Generates one word puzzle per run and publishes it to the puzzle store.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Daily Pipeline                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │   WordNet    │  │  Frequency   │  │  Embedding   │           │
//! │  │    index     │  │    corpus    │  │    store     │           │
//! │  └──────────────┘  └──────────────┘  └──────────────┘           │
//! │         │                │                  │                   │
//! │         └───────┬────────┘                  │                   │
//! │                 ▼                           │                   │
//! │         ┌──────────────┐   ┌──────────────┐ │                   │
//! │         │  Vocabulary  │──▶│    Target    │◀┤                   │
//! │         │   builder    │   │   selector   │ │                   │
//! │         └──────────────┘   └──────────────┘ │                   │
//! │                                   │         │                   │
//! │                                   ▼         │                   │
//! │                            ┌──────────────┐ │                   │
//! │                            │  Similarity  │◀┘                   │
//! │                            │    ranker    │                     │
//! │                            └──────────────┘                     │
//! │                                   │                             │
//! │                                   ▼                             │
//! │                            ┌──────────────┐                     │
//! │                            │ Puzzle store │                     │
//! │                            └──────────────┘                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use simword_pipeline::{DailyPipeline, PipelineConfig};
//!
//! let config = PipelineConfig::load()?;
//! let outcome = DailyPipeline::new(config).await?.run().await?;
//! println!("puzzle {}", outcome.index());
//! ```

pub mod config;
pub mod engine;
pub mod error;

pub use config::{
    EmbeddingSource, EmbeddingsConfig, LexiconConfig, OutputConfig, PipelineConfig,
    RankingConfig,
};
pub use engine::{
    DailyPipeline, PublishedPuzzle, RunOutcome, export_candidates, load_context,
    open_embedding_store, write_ranking,
};
pub use error::{PipelineError, Result};

// Re-export from dependencies for convenience
pub use simword_embeddings::{Ranking, ScoredWord, Word};
pub use simword_puzzle_store::{DailyPointer, PuzzleRecord, PuzzleStore};
