//! # Puzzle Store
//!
//! Versioned, append-only storage for daily puzzles. Each commit takes the
//! next integer index and publishes two artifacts under it:
//!
//! ```text
//! ┌──────────────┐  commit   ┌─────────────────────────────┐
//! │ PuzzleDraft  │──────────▶│ lock → stage → rename → ptr │
//! └──────────────┘           └──────────────┬──────────────┘
//!                                           │
//!                     ┌─────────────────────┼─────────────────────┐
//!                     ▼                     ▼                     ▼
//!               puzzles/<n>/<n>.txt  puzzles/<n>/top1000_<n>.json  dailyCount.json
//! ```
//!
//! Readers never observe a half-written record, and concurrent writers never
//! share an index.

pub mod error;
pub mod record;
pub mod store;

pub use error::{PuzzleStoreError, Result, StorageError};
pub use record::{DailyPointer, MAX_RANKINGS, PuzzleDraft, PuzzleRecord, RankingEntry};
pub use store::{PuzzleStore, ranking_file_name, target_file_name};
