//! Ranking every stored word by similarity to a target.
//!
//! The ranker consumes one bulk scan of the store, scores entries in
//! fixed-size chunks on the rayon pool and keeps only the best `limit`
//! entries in a bounded heap. The final order is similarity descending with
//! ties broken by word ascending, so the output depends only on the set of
//! scanned entries, never on scan order or on how the scoring was scheduled.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use futures::StreamExt;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EmbeddingError, Result};
use crate::similarity::{ScoredWord, cosine_with_magnitude};
use crate::store::{EmbeddingEntry, EmbeddingStore};
use crate::vector::EmbeddingVector;
use crate::word::Word;

/// Number of ranked words kept for a puzzle.
pub const DEFAULT_RANKING_LIMIT: usize = 1000;

/// Entries scored per parallel batch.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Counters collected during one ranking pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingStats {
    /// Items yielded by the scan, including skipped ones.
    pub scanned: usize,

    /// Entries with a computed similarity.
    pub scored: usize,

    /// Entries dropped because they were the target itself.
    pub skipped_target: usize,

    /// Entries dropped because the word was already seen in this scan.
    pub skipped_duplicate: usize,

    /// Entries dropped for malformed, mismatched or zero vectors.
    pub skipped_malformed: usize,
}

/// The ordered result of a ranking pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub target: Word,
    pub entries: Vec<ScoredWord>,
    pub stats: RankingStats,
}

impl Ranking {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Heap element ordered so that the heap's maximum is the worst-ranked entry.
struct Worst(ScoredWord);

impl PartialEq for Worst {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Worst {}

impl PartialOrd for Worst {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Worst {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.rank_cmp(&other.0)
    }
}

/// Bounded best-`limit` selection.
struct TopK {
    limit: usize,
    heap: BinaryHeap<Worst>,
}

impl TopK {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            heap: BinaryHeap::with_capacity(limit.saturating_add(1)),
        }
    }

    fn offer(&mut self, candidate: ScoredWord) {
        if self.limit == 0 {
            return;
        }
        if self.heap.len() < self.limit {
            self.heap.push(Worst(candidate));
            return;
        }
        let beats_worst = self
            .heap
            .peek()
            .is_some_and(|worst| candidate.rank_cmp(&worst.0) == Ordering::Less);
        if beats_worst {
            self.heap.pop();
            self.heap.push(Worst(candidate));
        }
    }

    fn into_sorted(self) -> Vec<ScoredWord> {
        self.heap.into_sorted_vec().into_iter().map(|w| w.0).collect()
    }
}

/// Ranks a store's vocabulary against a target vector.
#[derive(Debug, Clone)]
pub struct SimilarityRanker {
    limit: usize,
    chunk_size: usize,
}

impl SimilarityRanker {
    /// Create a ranker keeping the top [`DEFAULT_RANKING_LIMIT`] words.
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_RANKING_LIMIT,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set how many ranked words to keep.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set how many entries are scored per parallel batch.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Rank every scanned word except `target` by cosine similarity to
    /// `target_vector`.
    ///
    /// An empty store yields an empty ranking. A zero target vector is an
    /// error since nothing could be scored against it.
    ///
    /// Scored entries are held in the bounded heap plus one chunk. The
    /// duplicate filter remembers every distinct scanned word, so its size
    /// follows the store's vocabulary.
    pub async fn rank(
        &self,
        target: &Word,
        target_vector: &EmbeddingVector,
        store: &dyn EmbeddingStore,
    ) -> Result<Ranking> {
        let target_magnitude = target_vector.norm();
        if target_magnitude == 0.0 {
            return Err(EmbeddingError::DegenerateVector);
        }

        info!(
            "Ranking '{target}' against {} store (limit {})",
            store.name(),
            self.limit
        );

        let mut stats = RankingStats::default();
        let mut top = TopK::new(self.limit);
        let mut seen: HashSet<Word> = HashSet::new();
        let mut batch: Vec<EmbeddingEntry> = Vec::with_capacity(self.chunk_size);

        let mut scan = store.scan_all();
        while let Some(item) = scan.next().await {
            stats.scanned += 1;
            let entry = match item {
                Ok(entry) => entry,
                Err(e) if e.is_recoverable() => {
                    warn!("Skipping scanned entry: {e}");
                    stats.skipped_malformed += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            if entry.word == *target {
                stats.skipped_target += 1;
                continue;
            }
            if !seen.insert(entry.word.clone()) {
                debug!("Duplicate scanned word: {}", entry.word);
                stats.skipped_duplicate += 1;
                continue;
            }

            batch.push(entry);
            if batch.len() >= self.chunk_size {
                score_batch(&mut batch, target_vector, target_magnitude, &mut top, &mut stats);
            }
        }
        score_batch(&mut batch, target_vector, target_magnitude, &mut top, &mut stats);

        let entries = top.into_sorted();
        info!(
            "Ranked {} of {} scored words for '{target}' ({} skipped as malformed)",
            entries.len(),
            stats.scored,
            stats.skipped_malformed
        );

        Ok(Ranking {
            target: target.clone(),
            entries,
            stats,
        })
    }
}

impl Default for SimilarityRanker {
    fn default() -> Self {
        Self::new()
    }
}

fn score_batch(
    batch: &mut Vec<EmbeddingEntry>,
    target_vector: &EmbeddingVector,
    target_magnitude: f64,
    top: &mut TopK,
    stats: &mut RankingStats,
) {
    if batch.is_empty() {
        return;
    }

    let query = target_vector.as_slice();
    let scored: Vec<(Word, Result<f64>)> = batch
        .par_drain(..)
        .map(|entry| {
            let similarity = cosine_with_magnitude(query, target_magnitude, entry.vector.as_slice());
            (entry.word, similarity)
        })
        .collect();

    for (word, similarity) in scored {
        match similarity {
            Ok(similarity) => {
                stats.scored += 1;
                top.offer(ScoredWord::new(word, similarity));
            }
            Err(e) => {
                warn!("Skipping '{word}': {e}");
                stats.skipped_malformed += 1;
            }
        }
    }
}
