//! Puzzle records and the daily pointer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use simword_embeddings::{ScoredWord, Word};

use crate::error::{PuzzleStoreError, Result};

/// Maximum number of ranked words stored with a puzzle.
pub const MAX_RANKINGS: usize = 1000;

/// One entry of a ranking artifact: `{"word": ..., "similarity": ...}`.
pub type RankingEntry = ScoredWord;

/// A puzzle ready to be committed; it has no index yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PuzzleDraft {
    target: Word,
    rankings: Vec<RankingEntry>,
}

impl PuzzleDraft {
    /// Validate a target and its ranking.
    ///
    /// The ranking must hold at most [`MAX_RANKINGS`] finite entries, in
    /// non-increasing similarity order, and must not contain the target.
    pub fn new(target: Word, rankings: Vec<RankingEntry>) -> Result<Self> {
        if rankings.len() > MAX_RANKINGS {
            return Err(PuzzleStoreError::InvalidDraft(format!(
                "{} ranked words, at most {MAX_RANKINGS} allowed",
                rankings.len()
            )));
        }
        if let Some(entry) = rankings.iter().find(|e| !e.similarity.is_finite()) {
            return Err(PuzzleStoreError::InvalidDraft(format!(
                "similarity of '{}' is not finite",
                entry.word
            )));
        }
        if rankings.iter().any(|e| e.word == target) {
            return Err(PuzzleStoreError::InvalidDraft(format!(
                "target '{target}' appears in its own ranking"
            )));
        }
        if let Some(pair) = rankings
            .windows(2)
            .find(|pair| pair[0].similarity < pair[1].similarity)
        {
            return Err(PuzzleStoreError::InvalidDraft(format!(
                "ranking not sorted: '{}' before '{}'",
                pair[0].word, pair[1].word
            )));
        }

        Ok(Self { target, rankings })
    }

    pub fn target(&self) -> &Word {
        &self.target
    }

    pub fn rankings(&self) -> &[RankingEntry] {
        &self.rankings
    }
}

/// A committed puzzle.
#[derive(Debug, Clone, PartialEq)]
pub struct PuzzleRecord {
    /// Strictly increasing version number, starting at 1.
    pub index: u64,

    /// The target word.
    pub target: Word,

    /// Ranked words, most similar first.
    pub rankings: Vec<RankingEntry>,
}

/// Points at the most recently committed puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPointer {
    /// Day of the commit, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,

    /// Index of the puzzle.
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(word: &str, similarity: f64) -> RankingEntry {
        ScoredWord::new(Word::parse(word).unwrap(), similarity)
    }

    fn cat() -> Word {
        Word::parse("cat").unwrap()
    }

    #[test]
    fn test_draft_accepts_sorted_ranking() {
        let draft = PuzzleDraft::new(cat(), vec![entry("dog", 0.9), entry("car", 0.1)]).unwrap();
        assert_eq!(draft.rankings().len(), 2);
    }

    #[test]
    fn test_draft_rejects_target_in_ranking() {
        let result = PuzzleDraft::new(cat(), vec![entry("cat", 1.0)]);
        assert!(matches!(result, Err(PuzzleStoreError::InvalidDraft(_))));
    }

    #[test]
    fn test_draft_rejects_unsorted_ranking() {
        let result = PuzzleDraft::new(cat(), vec![entry("car", 0.1), entry("dog", 0.9)]);
        assert!(matches!(result, Err(PuzzleStoreError::InvalidDraft(_))));
    }

    #[test]
    fn test_draft_rejects_oversized_ranking() {
        let rankings = (0..=MAX_RANKINGS)
            .map(|i| entry(&format!("w{i}"), 0.0))
            .collect();
        assert!(PuzzleDraft::new(cat(), rankings).is_err());
    }

    #[test]
    fn test_pointer_format() {
        let pointer = DailyPointer {
            date: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
            count: 12,
        };
        let json = serde_json::to_string(&pointer).unwrap();
        assert_eq!(json, r#"{"date":"2025-03-09","count":12}"#);
    }
}
