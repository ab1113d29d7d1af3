//! Similarity computation for embeddings.

use std::cmp::Ordering;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::{EmbeddingError, Result};
use crate::word::Word;

/// Compute the cosine similarity between two vectors.
///
/// Returns a value between -1.0 and 1.0, where:
/// - 1.0 means identical direction
/// - 0.0 means orthogonal vectors
/// - -1.0 means opposite vectors
///
/// A zero-norm operand yields [`EmbeddingError::DegenerateVector`] instead of
/// NaN.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    let dot = dot_product(a, b)?;
    let magnitude_a = magnitude(a);
    let magnitude_b = magnitude(b);

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return Err(EmbeddingError::DegenerateVector);
    }

    Ok(dot / (magnitude_a * magnitude_b))
}

/// Cosine similarity against a query whose magnitude is already known.
pub(crate) fn cosine_with_magnitude(query: &[f64], query_magnitude: f64, b: &[f64]) -> Result<f64> {
    let dot = dot_product(query, b)?;
    let magnitude_b = magnitude(b);

    if query_magnitude == 0.0 || magnitude_b == 0.0 {
        return Err(EmbeddingError::DegenerateVector);
    }

    Ok(dot / (query_magnitude * magnitude_b))
}

/// Compute the dot product between two vectors.
pub fn dot_product(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    Ok(a.iter().zip(b.iter()).map(|(x, y)| x * y).sum())
}

pub(crate) fn magnitude(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// One ranked word and its similarity to the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredWord {
    pub word: Word,
    pub similarity: f64,
}

impl ScoredWord {
    pub fn new(word: Word, similarity: f64) -> Self {
        Self { word, similarity }
    }

    /// Ranking order: similarity descending, then word ascending.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        OrderedFloat(other.similarity)
            .cmp(&OrderedFloat(self.similarity))
            .then_with(|| self.word.cmp(&other.word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![0.3, -1.7, 2.25, 9.0];
        let sim = cosine_similarity(&a, &a).unwrap();
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!(sim.abs() < 1e-12);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let a = vec![1.0, 2.0, 0.0];
        let b = vec![-1.0, -2.0, 0.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = vec![1.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!(matches!(
            cosine_similarity(&a, &b),
            Err(EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_zero_vector_is_degenerate() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 0.0];
        assert!(matches!(
            cosine_similarity(&a, &b),
            Err(EmbeddingError::DegenerateVector)
        ));
        assert!(matches!(
            cosine_with_magnitude(&b, 1.0, &a),
            Err(EmbeddingError::DegenerateVector)
        ));
    }

    #[test]
    fn test_rank_cmp_breaks_ties_by_word() {
        let mut scored = vec![
            ScoredWord::new(Word::parse("pear").unwrap(), 0.5),
            ScoredWord::new(Word::parse("apple").unwrap(), 0.5),
            ScoredWord::new(Word::parse("fig").unwrap(), 0.9),
        ];
        scored.sort_by(ScoredWord::rank_cmp);
        let words: Vec<&str> = scored.iter().map(|s| s.word.as_str()).collect();
        assert_eq!(words, vec!["fig", "apple", "pear"]);
    }
}
