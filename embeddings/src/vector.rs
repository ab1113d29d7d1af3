//! Embedding vectors and numeric normalization at the store boundary.
//!
//! Backing stores do not agree on how they encode vector components: a JSON
//! snapshot holds plain floats, while a database driver may hand back exact
//! decimals (often serialized as strings) or integers. Everything is folded
//! into `f64` here, before any arithmetic happens.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EmbeddingError, Result};

/// A dense embedding vector with `f64` components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbeddingVector(Vec<f64>);

impl EmbeddingVector {
    /// Wrap already-normalized components.
    ///
    /// Fails when any component is NaN or infinite.
    pub fn new(word: &str, components: Vec<f64>) -> Result<Self> {
        if let Some(pos) = components.iter().position(|c| !c.is_finite()) {
            return Err(EmbeddingError::MalformedVector {
                word: word.to_string(),
                reason: format!("component {pos} is not finite"),
            });
        }
        Ok(Self(components))
    }

    /// Normalize a raw JSON array of heterogeneous numbers.
    pub fn from_json(word: &str, raw: &Value) -> Result<Self> {
        let items = raw.as_array().ok_or_else(|| EmbeddingError::MalformedVector {
            word: word.to_string(),
            reason: "expected an array of numbers".to_string(),
        })?;

        let mut components = Vec::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            let value = component_to_f64(item).ok_or_else(|| EmbeddingError::MalformedVector {
                word: word.to_string(),
                reason: format!("component {pos} is not numeric: {item}"),
            })?;
            components.push(value);
        }

        Self::new(word, components)
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Euclidean length.
    pub fn norm(&self) -> f64 {
        self.0.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    /// Check that the vector has the dimension `expected`.
    pub fn ensure_dimension(&self, expected: usize) -> Result<()> {
        if self.0.len() != expected {
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                actual: self.0.len(),
            });
        }
        Ok(())
    }
}

impl From<EmbeddingVector> for Vec<f64> {
    fn from(vector: EmbeddingVector) -> Self {
        vector.0
    }
}

fn component_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
