//! In-memory embedding store loaded from a serialized snapshot.
//!
//! The snapshot is the JSON object produced by converting the raw vector
//! dump: `{ "word": [c0, c1, ...], ... }`.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use async_trait::async_trait;
use futures::stream;
use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::store::{EmbeddingEntry, EmbeddingStore, EntryStream};
use crate::vector::EmbeddingVector;
use crate::word::{Word, is_multiword, normalize_key};

/// Counters collected while loading a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Entries admitted into the store.
    pub admitted: usize,

    /// Entries whose vector could not be normalized.
    pub malformed: usize,

    /// Entries whose dimension differed from the store's.
    pub wrong_dimension: usize,

    /// Keys that collided with an already admitted key after lowercasing.
    pub duplicates: usize,
}

/// A fully materialized embedding store.
pub struct SnapshotStore {
    /// Lowercased key to vector, including multi-word keys.
    entries: BTreeMap<String, EmbeddingVector>,

    /// Dimension shared by every vector.
    dimension: Option<usize>,

    /// Load counters.
    stats: LoadStats,
}

impl SnapshotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            dimension: None,
            stats: LoadStats::default(),
        }
    }

    /// Load a snapshot file from disk.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read(path).await?;
        let store = Self::from_json_slice(&content)?;
        info!(
            "Loaded {} embeddings from {} (dimension {:?})",
            store.len(),
            path.display(),
            store.dimension
        );
        Ok(store)
    }

    /// Build a store from snapshot JSON.
    pub fn from_json_slice(json: &[u8]) -> Result<Self> {
        let raw: Map<String, Value> = serde_json::from_slice(json)?;
        let mut store = Self::new();
        let mut parsed = Vec::with_capacity(raw.len());
        for (key, value) in &raw {
            match EmbeddingVector::from_json(key, value) {
                Ok(vector) => parsed.push((key.as_str(), vector)),
                Err(e) => {
                    warn!("Skipping snapshot entry: {e}");
                    store.stats.malformed += 1;
                }
            }
        }
        store.admit_all(parsed);
        Ok(store)
    }

    /// Build a store from already-normalized entries.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, EmbeddingVector)>,
        K: AsRef<str>,
    {
        let mut store = Self::new();
        store.admit_all(entries.into_iter().collect());
        store
    }

    /// Fix the shared dimension from the whole batch, then admit each entry.
    fn admit_all<K: AsRef<str>>(&mut self, entries: Vec<(K, EmbeddingVector)>) {
        self.dimension = dominant_dimension(&entries);
        for (key, vector) in entries {
            self.admit(key.as_ref(), vector);
        }
    }

    /// Insert one entry, enforcing the shared dimension.
    fn admit(&mut self, key: &str, vector: EmbeddingVector) {
        let key = normalize_key(key);
        if key.is_empty() {
            self.stats.malformed += 1;
            return;
        }

        match self.dimension {
            Some(expected) => {
                if let Err(e) = vector.ensure_dimension(expected) {
                    warn!("Skipping snapshot entry '{key}': {e}");
                    self.stats.wrong_dimension += 1;
                    return;
                }
            }
            None => self.dimension = Some(vector.dimension()),
        }

        if self.entries.contains_key(&key) {
            debug!("Duplicate snapshot key after lowercasing: {key}");
            self.stats.duplicates += 1;
            return;
        }

        self.entries.insert(key, vector);
        self.stats.admitted += 1;
    }

    /// Number of stored entries, multi-word keys included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn load_stats(&self) -> &LoadStats {
        &self.stats
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Most common dimension among single-word keys, the smaller one on a tie.
///
/// Falls back to every key when the batch holds no single word, so a
/// stray multi-word or odd-length entry cannot decide the store's shape.
fn dominant_dimension<K: AsRef<str>>(entries: &[(K, EmbeddingVector)]) -> Option<usize> {
    let tally = |single_only: bool| {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for (key, vector) in entries {
            let key = normalize_key(key.as_ref());
            if key.is_empty() || (single_only && is_multiword(&key)) {
                continue;
            }
            *counts.entry(vector.dimension()).or_default() += 1;
        }
        counts
            .into_iter()
            .max_by(|(dim_a, n_a), (dim_b, n_b)| n_a.cmp(n_b).then(dim_b.cmp(dim_a)))
            .map(|(dimension, _)| dimension)
    };
    tally(true).or_else(|| tally(false))
}

#[async_trait]
impl EmbeddingStore for SnapshotStore {
    fn name(&self) -> &str {
        "snapshot"
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    async fn get(&self, word: &str) -> Result<Option<EmbeddingVector>> {
        Ok(self.entries.get(&normalize_key(word)).cloned())
    }

    fn scan_all(&self) -> EntryStream<'_> {
        let entries = self.entries.iter().filter_map(|(key, vector)| {
            if is_multiword(key) {
                return None;
            }
            Word::parse(key).map(|word| Ok(EmbeddingEntry::new(word, vector.clone())))
        });
        Box::pin(stream::iter(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use pretty_assertions::assert_eq;

    fn vector(components: &[f64]) -> EmbeddingVector {
        EmbeddingVector::new("test", components.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_get_is_case_insensitive() {
        let store = SnapshotStore::from_entries([("Cat", vector(&[1.0, 0.0]))]);
        assert_eq!(store.get("CAT").await.unwrap(), Some(vector(&[1.0, 0.0])));
        assert_eq!(store.get("dog").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_scan_skips_multiword_keys() {
        let store = SnapshotStore::from_entries([
            ("ice_cream", vector(&[1.0, 1.0])),
            ("new york", vector(&[0.5, 0.5])),
            ("ice", vector(&[1.0, 0.0])),
            ("cream", vector(&[0.0, 1.0])),
        ]);

        let words: Vec<String> = store
            .scan_all()
            .map(|item| item.unwrap().word.into_string())
            .collect()
            .await;
        assert_eq!(words, vec!["cream".to_string(), "ice".to_string()]);

        // multi-word keys are still reachable by direct lookup
        assert!(store.get("ice_cream").await.unwrap().is_some());
        assert!(store.get("New York").await.unwrap().is_some());
    }

    #[test]
    fn test_from_json_normalizes_and_rejects() {
        let json = br#"{
            "Alpha": [1, "0.5", 0.25],
            "beta": [1.0, 2.0],
            "gamma": [1.0, "x", 3.0],
            "delta": [0.0, 0.0, 1.0]
        }"#;
        let store = SnapshotStore::from_json_slice(json).unwrap();

        assert_eq!(store.dimension(), Some(3));
        assert_eq!(
            store.load_stats(),
            &LoadStats {
                admitted: 2,
                malformed: 1,
                wrong_dimension: 1,
                duplicates: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_dimension_follows_single_word_majority() {
        // "a_b" sorts first and "aardvark" is an outlier; neither decides the shape.
        let store = SnapshotStore::from_entries([
            ("a_b", vector(&[1.0, 0.0, 0.0])),
            ("aardvark", vector(&[1.0])),
            ("apple", vector(&[1.0, 0.0])),
            ("boat", vector(&[0.0, 1.0])),
            ("cat", vector(&[0.5, 0.5])),
        ]);

        assert_eq!(store.dimension(), Some(2));
        assert_eq!(store.load_stats().admitted, 3);
        assert_eq!(store.load_stats().wrong_dimension, 2);
        assert!(store.get("apple").await.unwrap().is_some());
        assert_eq!(store.get("aardvark").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");
        tokio::fs::write(&path, r#"{"sun": [0.1, 0.2], "moon": [0.2, 0.1]}"#)
            .await
            .unwrap();

        let store = SnapshotStore::load(&path).await.unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.get("Moon").await.unwrap().is_some());
    }
}
