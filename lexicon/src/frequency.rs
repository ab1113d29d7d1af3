//! Word frequencies over a reference corpus.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{LexiconError, Result};

/// Occurrence counts of lowercased alphabetic words.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    counts: HashMap<String, u64>,
    total: u64,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count words in raw corpus text.
    ///
    /// Tokens are split on whitespace. Tagged tokens in the Brown corpus
    /// style (`word/tag`) keep only the word. Tokens that are not purely
    /// alphabetic are ignored.
    pub fn from_text(text: &str) -> Self {
        let mut table = Self::new();
        for token in text.split_whitespace() {
            let word = token.split_once('/').map_or(token, |(word, _)| word);
            if !word.is_empty() && word.chars().all(char::is_alphabetic) {
                table.add(&word.to_lowercase(), 1);
            }
        }
        table
    }

    /// Parse a pre-aggregated table of `word<TAB>count` lines.
    ///
    /// `path` is only used in error messages.
    pub fn from_counts(path: &Path, content: &str) -> Result<Self> {
        let mut table = Self::new();
        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parse_error = |reason: String| LexiconError::Parse {
                path: PathBuf::from(path),
                line: number + 1,
                reason,
            };
            let (word, count) = line
                .split_once('\t')
                .ok_or_else(|| parse_error("expected word<TAB>count".to_string()))?;
            let count: u64 = count
                .trim()
                .parse()
                .map_err(|_| parse_error(format!("bad count {count:?}")))?;
            table.add(&word.trim().to_lowercase(), count);
        }
        Ok(table)
    }

    /// Load a corpus file. `.tsv` files are read as pre-aggregated counts,
    /// anything else as raw text.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| LexiconError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        let table = if path.extension().is_some_and(|ext| ext == "tsv") {
            Self::from_counts(path, &content)?
        } else {
            Self::from_text(&content)
        };

        info!(
            "Loaded frequency table from {} ({} distinct words, {} tokens)",
            path.display(),
            table.len(),
            table.total
        );
        Ok(table)
    }

    /// Add `count` occurrences of `word`.
    pub fn add(&mut self, word: &str, count: u64) {
        *self.counts.entry(word.to_string()).or_insert(0) += count;
        self.total += count;
    }

    /// Occurrences of `word`, case-insensitive.
    pub fn count(&self, word: &str) -> u64 {
        self.counts
            .get(word)
            .or_else(|| self.counts.get(&word.to_lowercase()))
            .copied()
            .unwrap_or(0)
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of counted tokens.
    pub fn total(&self) -> u64 {
        self.total
    }
}
