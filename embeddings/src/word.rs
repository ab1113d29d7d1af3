//! Normalized vocabulary words.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Separator used by the lexical database and the vector dump to join
/// multi-word expressions (`ice_cream`).
pub const MULTIWORD_SEPARATOR: char = '_';

/// A lowercased single-token word.
///
/// Equality, ordering and hashing all use the normalized form, so two
/// spellings that differ only in case are the same `Word`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Word(String);

impl Word {
    /// Normalize `raw` into a word.
    ///
    /// Returns `None` for empty input and for multi-word expressions.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || is_multiword(trimmed) {
            return None;
        }
        Some(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Whether `raw` joins several words, either with [`MULTIWORD_SEPARATOR`]
/// or with interior whitespace (`new york`).
pub fn is_multiword(raw: &str) -> bool {
    raw.trim()
        .contains(|c: char| c == MULTIWORD_SEPARATOR || c.is_whitespace())
}

/// Lowercase a lookup key at the store boundary.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Word {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Word {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Word {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Word::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("not a single word: {raw:?}")))
    }
}
