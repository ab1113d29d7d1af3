//! The lexical sense database capability.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Part of speech of a sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

impl PartOfSpeech {
    /// Parts of speech a puzzle word may carry.
    pub const CONTENT: [PartOfSpeech; 3] = [Self::Noun, Self::Verb, Self::Adjective];

    /// Parse a WordNet part-of-speech tag. Adjective satellites (`s`) count
    /// as adjectives.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "n" => Some(Self::Noun),
            "v" => Some(Self::Verb),
            "a" | "s" => Some(Self::Adjective),
            "r" => Some(Self::Adverb),
            _ => None,
        }
    }

    pub fn tag(self) -> char {
        match self {
            Self::Noun => 'n',
            Self::Verb => 'v',
            Self::Adjective => 'a',
            Self::Adverb => 'r',
        }
    }

    pub fn is_content(self) -> bool {
        Self::CONTENT.contains(&self)
    }
}

/// One sense (synset) a word belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Sense {
    /// Stable sense identifier.
    pub id: String,

    /// Part of speech of the sense.
    pub pos: PartOfSpeech,
}

impl Sense {
    pub fn new(id: impl Into<String>, pos: PartOfSpeech) -> Self {
        Self { id: id.into(), pos }
    }
}

/// Read-only access to a lexical sense database.
pub trait LexicalDatabase: Send + Sync {
    /// All senses of `word`. The lookup is case-insensitive.
    fn synsets(&self, word: &str) -> Vec<Sense>;

    /// Every lemma with at least one sense of `pos`, as stored (multi-word
    /// lemmas included).
    fn all_lemmas(&self, pos: PartOfSpeech) -> Vec<String>;

    /// Whether `word` has at least one noun, verb or adjective sense.
    fn has_content_sense(&self, word: &str) -> bool {
        self.synsets(word).iter().any(|sense| sense.pos.is_content())
    }
}

/// A lexical database held entirely in memory.
///
/// Used for fixtures and for lexicons assembled by hand.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLexicon {
    senses: BTreeMap<String, BTreeSet<Sense>>,
}

impl InMemoryLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `lemma` with one sense for each part of speech in `pos`.
    pub fn with_lemma(mut self, lemma: &str, pos: &[PartOfSpeech]) -> Self {
        self.insert(lemma, pos);
        self
    }

    pub fn insert(&mut self, lemma: &str, pos: &[PartOfSpeech]) {
        let key = lemma.trim().to_lowercase();
        let senses = self.senses.entry(key.clone()).or_default();
        for p in pos {
            senses.insert(Sense::new(format!("{key}.{}.01", p.tag()), *p));
        }
    }

    pub fn len(&self) -> usize {
        self.senses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senses.is_empty()
    }
}

impl LexicalDatabase for InMemoryLexicon {
    fn synsets(&self, word: &str) -> Vec<Sense> {
        self.senses
            .get(&word.trim().to_lowercase())
            .map(|senses| senses.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn all_lemmas(&self, pos: PartOfSpeech) -> Vec<String> {
        self.senses
            .iter()
            .filter(|(_, senses)| senses.iter().any(|s| s.pos == pos))
            .map(|(lemma, _)| lemma.clone())
            .collect()
    }
}
