//! Building the admissible candidate vocabulary.

use std::collections::BTreeSet;

use simword_embeddings::{Word, is_multiword};
use tracing::{debug, info};

use crate::context::LexicalContext;
use crate::error::{LexiconError, Result};
use crate::frequency::FrequencyTable;
use crate::senses::{LexicalDatabase, PartOfSpeech};

/// Frequency threshold for daily puzzle targets.
pub const DAILY_THRESHOLD: u64 = 25;

/// Looser threshold for the offline candidate pool.
pub const CANDIDATE_THRESHOLD: u64 = 6;

/// A sorted set of admissible single words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    words: Vec<Word>,
    threshold: u64,
}

impl Vocabulary {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words
            .binary_search_by(|w| w.as_str().cmp(word))
            .is_ok()
    }

    /// Words in ascending order.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn iter(&self) -> impl Iterator<Item = &Word> {
        self.words.iter()
    }

    /// Frequency threshold the vocabulary was built with.
    pub fn threshold(&self) -> u64 {
        self.threshold
    }
}

/// Derives a [`Vocabulary`] from a lexical database and a frequency table.
#[derive(Debug, Clone, Copy)]
pub struct VocabularyBuilder {
    threshold: u64,
}

impl VocabularyBuilder {
    pub fn new(threshold: u64) -> Self {
        Self { threshold }
    }

    /// Builder for daily puzzle targets.
    pub fn daily() -> Self {
        Self::new(DAILY_THRESHOLD)
    }

    /// Builder for the offline candidate pool.
    pub fn candidates() -> Self {
        Self::new(CANDIDATE_THRESHOLD)
    }

    /// Build from a shared lexical context.
    pub fn build_from(&self, context: &LexicalContext) -> Result<Vocabulary> {
        self.build(context.lexicon(), context.frequencies())
    }

    /// Keep noun, verb and adjective lemmas that are single words and occur
    /// at least `threshold` times.
    pub fn build(
        &self,
        lexicon: &dyn LexicalDatabase,
        frequencies: &FrequencyTable,
    ) -> Result<Vocabulary> {
        let mut lemmas: BTreeSet<Word> = BTreeSet::new();
        for pos in PartOfSpeech::CONTENT {
            let mut multiword = 0usize;
            for lemma in lexicon.all_lemmas(pos) {
                if is_multiword(&lemma) {
                    multiword += 1;
                    continue;
                }
                if let Some(word) = Word::parse(&lemma) {
                    lemmas.insert(word);
                }
            }
            debug!("Skipped {multiword} multi-word {pos:?} lemmas");
        }

        let candidates = lemmas.len();
        let words: Vec<Word> = lemmas
            .into_iter()
            .filter(|word| frequencies.count(word.as_str()) >= self.threshold)
            .collect();

        info!(
            "Vocabulary has {} of {candidates} single-word lemmas at threshold {}",
            words.len(),
            self.threshold
        );

        if words.is_empty() {
            return Err(LexiconError::EmptyVocabulary {
                threshold: self.threshold,
            });
        }

        Ok(Vocabulary {
            words,
            threshold: self.threshold,
        })
    }
}
