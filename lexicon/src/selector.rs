//! Drawing a valid target word.
//!
//! Vocabulary membership does not guarantee an embedding: the store and the
//! lexical database are sourced independently. Candidates are therefore drawn
//! at random and checked one by one, up to a fixed number of attempts.

use rand::Rng;
use simword_embeddings::{EmbeddingStore, EmbeddingVector, Word};
use tracing::{debug, info, warn};

use crate::error::{LexiconError, Result};
use crate::senses::LexicalDatabase;
use crate::vocabulary::Vocabulary;

/// Default bound on target draws.
pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

/// A bounded sequence of independent uniform draws from a vocabulary.
///
/// Draws are with replacement: a rejected word can come up again.
pub struct CandidateDraws<'a, R> {
    words: &'a [Word],
    rng: R,
    remaining: usize,
}

impl<'a, R: Rng> CandidateDraws<'a, R> {
    pub fn new(vocabulary: &'a Vocabulary, rng: R, max_draws: usize) -> Self {
        Self {
            words: vocabulary.words(),
            rng,
            remaining: max_draws,
        }
    }
}

impl<'a, R: Rng> Iterator for CandidateDraws<'a, R> {
    type Item = &'a Word;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 || self.words.is_empty() {
            return None;
        }
        self.remaining -= 1;
        let pick = self.rng.random_range(0..self.words.len());
        self.words.get(pick)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = if self.words.is_empty() { 0 } else { self.remaining };
        (n, Some(n))
    }
}

/// The accepted target and its vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub word: Word,
    pub vector: EmbeddingVector,

    /// Draws consumed, including the accepted one.
    pub attempts: usize,
}

/// Picks the target word for a puzzle.
#[derive(Debug, Clone, Copy)]
pub struct TargetSelector {
    max_attempts: usize,
}

impl TargetSelector {
    pub fn new(max_attempts: usize) -> Self {
        Self { max_attempts }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Draw until a word has an embedding and a noun, verb or adjective
    /// sense.
    ///
    /// Lookup misses and malformed vectors reject the draw. Other store
    /// errors abort the selection.
    pub async fn select<R: Rng + Send>(
        &self,
        vocabulary: &Vocabulary,
        store: &dyn EmbeddingStore,
        lexicon: &dyn LexicalDatabase,
        rng: R,
    ) -> Result<Selection> {
        let mut attempts = 0;
        for candidate in CandidateDraws::new(vocabulary, rng, self.max_attempts) {
            attempts += 1;

            let vector = match store.get(candidate.as_str()).await {
                Ok(Some(vector)) => vector,
                Ok(None) => {
                    debug!("Rejected '{candidate}': no embedding");
                    continue;
                }
                Err(e) if e.is_recoverable() => {
                    warn!("Rejected '{candidate}': {e}");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if !lexicon.has_content_sense(candidate.as_str()) {
                debug!("Rejected '{candidate}': no noun, verb or adjective sense");
                continue;
            }

            info!("Selected target '{candidate}' after {attempts} attempt(s)");
            return Ok(Selection {
                word: candidate.clone(),
                vector,
                attempts,
            });
        }

        Err(LexiconError::SelectionExhausted { attempts })
    }

    /// Use `word` as the target without drawing.
    pub async fn resolve(&self, word: &str, store: &dyn EmbeddingStore) -> Result<Selection> {
        let word = Word::parse(word).ok_or_else(|| LexiconError::InvalidWord(word.to_string()))?;
        let vector = store
            .get(word.as_str())
            .await?
            .ok_or_else(|| LexiconError::TargetNotFound(word.to_string()))?;
        Ok(Selection {
            word,
            vector,
            attempts: 1,
        })
    }
}

impl Default for TargetSelector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::FrequencyTable;
    use crate::senses::{InMemoryLexicon, PartOfSpeech};
    use crate::vocabulary::VocabularyBuilder;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use simword_embeddings::SnapshotStore;

    fn vector(components: &[f64]) -> EmbeddingVector {
        EmbeddingVector::new("test", components.to_vec()).unwrap()
    }

    fn fixture(words: &[&str]) -> (InMemoryLexicon, Vocabulary) {
        let mut lexicon = InMemoryLexicon::new();
        let mut frequencies = FrequencyTable::new();
        for word in words {
            lexicon.insert(word, &[PartOfSpeech::Noun]);
            frequencies.add(word, 50);
        }
        let vocabulary = VocabularyBuilder::new(25)
            .build(&lexicon, &frequencies)
            .unwrap();
        (lexicon, vocabulary)
    }

    #[test]
    fn test_draws_are_bounded() {
        let (_, vocabulary) = fixture(&["a", "b", "c"]);
        let draws: Vec<&Word> =
            CandidateDraws::new(&vocabulary, StdRng::seed_from_u64(1), 10).collect();
        assert_eq!(draws.len(), 10);
        assert!(draws.iter().all(|w| vocabulary.contains(w.as_str())));
    }

    #[test]
    fn test_draws_are_reproducible_with_seed() {
        let (_, vocabulary) = fixture(&["a", "b", "c", "d", "e"]);
        let first: Vec<&Word> =
            CandidateDraws::new(&vocabulary, StdRng::seed_from_u64(42), 20).collect();
        let second: Vec<&Word> =
            CandidateDraws::new(&vocabulary, StdRng::seed_from_u64(42), 20).collect();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_select_skips_words_without_embedding() {
        let (lexicon, vocabulary) = fixture(&["cat", "dog", "emu", "yak"]);
        let store = SnapshotStore::from_entries([("dog", vector(&[1.0, 0.0]))]);

        let selection = TargetSelector::default()
            .select(&vocabulary, &store, &lexicon, StdRng::seed_from_u64(7))
            .await
            .unwrap();

        assert_eq!(selection.word.as_str(), "dog");
        assert_eq!(selection.vector, vector(&[1.0, 0.0]));
        assert!(selection.attempts >= 1);
    }

    #[tokio::test]
    async fn test_select_requires_content_sense() {
        let (_, vocabulary) = fixture(&["cat"]);
        let store = SnapshotStore::from_entries([("cat", vector(&[1.0, 0.0]))]);
        let adverbs_only = InMemoryLexicon::new().with_lemma("cat", &[PartOfSpeech::Adverb]);

        let err = TargetSelector::new(25)
            .select(&vocabulary, &store, &adverbs_only, StdRng::seed_from_u64(3))
            .await
            .unwrap_err();
        assert!(matches!(err, LexiconError::SelectionExhausted { attempts: 25 }));
    }

    #[tokio::test]
    async fn test_select_exhausts_without_coverage() {
        let (lexicon, vocabulary) = fixture(&["cat", "dog"]);
        let store = SnapshotStore::new();

        let err = TargetSelector::new(1000)
            .select(&vocabulary, &store, &lexicon, StdRng::seed_from_u64(9))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LexiconError::SelectionExhausted { attempts: 1000 }
        ));
    }

    #[tokio::test]
    async fn test_resolve_forced_target() {
        let store = SnapshotStore::from_entries([("cat", vector(&[1.0, 0.0]))]);
        let selector = TargetSelector::default();

        let selection = selector.resolve("Cat", &store).await.unwrap();
        assert_eq!(selection.word.as_str(), "cat");

        assert!(matches!(
            selector.resolve("dog", &store).await,
            Err(LexiconError::TargetNotFound(_))
        ));
        assert!(matches!(
            selector.resolve("hot_dog", &store).await,
            Err(LexiconError::InvalidWord(_))
        ));
    }
}
