//! # Lexicon
//!
//! Everything the puzzle needs to know about words before embeddings come
//! into play:
//!
//! - **Lexical senses**: part-of-speech tagged senses from WordNet index files
//! - **Frequencies**: occurrence counts from a reference corpus
//! - **Vocabulary**: common single-word nouns, verbs and adjectives
//! - **Target selection**: bounded random draws validated against a store

pub mod context;
pub mod error;
pub mod frequency;
pub mod selector;
pub mod senses;
pub mod vocabulary;
pub mod wordnet;

pub use context::LexicalContext;
pub use error::{LexiconError, Result};
pub use frequency::FrequencyTable;
pub use selector::{CandidateDraws, DEFAULT_MAX_ATTEMPTS, Selection, TargetSelector};
pub use senses::{InMemoryLexicon, LexicalDatabase, PartOfSpeech, Sense};
pub use vocabulary::{CANDIDATE_THRESHOLD, DAILY_THRESHOLD, Vocabulary, VocabularyBuilder};
pub use wordnet::WordNetIndex;
