//! End-to-end vocabulary construction from on-disk WordNet and corpus files.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use simword_embeddings::Word;
use simword_lexicon::{
    LexicalContext, LexicalDatabase, LexiconError, PartOfSpeech, VocabularyBuilder,
};

fn write_wordnet(dir: &Path) {
    fs::write(
        dir.join("index.noun"),
        "  1 license text\nrun n 1 0 1 0 00189565\nzephyr n 1 0 1 0 11486409\nice_cream n 1 0 1 0 07614500\ncat n 1 0 1 0 02121620\n",
    )
    .unwrap();
    fs::write(dir.join("index.verb"), "run v 1 0 1 0 01926311\n").unwrap();
    fs::write(dir.join("index.adj"), "quick a 1 0 1 0 00979366\n").unwrap();
    fs::write(dir.join("index.adv"), "often r 1 0 1 0 00040353\n").unwrap();
}

fn write_corpus(path: &Path) {
    let mut text = String::new();
    for _ in 0..100 {
        text.push_str("run/vb ");
    }
    for _ in 0..30 {
        text.push_str("quick/jj often/rb ");
    }
    text.push_str("zephyr/nn cat/nn ice_cream/nn\n");
    fs::write(path, text).unwrap();
}

#[test]
fn test_daily_threshold_keeps_common_words() {
    let dir = tempfile::TempDir::new().unwrap();
    write_wordnet(dir.path());
    let corpus = dir.path().join("brown.txt");
    write_corpus(&corpus);

    let context = LexicalContext::load(dir.path(), &corpus).unwrap();
    let vocabulary = VocabularyBuilder::new(25).build_from(&context).unwrap();

    let words: Vec<&str> = vocabulary.iter().map(Word::as_str).collect();
    assert_eq!(words, vec!["quick", "run"]);
    assert!(context.lexicon().has_content_sense("run"));
    assert!(!context.lexicon().has_content_sense("often"));
    assert_eq!(context.lexicon().all_lemmas(PartOfSpeech::Adverb), vec!["often"]);
}

#[test]
fn test_loose_threshold_grows_pool() {
    let dir = tempfile::TempDir::new().unwrap();
    write_wordnet(dir.path());
    let corpus = dir.path().join("brown.txt");
    write_corpus(&corpus);

    let context = LexicalContext::load(dir.path(), &corpus).unwrap();
    let strict = VocabularyBuilder::daily().build_from(&context).unwrap();
    let loose = VocabularyBuilder::new(1).build_from(&context).unwrap();

    assert!(loose.len() > strict.len());
    assert!(loose.contains("zephyr"));
    assert!(!loose.contains("ice_cream"));
}

#[test]
fn test_impossible_threshold_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    write_wordnet(dir.path());
    let corpus = dir.path().join("counts.tsv");
    fs::write(&corpus, "run\t3\n").unwrap();

    let context = LexicalContext::load(dir.path(), &corpus).unwrap();
    let err = VocabularyBuilder::daily().build_from(&context).unwrap_err();
    assert!(matches!(err, LexiconError::EmptyVocabulary { threshold: 25 }));
}
