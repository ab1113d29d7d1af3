use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use simword_embeddings::{ScoredWord, Word};
use simword_puzzle_store::{PuzzleDraft, PuzzleStore};
use tempfile::TempDir;

fn draft(target: &str) -> PuzzleDraft {
    let rankings = (0..20)
        .map(|i| {
            let word = Word::parse(&format!("w{i:02}")).unwrap();
            ScoredWord::new(word, 1.0 - f64::from(i) * 0.05)
        })
        .collect();
    PuzzleDraft::new(Word::parse(target).unwrap(), rankings).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

#[test]
fn concurrent_commits_get_unique_consecutive_indices() {
    let temp_dir = TempDir::new().unwrap();
    let root = Arc::new(temp_dir.path().to_path_buf());
    let writers = 8;

    let handles: Vec<_> = (0..writers)
        .map(|i| {
            let root = Arc::clone(&root);
            thread::spawn(move || {
                // Separate handles, like separate processes sharing a root.
                let store = PuzzleStore::open(root.as_path()).unwrap();
                store.commit(&draft(&format!("target{i}")), today()).unwrap()
            })
        })
        .collect();

    let indices: BTreeSet<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let expected: BTreeSet<u64> = (1..=writers).collect();
    assert_eq!(indices, expected);

    let store = PuzzleStore::open(root.as_path()).unwrap();
    assert_eq!(store.indices().unwrap(), (1..=writers).collect::<Vec<_>>());
    for index in 1..=writers {
        let record = store.load(index).unwrap().unwrap();
        assert_eq!(record.index, index);
        assert_eq!(record.rankings.len(), 20);
        assert!(record.target.as_str().starts_with("target"));
    }

    let pointer = store.daily_pointer().unwrap().unwrap();
    assert_eq!(pointer.count, writers);
}

#[test]
fn records_survive_reopening() {
    let temp_dir = TempDir::new().unwrap();
    {
        let store = PuzzleStore::open(temp_dir.path()).unwrap();
        store.commit(&draft("cat"), today()).unwrap();
    }

    let store = PuzzleStore::open(temp_dir.path()).unwrap();
    assert_eq!(store.next_index().unwrap(), 2);
    let latest = store.latest().unwrap().unwrap();
    assert_eq!(latest.target.as_str(), "cat");
    for (stored, original) in latest.rankings.iter().zip(draft("cat").rankings()) {
        assert_eq!(stored.word, original.word);
        assert!((stored.similarity - original.similarity).abs() < 1e-12);
    }
    assert_eq!(store.commit(&draft("emu"), today()).unwrap(), 2);
}
