//! Puzzle storage and persistence.
//!
//! Layout under the store root:
//!
//! ```text
//! dailyCount.json          {"date": "YYYY-MM-DD", "count": n}
//! puzzles/<n>/<n>.txt      target word
//! puzzles/<n>/top1000_<n>.json
//! .staging/                records being written
//! .lock                    commit lock
//! ```
//!
//! A record is written into a private staging directory and published with a
//! single directory rename, so readers see both artifacts of an index or
//! neither. Commits hold an exclusive lock on `.lock` from index allocation
//! until the pointer is updated, which serializes concurrent writers.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use fd_lock::RwLock;
use simword_embeddings::Word;
use tracing::{debug, info, warn};

use crate::error::{PuzzleStoreError, Result, StorageError};
use crate::record::{DailyPointer, PuzzleDraft, PuzzleRecord, RankingEntry};

const PUZZLES_DIR: &str = "puzzles";
const STAGING_DIR: &str = ".staging";
const LOCK_FILE: &str = ".lock";
const POINTER_FILE: &str = "dailyCount.json";

/// How many fresh indices a commit tries before giving up on conflicts.
const MAX_PUBLISH_ATTEMPTS: usize = 3;

/// File name of the target artifact for `index`.
pub fn target_file_name(index: u64) -> String {
    format!("{index}.txt")
}

/// File name of a ranking artifact. Puzzles are keyed by index, standalone
/// rankings by target word.
pub fn ranking_file_name(key: impl std::fmt::Display) -> String {
    format!("top1000_{key}.json")
}

/// Append-only store of puzzle records.
#[derive(Debug, Clone)]
pub struct PuzzleStore {
    /// Root directory for puzzle storage.
    root: PathBuf,
}

impl PuzzleStore {
    /// Open a store at the given root directory.
    ///
    /// This will create the directory layout if it doesn't exist.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        for dir in [root.join(PUZZLES_DIR), root.join(STAGING_DIR)] {
            fs::create_dir_all(&dir)
                .map_err(|e| StorageError::CreateDirectory(format!("{}: {e}", dir.display())))?;
        }
        Ok(Self { root })
    }

    /// Get the root path of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn puzzles_dir(&self) -> PathBuf {
        self.root.join(PUZZLES_DIR)
    }

    fn record_dir(&self, index: u64) -> PathBuf {
        self.puzzles_dir().join(index.to_string())
    }

    fn pointer_path(&self) -> PathBuf {
        self.root.join(POINTER_FILE)
    }

    /// Every index with a published record directory, ascending.
    fn published_indices(&self) -> Result<Vec<u64>> {
        let dir = self.puzzles_dir();
        let entries = fs::read_dir(&dir)
            .map_err(|e| StorageError::ReadFile(format!("{}: {e}", dir.display())))?;

        let mut indices = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::ReadFile(format!("{e}")))?;
            let Some(index) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<u64>().ok())
            else {
                continue;
            };
            if index > 0 && entry.path().is_dir() {
                indices.push(index);
            }
        }
        indices.sort_unstable();
        Ok(indices)
    }

    /// Indices whose record has both artifacts, ascending.
    pub fn indices(&self) -> Result<Vec<u64>> {
        Ok(self
            .published_indices()?
            .into_iter()
            .filter(|&index| self.is_complete(index))
            .collect())
    }

    fn is_complete(&self, index: u64) -> bool {
        let dir = self.record_dir(index);
        dir.join(target_file_name(index)).is_file() && dir.join(ranking_file_name(index)).is_file()
    }

    /// The index the next commit would receive: one past the highest
    /// published index, or 1 for an empty store.
    ///
    /// Only meaningful while holding the commit lock; [`PuzzleStore::commit`]
    /// calls it under the lock.
    pub fn next_index(&self) -> Result<u64> {
        Ok(self.published_indices()?.last().map_or(1, |max| max + 1))
    }

    /// Commit a draft as the next puzzle and point the daily pointer at it.
    ///
    /// Blocks until the commit lock is free. Returns the new index.
    pub fn commit(&self, draft: &PuzzleDraft, date: NaiveDate) -> Result<u64> {
        let lock_path = self.root.join(LOCK_FILE);
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)
            .map_err(|e| StorageError::Lock(format!("{}: {e}", lock_path.display())))?;
        let mut lock = RwLock::new(lock_file);
        let _guard = lock
            .write()
            .map_err(|e| StorageError::Lock(format!("{}: {e}", lock_path.display())))?;
        debug!("Acquired commit lock {}", lock_path.display());

        self.clear_staging();

        let mut last_conflict = None;
        for _ in 0..MAX_PUBLISH_ATTEMPTS {
            let index = self.next_index()?;
            match self.publish(index, draft) {
                Ok(()) => {
                    if let Err(e) = self.write_pointer(&DailyPointer { date, count: index }) {
                        self.unpublish(index);
                        return Err(e);
                    }
                    info!("Committed puzzle {index} with target '{}'", draft.target());
                    return Ok(index);
                }
                Err(PuzzleStoreError::IndexConflict { index }) => {
                    warn!("Puzzle index {index} already taken, retrying");
                    last_conflict = Some(index);
                }
                Err(e) => return Err(e),
            }
        }

        Err(PuzzleStoreError::IndexConflict {
            index: last_conflict.unwrap_or_default(),
        })
    }

    /// Stage both artifacts for `index` and publish them in one rename.
    fn publish(&self, index: u64, draft: &PuzzleDraft) -> Result<()> {
        let target_dir = self.record_dir(index);
        if target_dir.exists() {
            return Err(PuzzleStoreError::IndexConflict { index });
        }

        let staging = self
            .root
            .join(STAGING_DIR)
            .join(uuid::Uuid::new_v4().to_string());
        fs::create_dir_all(&staging)
            .map_err(|e| StorageError::CreateDirectory(format!("{}: {e}", staging.display())))?;

        let result = self.stage_and_rename(index, draft, &staging, &target_dir);
        if result.is_err() && staging.exists() {
            if let Err(e) = fs::remove_dir_all(&staging) {
                warn!("Failed to remove staging dir {}: {e}", staging.display());
            }
        }
        result
    }

    fn stage_and_rename(
        &self,
        index: u64,
        draft: &PuzzleDraft,
        staging: &Path,
        target_dir: &Path,
    ) -> Result<()> {
        write_synced(
            &staging.join(target_file_name(index)),
            draft.target().as_str().as_bytes(),
        )?;
        let rankings = serde_json::to_vec(draft.rankings())?;
        write_synced(&staging.join(ranking_file_name(index)), &rankings)?;

        match fs::rename(staging, target_dir) {
            Ok(()) => {
                debug!("Published {}", target_dir.display());
                Ok(())
            }
            Err(e) if matches!(e.kind(), ErrorKind::AlreadyExists | ErrorKind::DirectoryNotEmpty) => {
                Err(PuzzleStoreError::IndexConflict { index })
            }
            Err(e) => Err(StorageError::Publish(format!("{}: {e}", target_dir.display())).into()),
        }
    }

    /// Withdraw a record whose pointer update failed, so the commit leaves
    /// nothing behind.
    fn unpublish(&self, index: u64) {
        let record = self.record_dir(index);
        let trash = self
            .root
            .join(STAGING_DIR)
            .join(uuid::Uuid::new_v4().to_string());

        // Renaming first hides the record from readers in one step.
        let removed = match fs::rename(&record, &trash) {
            Ok(()) => fs::remove_dir_all(&trash),
            Err(_) => fs::remove_dir_all(&record),
        };
        match removed {
            Ok(()) => warn!("Withdrew puzzle {index} after failed pointer update"),
            Err(e) => warn!("Failed to withdraw puzzle {index}: {e}"),
        }
    }

    fn write_pointer(&self, pointer: &DailyPointer) -> Result<()> {
        let path = self.pointer_path();
        let content = serde_json::to_vec(pointer)?;

        // Write atomically using a temp file
        let temp_path = path.with_extension("json.tmp");
        write_synced(&temp_path, &content)?;
        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StorageError::WriteFile(format!("{}: {e}", path.display())).into());
        }

        debug!("Updated daily pointer: {} -> {}", pointer.date, pointer.count);
        Ok(())
    }

    /// Remove staging leftovers of interrupted commits.
    fn clear_staging(&self) {
        let staging = self.root.join(STAGING_DIR);
        let Ok(entries) = fs::read_dir(&staging) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            match fs::remove_dir_all(&path) {
                Ok(()) => debug!("Removed stale staging dir {}", path.display()),
                Err(e) => warn!("Failed to remove stale staging dir {}: {e}", path.display()),
            }
        }
    }

    /// Read the daily pointer, if one was ever written.
    pub fn daily_pointer(&self) -> Result<Option<DailyPointer>> {
        let path = self.pointer_path();
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::ReadFile(format!("{}: {e}", path.display())).into());
            }
        };
        Ok(Some(serde_json::from_slice(&content)?))
    }

    /// Load a published record. Returns `None` unless both artifacts exist.
    pub fn load(&self, index: u64) -> Result<Option<PuzzleRecord>> {
        if !self.is_complete(index) {
            return Ok(None);
        }
        let dir = self.record_dir(index);

        let target_path = dir.join(target_file_name(index));
        let raw_target = fs::read_to_string(&target_path)
            .map_err(|e| StorageError::ReadFile(format!("{}: {e}", target_path.display())))?;
        let target = Word::parse(&raw_target).ok_or_else(|| {
            PuzzleStoreError::Corrupt(format!("{}: {raw_target:?}", target_path.display()))
        })?;

        let ranking_path = dir.join(ranking_file_name(index));
        let raw_rankings = fs::read(&ranking_path)
            .map_err(|e| StorageError::ReadFile(format!("{}: {e}", ranking_path.display())))?;
        let rankings: Vec<RankingEntry> = serde_json::from_slice(&raw_rankings)?;

        Ok(Some(PuzzleRecord {
            index,
            target,
            rankings,
        }))
    }

    /// Load the record the daily pointer references.
    pub fn latest(&self) -> Result<Option<PuzzleRecord>> {
        match self.daily_pointer()? {
            Some(pointer) => self.load(pointer.count),
            None => Ok(None),
        }
    }
}

fn write_synced(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path)
        .map_err(|e| StorageError::WriteFile(format!("{}: {e}", path.display())))?;
    file.write_all(content)
        .and_then(|()| file.sync_all())
        .map_err(|e| StorageError::WriteFile(format!("{}: {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use simword_embeddings::ScoredWord;
    use tempfile::TempDir;

    fn draft(target: &str) -> PuzzleDraft {
        let rankings = vec![
            ScoredWord::new(Word::parse("dog").unwrap(), 0.9),
            ScoredWord::new(Word::parse("car").unwrap(), 0.1),
        ];
        PuzzleDraft::new(Word::parse(target).unwrap(), rankings).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn test_commit_assigns_consecutive_indices() {
        let temp_dir = TempDir::new().unwrap();
        let store = PuzzleStore::open(temp_dir.path()).unwrap();

        assert_eq!(store.next_index().unwrap(), 1);
        let first = store.commit(&draft("cat"), day(1)).unwrap();
        assert!(store.load(first).unwrap().is_some());
        let second = store.commit(&draft("emu"), day(2)).unwrap();

        assert_eq!((first, second), (1, 2));
        assert_eq!(store.indices().unwrap(), vec![1, 2]);
        assert_eq!(
            store.daily_pointer().unwrap(),
            Some(DailyPointer {
                date: day(2),
                count: 2
            })
        );
    }

    #[test]
    fn test_artifact_formats() {
        let temp_dir = TempDir::new().unwrap();
        let store = PuzzleStore::open(temp_dir.path()).unwrap();
        store.commit(&draft("cat"), day(5)).unwrap();

        let dir = temp_dir.path().join("puzzles").join("1");
        assert_eq!(fs::read_to_string(dir.join("1.txt")).unwrap(), "cat");
        assert_eq!(
            fs::read_to_string(dir.join("top1000_1.json")).unwrap(),
            r#"[{"word":"dog","similarity":0.9},{"word":"car","similarity":0.1}]"#
        );
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("dailyCount.json")).unwrap(),
            r#"{"date":"2025-01-05","count":1}"#
        );
    }

    #[test]
    fn test_incomplete_record_is_invisible() {
        let temp_dir = TempDir::new().unwrap();
        let store = PuzzleStore::open(temp_dir.path()).unwrap();

        let partial = temp_dir.path().join("puzzles").join("1");
        fs::create_dir_all(&partial).unwrap();
        fs::write(partial.join("1.txt"), "cat").unwrap();

        assert!(store.indices().unwrap().is_empty());
        assert_eq!(store.load(1).unwrap(), None);
        // The half-written index is never reused.
        assert_eq!(store.commit(&draft("emu"), day(1)).unwrap(), 2);
    }

    #[test]
    fn test_latest_follows_pointer() {
        let temp_dir = TempDir::new().unwrap();
        let store = PuzzleStore::open(temp_dir.path()).unwrap();
        assert_eq!(store.latest().unwrap(), None);

        store.commit(&draft("cat"), day(1)).unwrap();
        store.commit(&draft("emu"), day(2)).unwrap();

        let latest = store.latest().unwrap().unwrap();
        assert_eq!(latest.index, 2);
        assert_eq!(latest.target.as_str(), "emu");
        assert_eq!(latest.rankings.len(), 2);
    }

    #[test]
    fn test_failed_pointer_update_withdraws_record() {
        let temp_dir = TempDir::new().unwrap();
        let store = PuzzleStore::open(temp_dir.path()).unwrap();
        let blocker = temp_dir.path().join("dailyCount.json.tmp");
        fs::create_dir_all(&blocker).unwrap();

        let result = store.commit(&draft("cat"), day(1));
        assert!(matches!(
            result,
            Err(PuzzleStoreError::Storage(StorageError::WriteFile(_)))
        ));
        assert!(store.indices().unwrap().is_empty());
        assert!(!temp_dir.path().join("puzzles").join("1").exists());
        assert_eq!(store.daily_pointer().unwrap(), None);

        fs::remove_dir_all(&blocker).unwrap();
        assert_eq!(store.commit(&draft("cat"), day(1)).unwrap(), 1);
        assert_eq!(store.daily_pointer().unwrap().unwrap().count, 1);
    }

    #[test]
    fn test_stale_staging_is_cleared() {
        let temp_dir = TempDir::new().unwrap();
        let store = PuzzleStore::open(temp_dir.path()).unwrap();
        let stale = temp_dir.path().join(".staging").join("crashed");
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("1.txt"), "cat").unwrap();

        store.commit(&draft("emu"), day(1)).unwrap();
        assert!(!stale.exists());
    }
}
