use super::types::ScoreInput;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

const SCORE_BOOK_VERSION: u32 = 1;

/// Get the default score book path (~/.config/admit-rank/scores.json)
pub fn get_scores_path() -> PathBuf {
    crate::config::get_config_dir().join("scores.json")
}

/// One user's saved scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredScores {
    pub scores: ScoreInput,
    pub updated_at: DateTime<Utc>,
}

/// Every user's saved scores, keyed by user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBook {
    pub version: u32,
    #[serde(default)]
    pub users: HashMap<String, StoredScores>,
}

impl Default for ScoreBook {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreBook {
    pub fn new() -> Self {
        Self {
            version: SCORE_BOOK_VERSION,
            users: HashMap::new(),
        }
    }

    pub fn get(&self, user_id: &str) -> Option<&StoredScores> {
        self.users.get(user_id)
    }

    /// Create or replace a user's scores, returning what was stored
    pub fn upsert(&mut self, user_id: &str, scores: ScoreInput) -> ScoreInput {
        self.users.insert(
            user_id.to_string(),
            StoredScores {
                scores,
                updated_at: Utc::now(),
            },
        );
        scores
    }

    /// Returns true if the user had scores saved
    pub fn remove(&mut self, user_id: &str) -> bool {
        self.users.remove(user_id).is_some()
    }
}

/// Persistence for user scores. Saving is an upsert.
pub trait ScoreStore {
    fn get_user_scores(&self, user_id: &str) -> Result<Option<ScoreInput>>;
    fn save_user_scores(&mut self, user_id: &str, scores: ScoreInput) -> Result<ScoreInput>;
    fn delete_user_scores(&mut self, user_id: &str) -> Result<bool>;

    /// Whether saved scores outlive this process
    fn is_persistent(&self) -> bool {
        true
    }
}

/// Volatile store used in development mode and tests.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    book: ScoreBook,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn get_user_scores(&self, user_id: &str) -> Result<Option<ScoreInput>> {
        Ok(self.book.get(user_id).map(|stored| stored.scores))
    }

    fn save_user_scores(&mut self, user_id: &str, scores: ScoreInput) -> Result<ScoreInput> {
        Ok(self.book.upsert(user_id, scores))
    }

    fn delete_user_scores(&mut self, user_id: &str) -> Result<bool> {
        Ok(self.book.remove(user_id))
    }

    fn is_persistent(&self) -> bool {
        false
    }
}

/// Store backed by a JSON file, rewritten atomically on every change.
#[derive(Debug, Clone)]
pub struct JsonFileScoreStore {
    path: PathBuf,
}

impl JsonFileScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for JsonFileScoreStore {
    fn get_user_scores(&self, user_id: &str) -> Result<Option<ScoreInput>> {
        let book = load_score_book(&self.path)?;
        Ok(book.get(user_id).map(|stored| stored.scores))
    }

    fn save_user_scores(&mut self, user_id: &str, scores: ScoreInput) -> Result<ScoreInput> {
        let mut book = load_score_book(&self.path)?;
        let saved = book.upsert(user_id, scores);
        save_score_book(&self.path, &book)?;
        Ok(saved)
    }

    fn delete_user_scores(&mut self, user_id: &str) -> Result<bool> {
        let mut book = load_score_book(&self.path)?;
        let removed = book.remove(user_id);
        if removed {
            save_score_book(&self.path, &book)?;
        }
        Ok(removed)
    }
}

/// Load the score book from a JSON file
///
/// If the file doesn't exist, returns a new empty book.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_score_book(path: &Path) -> Result<ScoreBook> {
    if !path.exists() {
        return Ok(ScoreBook::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open score book at {}", path.display()))?;

    let book: ScoreBook = serde_json::from_reader(file)
        .with_context(|| format!("Failed to load score book from {}", path.display()))?;

    if book.version != SCORE_BOOK_VERSION {
        anyhow::bail!("Unsupported score book version: {}", book.version);
    }

    Ok(book)
}

/// Save the score book to a JSON file atomically
///
/// Creates the parent directory if it doesn't exist.
pub fn save_score_book(path: &Path, book: &ScoreBook) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, book).context("Failed to serialize score book")?;

    file.commit().context("Failed to save score book")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn sample() -> ScoreInput {
        ScoreInput::new(70, 80, 60, 65, 55).unwrap()
    }

    #[test]
    fn test_memory_store_upsert() {
        let mut store = MemoryScoreStore::new();
        assert!(store.get_user_scores("u1").unwrap().is_none());

        store.save_user_scores("u1", sample()).unwrap();
        assert_eq!(store.get_user_scores("u1").unwrap(), Some(sample()));

        let updated = sample().with_score(crate::scores::Subject::English, 90).unwrap();
        let returned = store.save_user_scores("u1", updated).unwrap();
        assert_eq!(returned, updated);
        assert_eq!(store.get_user_scores("u1").unwrap(), Some(updated));
    }

    #[test]
    fn test_memory_store_delete() {
        let mut store = MemoryScoreStore::new();
        store.save_user_scores("u1", sample()).unwrap();
        assert!(store.delete_user_scores("u1").unwrap());
        assert!(!store.delete_user_scores("u1").unwrap());
        assert!(store.get_user_scores("u1").unwrap().is_none());
    }

    #[test]
    fn test_only_file_store_is_persistent() {
        assert!(!MemoryScoreStore::new().is_persistent());
        assert!(JsonFileScoreStore::new(env::temp_dir().join("admit_rank_unused.json")).is_persistent());
    }

    #[test]
    fn test_load_missing_file_returns_empty() {
        let temp_path = env::temp_dir().join("admit_rank_test_missing_scores.json");
        let _ = std::fs::remove_file(&temp_path);

        let book = load_score_book(&temp_path).unwrap();
        assert_eq!(book.version, 1);
        assert!(book.users.is_empty());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let temp_path = env::temp_dir().join("admit_rank_test_scores_roundtrip.json");
        let _ = std::fs::remove_file(&temp_path);

        let mut store = JsonFileScoreStore::new(&temp_path);
        store.save_user_scores("student-1", sample()).unwrap();
        store.save_user_scores("student-2", sample()).unwrap();

        let reopened = JsonFileScoreStore::new(&temp_path);
        assert_eq!(reopened.get_user_scores("student-1").unwrap(), Some(sample()));

        let book = load_score_book(&temp_path).unwrap();
        assert_eq!(book.users.len(), 2);

        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let temp_path = env::temp_dir().join("admit_rank_test_scores_version.json");
        std::fs::write(&temp_path, r#"{"version": 7, "users": {}}"#).unwrap();

        let result = load_score_book(&temp_path);
        assert!(result.is_err());

        let _ = std::fs::remove_file(&temp_path);
    }
}
