//! Knowledge Store - rusqlite-backed question/answer persistence
//!
//! One durable mapping per language ("bangla", "english") plus the shared
//! "learned" overlay for pairs taught at runtime. Keys are canonical text
//! (see [`crate::text::normalize`]); answers are stored verbatim.
//!
//! Writes go through a single-row SQL upsert, so a merge never rewrites the
//! whole mapping and concurrent merges against the same mapping cannot lose
//! each other's updates. Readers always see a consistent snapshot.
//! Default location: ~/.bondhu/knowledge.db

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::text::{normalize, Language};

// ============================================================================
// Data Directory
// ============================================================================

/// Data directory path (~/.bondhu/)
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bondhu")
}

// ============================================================================
// Types
// ============================================================================

/// Selector for one durable mapping: a language base or the learned overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mapping {
    /// Curated per-language knowledge base.
    Base(Language),
    /// Language-agnostic overlay of pairs taught at runtime.
    Learned,
}

impl Mapping {
    /// Stable key identifying the mapping in the `entries` table.
    pub fn key(&self) -> &'static str {
        match self {
            Mapping::Base(lang) => lang.tag(),
            Mapping::Learned => "learned",
        }
    }
}

/// One stored question/answer pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

/// Store statistics, per mapping.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub bangla: usize,
    pub english: usize,
    pub learned: usize,
    pub db_path: PathBuf,
}

/// Store failure taxonomy.
///
/// `InvalidInput` is a caller mistake and is reported as a validation
/// failure; the other variants are server-side I/O failures. A failed merge
/// leaves the persisted mapping unchanged.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database failure: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("question and answer must be non-empty")]
    InvalidInput,

    #[error("knowledge store lock poisoned")]
    Lock,
}

// ============================================================================
// KnowledgeStore
// ============================================================================

/// SQLite-backed store for all question/answer mappings.
///
/// Cheap to clone; clones share one connection behind a mutex, which
/// serializes writers while the per-entry upsert keeps each merge atomic.
#[derive(Clone)]
pub struct KnowledgeStore {
    conn: Arc<Mutex<Connection>>,
    db_path: PathBuf,
}

impl KnowledgeStore {
    /// Open the store at `path`, creating the file and schema if missing.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path: path.to_path_buf(),
        };

        store.initialize()?;
        Ok(store)
    }

    /// Open at the default location (~/.bondhu/knowledge.db).
    pub fn open_default() -> Result<Self, StoreError> {
        let data_dir = get_data_dir();
        if !data_dir.exists() {
            std::fs::create_dir_all(&data_dir)?;
        }
        Self::open(&data_dir.join("knowledge.db"))
    }

    /// Backing database path.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn initialize(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Lock)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS entries (
                mapping TEXT NOT NULL,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (mapping, question)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_entries_mapping ON entries(mapping)",
            [],
        )?;

        tracing::debug!("Knowledge store initialized at {:?}", self.db_path);
        Ok(())
    }

    /// Full snapshot of one mapping, canonical question -> answer.
    ///
    /// A mapping with no rows loads as an empty map; absence of backing data
    /// is never an error. The BTreeMap keeps candidate iteration in a stable
    /// lexicographic order for the matchers.
    pub fn load(&self, mapping: Mapping) -> Result<BTreeMap<String, String>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Lock)?;

        let mut stmt =
            conn.prepare("SELECT question, answer FROM entries WHERE mapping = ?1")?;

        let rows = stmt.query_map(params![mapping.key()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut map = BTreeMap::new();
        for row in rows {
            let (question, answer) = row?;
            map.insert(question, answer);
        }
        Ok(map)
    }

    /// Add or overwrite a single pair and persist it durably.
    ///
    /// The question is canonicalized here so every caller path shares one
    /// definition of key equality. Fails with `InvalidInput` when question
    /// or answer is empty after normalization/trimming; nothing is written
    /// in that case.
    pub fn merge(
        &self,
        mapping: Mapping,
        question: &str,
        answer: &str,
    ) -> Result<(), StoreError> {
        let question = normalize(question);
        let answer = answer.trim();
        if question.is_empty() || answer.is_empty() {
            return Err(StoreError::InvalidInput);
        }

        let conn = self.conn.lock().map_err(|_| StoreError::Lock)?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT OR REPLACE INTO entries (mapping, question, answer, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![mapping.key(), question, answer, now],
        )?;

        tracing::info!(
            target: "bondhu::store",
            mapping = mapping.key(),
            question = %question,
            bytes = answer.len(),
            "merged entry"
        );
        Ok(())
    }

    /// Number of pairs in one mapping.
    pub fn count(&self, mapping: Mapping) -> Result<usize, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Lock)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE mapping = ?1",
            params![mapping.key()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Newest-first listing of one mapping.
    pub fn entries(&self, mapping: Mapping, limit: usize) -> Result<Vec<Entry>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Lock)?;

        let mut stmt = conn.prepare(
            "SELECT question, answer, created_at FROM entries
             WHERE mapping = ?1
             ORDER BY created_at DESC, question ASC
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![mapping.key(), limit as i64], |row| {
            Ok(Entry {
                question: row.get(0)?,
                answer: row.get(1)?,
                created_at: parse_datetime(row.get::<_, String>(2)?),
            })
        })?;

        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Import a flat `{question: answer}` JSON object into one mapping.
    ///
    /// This is the seed format of the original data files. Keys are
    /// canonicalized; pairs that normalize to empty are skipped. Returns the
    /// number of pairs imported.
    pub fn import_json(&self, mapping: Mapping, json: &str) -> Result<usize, StoreError> {
        let pairs: BTreeMap<String, String> = serde_json::from_str(json)
            .map_err(|e| StoreError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

        let mut imported = 0usize;
        for (question, answer) in &pairs {
            match self.merge(mapping, question, answer) {
                Ok(()) => imported += 1,
                Err(StoreError::InvalidInput) => {
                    tracing::warn!(
                        target: "bondhu::store",
                        question = %question,
                        "skipping empty pair during import"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(imported)
    }

    /// Export one mapping as a flat `{question: answer}` JSON object.
    pub fn export_json(&self, mapping: Mapping) -> Result<String, StoreError> {
        let map = self.load(mapping)?;
        serde_json::to_string_pretty(&map)
            .map_err(|e| StoreError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }

    /// Entry counts for every mapping.
    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        Ok(StoreStats {
            bangla: self.count(Mapping::Base(Language::Bangla))?,
            english: self.count(Mapping::Base(Language::English))?,
            learned: self.count(Mapping::Learned)?,
            db_path: self.db_path.clone(),
        })
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse an RFC3339 string into DateTime<Utc>.
fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, KnowledgeStore) {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("test.db");
        let store = KnowledgeStore::open(&db_path).unwrap();
        (dir, store)
    }

    #[test]
    fn test_merge_and_load() {
        let (_dir, store) = create_test_store();
        let mapping = Mapping::Base(Language::Bangla);

        store
            .merge(mapping, "Tumi kemon acho?", "Bhalo achi")
            .unwrap();

        let map = store.load(mapping).unwrap();
        assert_eq!(map.len(), 1);
        // Key is stored canonicalized.
        assert_eq!(
            map.get("tumi kemon acho").map(String::as_str),
            Some("Bhalo achi")
        );
    }

    #[test]
    fn test_load_missing_mapping_is_empty() {
        let (_dir, store) = create_test_store();
        let map = store.load(Mapping::Learned).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_merge_overwrites() {
        let (_dir, store) = create_test_store();
        let mapping = Mapping::Base(Language::English);

        store.merge(mapping, "how are you", "Fine").unwrap();
        store.merge(mapping, "How are you?", "I am fine").unwrap();

        let map = store.load(mapping).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("how are you").map(String::as_str), Some("I am fine"));
    }

    #[test]
    fn test_merge_rejects_empty_input() {
        let (_dir, store) = create_test_store();
        let mapping = Mapping::Learned;

        assert!(matches!(
            store.merge(mapping, "  ?! ", "answer"),
            Err(StoreError::InvalidInput)
        ));
        assert!(matches!(
            store.merge(mapping, "question", "   "),
            Err(StoreError::InvalidInput)
        ));

        // Nothing was written.
        assert_eq!(store.count(mapping).unwrap(), 0);
    }

    #[test]
    fn test_mappings_are_isolated() {
        let (_dir, store) = create_test_store();

        store
            .merge(Mapping::Base(Language::Bangla), "ki koro", "kichu na")
            .unwrap();

        assert!(store
            .load(Mapping::Base(Language::English))
            .unwrap()
            .is_empty());
        assert!(store.load(Mapping::Learned).unwrap().is_empty());
        assert_eq!(store.count(Mapping::Base(Language::Bangla)).unwrap(), 1);
    }

    #[test]
    fn test_concurrent_merges_no_lost_update() {
        let (_dir, store) = create_test_store();
        let mapping = Mapping::Base(Language::English);

        let a = store.clone();
        let b = store.clone();
        let t1 = std::thread::spawn(move || a.merge(mapping, "first question", "one"));
        let t2 = std::thread::spawn(move || b.merge(mapping, "second question", "two"));
        t1.join().unwrap().unwrap();
        t2.join().unwrap().unwrap();

        let map = store.load(mapping).unwrap();
        assert_eq!(map.len(), 2);
        assert!(map.contains_key("first question"));
        assert!(map.contains_key("second question"));
    }

    #[test]
    fn test_import_export_round_trip() {
        let (_dir, store) = create_test_store();
        let mapping = Mapping::Base(Language::Bangla);

        let seed = r#"{
            "Tumi kemon acho?": "Bhalo achi",
            "Tomar naam ki?": "Amar naam Bondhu"
        }"#;

        let imported = store.import_json(mapping, seed).unwrap();
        assert_eq!(imported, 2);

        let exported = store.export_json(mapping).unwrap();
        let parsed: BTreeMap<String, String> = serde_json::from_str(&exported).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(
            parsed.get("tomar naam ki").map(String::as_str),
            Some("Amar naam Bondhu")
        );
    }

    #[test]
    fn test_import_skips_empty_pairs() {
        let (_dir, store) = create_test_store();
        let imported = store
            .import_json(Mapping::Learned, r#"{"?!": "dropped", "kept": "yes"}"#)
            .unwrap();
        assert_eq!(imported, 1);
        assert_eq!(store.count(Mapping::Learned).unwrap(), 1);
    }

    #[test]
    fn test_entries_listing() {
        let (_dir, store) = create_test_store();
        let mapping = Mapping::Base(Language::English);

        for i in 0..5 {
            store
                .merge(mapping, &format!("question {i}"), &format!("answer {i}"))
                .unwrap();
        }

        let listed = store.entries(mapping, 3).unwrap();
        assert_eq!(listed.len(), 3);

        let all = store.entries(mapping, 100).unwrap();
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_stats() {
        let (_dir, store) = create_test_store();
        store
            .merge(Mapping::Base(Language::Bangla), "q1", "a1")
            .unwrap();
        store.merge(Mapping::Learned, "q2", "a2").unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.bangla, 1);
        assert_eq!(stats.english, 0);
        assert_eq!(stats.learned, 1);
    }
}
