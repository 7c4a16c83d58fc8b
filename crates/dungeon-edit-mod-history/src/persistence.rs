/// Disk persistence layer backed by redb.
///
/// Uses a single redb database file with one table, `history`, mapping a
/// document id to the bincode-serialized `HistoryState` of that document.
/// Each save replaces the whole entry (last write wins).
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::state::HistoryState;

/// History table: doc_id → bincode-serialized HistoryState.
const HISTORY_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("history");

/// File name of the database inside the data directory.
const DB_FILE_NAME: &str = "history.redb";

/// Persistence layer for undo/redo history backed by redb.
///
/// Thread-safe: redb supports concurrent readers and serialized writers.
/// Shared across documents via `Arc<HistoryStore>`.
pub struct HistoryStore {
    db: Database,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore").finish()
    }
}

impl HistoryStore {
    /// Opens or creates the history database in the given directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened.
    pub fn open(data_dir: &Path) -> Result<Arc<Self>> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join(DB_FILE_NAME);
        let db = Database::create(&db_path)
            .with_context(|| format!("Failed to open history database: {}", db_path.display()))?;

        // Ensure the table exists
        let write_txn = db
            .begin_write()
            .context("Failed to begin initial write transaction")?;
        {
            let _ = write_txn
                .open_table(HISTORY_TABLE)
                .context("Failed to create history table")?;
        }
        write_txn
            .commit()
            .context("Failed to commit initial transaction")?;

        tracing::debug!("Opened history database at {}", db_path.display());
        Ok(Arc::new(Self { db }))
    }

    /// Writes the full history of a document, replacing any stored one.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write transaction fails.
    pub fn save_state<T: Serialize>(&self, doc_id: &str, state: &HistoryState<T>) -> Result<()> {
        let bytes = bincode::serialize(state).context("Failed to serialize history state")?;

        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(HISTORY_TABLE)
                .context("Failed to open history table")?;
            table
                .insert(doc_id, bytes.as_slice())
                .context("Failed to insert history state")?;
        }
        write_txn
            .commit()
            .context("Failed to commit write transaction")?;

        tracing::debug!(
            doc_id,
            past = state.past.len(),
            future = state.future.len(),
            bytes = bytes.len(),
            "Saved history"
        );
        Ok(())
    }

    /// Reads the stored history of a document.
    ///
    /// Returns `None` if no history exists for this document.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction or deserialization fails.
    pub fn load_state<T: DeserializeOwned>(&self, doc_id: &str) -> Result<Option<HistoryState<T>>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(HISTORY_TABLE)
            .context("Failed to open history table")?;

        match table.get(doc_id).context("Failed to read history state")? {
            Some(guard) => {
                let state: HistoryState<T> = bincode::deserialize(guard.value())
                    .with_context(|| format!("Failed to deserialize history for {doc_id}"))?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    /// Removes the stored history of a document.
    ///
    /// Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write transaction fails.
    pub fn delete_document(&self, doc_id: &str) -> Result<bool> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        let removed = {
            let mut table = write_txn
                .open_table(HISTORY_TABLE)
                .context("Failed to open history table")?;
            let removed = table
                .remove(doc_id)
                .context("Failed to remove history state")?;
            removed.is_some()
        };
        write_txn.commit().context("Failed to commit deletion")?;
        Ok(removed)
    }

    /// Lists all document IDs with stored history, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction fails.
    pub fn list_documents(&self) -> Result<Vec<String>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(HISTORY_TABLE)
            .context("Failed to open history table")?;

        let mut doc_ids = Vec::new();
        for entry in table.iter().context("Failed to iterate history table")? {
            let (key_guard, _) = entry.context("Failed to read history entry")?;
            doc_ids.push(key_guard.value().to_string());
        }
        Ok(doc_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_state(present: &str, past: &[&str]) -> HistoryState<String> {
        HistoryState {
            past: past.iter().map(|s| s.to_string()).collect(),
            present: present.to_string(),
            future: Vec::new(),
        }
    }

    fn open_test_db() -> (Arc<HistoryStore>, TempDir) {
        let dir = TempDir::new().expect("create temp dir");
        let store = HistoryStore::open(dir.path()).expect("open db");
        (store, dir)
    }

    #[test]
    fn test_open_creates_database() {
        let (store, dir) = open_test_db();
        assert!(dir.path().join(DB_FILE_NAME).exists());
        assert!(store.list_documents().expect("list docs").is_empty());
    }

    #[test]
    fn test_open_creates_missing_directory() {
        let dir = TempDir::new().expect("create temp dir");
        let nested = dir.path().join("a").join("b");
        let _store = HistoryStore::open(&nested).expect("open nested");
        assert!(nested.join(DB_FILE_NAME).exists());
    }

    #[test]
    fn test_save_and_load_state() {
        let (store, _dir) = open_test_db();
        let state = make_state("c", &["a", "b"]);
        store.save_state("doc", &state).expect("save");

        let loaded: HistoryState<String> =
            store.load_state("doc").expect("load").expect("exists");
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_load_missing_returns_none() {
        let (store, _dir) = open_test_db();
        let loaded: Option<HistoryState<String>> = store.load_state("nope").expect("load");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_overwrites_existing() {
        let (store, _dir) = open_test_db();
        store
            .save_state("doc", &make_state("original", &[]))
            .expect("save");
        store
            .save_state("doc", &make_state("updated", &["original"]))
            .expect("overwrite");

        let loaded: HistoryState<String> =
            store.load_state("doc").expect("load").expect("exists");
        assert_eq!(loaded.present, "updated");
        assert_eq!(loaded.past, vec!["original".to_string()]);
        assert_eq!(store.list_documents().expect("list").len(), 1);
    }

    #[test]
    fn test_delete_document() {
        let (store, _dir) = open_test_db();
        store.save_state("doc", &make_state("x", &[])).expect("save");

        assert!(store.delete_document("doc").expect("delete"));
        assert!(!store.delete_document("doc").expect("delete again"));
        let loaded: Option<HistoryState<String>> = store.load_state("doc").expect("load");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_multi_document_isolation() {
        let (store, _dir) = open_test_db();
        store.save_state("doc-a", &make_state("a", &["a0"])).expect("save a");
        store.save_state("doc-b", &make_state("b", &[])).expect("save b");

        store.delete_document("doc-a").expect("delete a");
        let b: HistoryState<String> = store.load_state("doc-b").expect("load").expect("exists");
        assert_eq!(b.present, "b");
        assert_eq!(store.list_documents().expect("list"), vec!["doc-b"]);
    }

    #[test]
    fn test_list_documents_sorted() {
        let (store, _dir) = open_test_db();
        for id in ["zeta", "alpha", "mid"] {
            store.save_state(id, &make_state(id, &[])).expect("save");
        }
        assert_eq!(
            store.list_documents().expect("list"),
            vec!["alpha", "mid", "zeta"]
        );
    }

    #[test]
    fn test_wrong_type_fails_to_load() {
        let (store, _dir) = open_test_db();
        store.save_state("doc", &make_state("text", &[])).expect("save");
        let loaded: Result<Option<HistoryState<(u64, u64, u64, u64)>>> = store.load_state("doc");
        assert!(loaded.is_err());
    }

    #[test]
    fn test_reopen_database_preserves_data() {
        let dir = TempDir::new().expect("create temp dir");
        {
            let store = HistoryStore::open(dir.path()).expect("open");
            store
                .save_state("doc", &make_state("persistent", &["before"]))
                .expect("save");
        }
        {
            let store = HistoryStore::open(dir.path()).expect("reopen");
            let loaded: HistoryState<String> =
                store.load_state("doc").expect("load").expect("exists");
            assert_eq!(loaded.present, "persistent");
            assert_eq!(loaded.past, vec!["before".to_string()]);
        }
    }
}
