/// One editing session: a document id, its history, and optional storage.
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::HistoryConfig;
use crate::manager::HistoryManager;
use crate::persistence::HistoryStore;
use crate::state::HistoryState;

/// Binds a `HistoryManager` to a document id and, optionally, to a shared
/// `HistoryStore` so the history can be flushed to disk and restored later.
pub struct EditSession<T> {
    /// Document identifier used as the persistence key.
    doc_id: String,
    history: HistoryManager<T>,
    /// Optional disk persistence (None = in-memory only).
    store: Option<Arc<HistoryStore>>,
    /// Whether in-memory state has changed since the last flush.
    dirty: bool,
}

impl<T> std::fmt::Debug for EditSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("doc_id", &self.doc_id)
            .field("history", &self.history)
            .field("persistent", &self.store.is_some())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl<T> EditSession<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Opens a session for `doc_id`.
    ///
    /// If the store holds history for this document it is restored and
    /// `initial` is ignored; otherwise the session starts at `initial`
    /// with empty undo/redo stacks.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails to read the stored history.
    pub fn open(
        doc_id: impl Into<String>,
        initial: T,
        config: &HistoryConfig,
        store: Option<Arc<HistoryStore>>,
    ) -> Result<Self> {
        let doc_id = doc_id.into();
        let stored = match &store {
            Some(s) => s
                .load_state::<T>(&doc_id)
                .with_context(|| format!("Failed to load history for {doc_id}"))?,
            None => None,
        };

        let history = match stored {
            Some(state) => {
                tracing::debug!(
                    doc_id = %doc_id,
                    past = state.past.len(),
                    future = state.future.len(),
                    "Restored history"
                );
                HistoryManager::from_state(state, config.max_past)
            }
            None => HistoryManager::with_max_past(initial, config.max_past),
        };

        Ok(Self {
            doc_id,
            history,
            store,
            dirty: false,
        })
    }

    /// Reopens a document that already has stored history.
    ///
    /// Returns `None` if the store holds nothing for `doc_id`. The history
    /// is read once.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails to read the stored history.
    pub fn resume(
        doc_id: impl Into<String>,
        config: &HistoryConfig,
        store: Arc<HistoryStore>,
    ) -> Result<Option<Self>> {
        let doc_id = doc_id.into();
        let Some(state) = store
            .load_state::<T>(&doc_id)
            .with_context(|| format!("Failed to load history for {doc_id}"))?
        else {
            return Ok(None);
        };

        Ok(Some(Self {
            doc_id,
            history: HistoryManager::from_state(state, config.max_past),
            store: Some(store),
            dirty: false,
        }))
    }

    /// Starts a new document under `doc_id`, discarding any stored history.
    ///
    /// The session begins dirty so the first `flush` records `initial`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored history cannot be removed.
    pub fn create(
        doc_id: impl Into<String>,
        initial: T,
        config: &HistoryConfig,
        store: Option<Arc<HistoryStore>>,
    ) -> Result<Self> {
        let doc_id = doc_id.into();
        if let Some(s) = &store {
            if s.delete_document(&doc_id)
                .with_context(|| format!("Failed to replace history for {doc_id}"))?
            {
                tracing::debug!(doc_id = %doc_id, "Replaced existing history");
            }
        }

        Ok(Self {
            doc_id,
            history: HistoryManager::with_max_past(initial, config.max_past),
            store,
            dirty: true,
        })
    }

    /// Opens a session that never touches disk.
    pub fn in_memory(doc_id: impl Into<String>, initial: T, config: &HistoryConfig) -> Self {
        Self {
            doc_id: doc_id.into(),
            history: HistoryManager::with_max_past(initial, config.max_past),
            store: None,
            dirty: false,
        }
    }

    /// Returns the document ID.
    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    /// Records one edit. See `HistoryManager::push`.
    pub fn push(&mut self, new_state: T) {
        self.history.push(new_state);
        self.dirty = true;
    }

    /// Steps back one edit. See `HistoryManager::undo`.
    pub fn undo(&mut self) -> Option<T> {
        let restored = self.history.undo()?;
        self.dirty = true;
        Some(restored)
    }

    /// Re-applies one undone edit. See `HistoryManager::redo`.
    pub fn redo(&mut self) -> Option<T> {
        let restored = self.history.redo()?;
        self.dirty = true;
        Some(restored)
    }

    /// Drops undo and redo history, keeping the current state.
    pub fn clear(&mut self) {
        self.history.clear();
        self.dirty = true;
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn present(&self) -> &T {
        self.history.present()
    }

    /// Borrows the underlying manager.
    pub fn history(&self) -> &HistoryManager<T> {
        &self.history
    }

    pub fn snapshot(&self) -> HistoryState<T> {
        self.history.snapshot()
    }

    /// Whether there are changes not yet flushed.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Writes the history to disk.
    ///
    /// No-op if the session is in-memory only or nothing has changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the disk write fails.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(store) = &self.store {
            store
                .save_state(&self.doc_id, &self.history.snapshot())
                .with_context(|| format!("Failed to flush history for {}", self.doc_id))?;
            self.dirty = false;
        }
        Ok(())
    }

    /// Deletes the stored history and clears undo/redo in memory.
    ///
    /// The current state is kept. Nothing is written back until the next
    /// edit and flush.
    ///
    /// # Errors
    ///
    /// Returns an error if disk cleanup fails.
    pub fn delete_history(&mut self) -> Result<()> {
        if let Some(store) = &self.store {
            store
                .delete_document(&self.doc_id)
                .with_context(|| format!("Failed to delete history for {}", self.doc_id))?;
        }

        self.history.clear();
        self.dirty = false;
        Ok(())
    }
}
