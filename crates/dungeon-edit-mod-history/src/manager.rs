/// Core undo/redo manager over whole-state snapshots.
///
/// Every discrete edit stores a full copy of the document. The undo stack is
/// bounded: once it holds `max_past` snapshots, the oldest are dropped first.
/// A new edit always discards the redo stack, so history never branches.
use std::collections::VecDeque;

use crate::state::HistoryState;

/// Default number of undo steps kept per document.
pub const DEFAULT_MAX_PAST: usize = 50;

/// Manages undo/redo history for a single editable document.
///
/// `T` is the whole document state. Snapshots are owned values: `push`
/// takes ownership and `undo`/`redo` hand back clones, so nothing outside the
/// manager can alias a stored snapshot. `T` must be an acyclic value type
/// whose `Clone` is a full structural copy (no `Rc`/`RefCell` sharing).
///
/// The manager does no locking. Callers sharing it across threads must
/// serialize access themselves.
pub struct HistoryManager<T> {
    /// Undo stack, oldest first.
    past: VecDeque<T>,
    /// The authoritative current state.
    present: T,
    /// Redo stack, nearest first.
    future: VecDeque<T>,
    /// Maximum length of `past`. Always at least 1.
    max_past: usize,
}

impl<T> std::fmt::Debug for HistoryManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryManager")
            .field("past_len", &self.past.len())
            .field("future_len", &self.future.len())
            .field("max_past", &self.max_past)
            .finish()
    }
}

impl<T> HistoryManager<T> {
    /// Creates a manager at `initial` with the default cap.
    pub fn new(initial: T) -> Self {
        Self::with_max_past(initial, DEFAULT_MAX_PAST)
    }

    /// Creates a manager at `initial` keeping at most `max_past` undo steps.
    ///
    /// A cap of 0 is raised to 1.
    pub fn with_max_past(initial: T, max_past: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present: initial,
            future: VecDeque::new(),
            max_past: max_past.max(1),
        }
    }

    /// Rebuilds a manager from a stored snapshot.
    ///
    /// If the stored undo stack is longer than `max_past` (e.g. the cap was
    /// lowered since it was saved), the oldest entries are dropped.
    pub fn from_state(state: HistoryState<T>, max_past: usize) -> Self {
        let mut mgr = Self {
            past: state.past.into(),
            present: state.present,
            future: state.future.into(),
            max_past: max_past.max(1),
        };
        mgr.enforce_cap();
        mgr
    }

    /// Records `new_state` as the result of one edit.
    ///
    /// The previous present moves onto the undo stack and the redo stack is
    /// cleared. Call once per user-visible edit, not per keystroke.
    pub fn push(&mut self, new_state: T) {
        let previous = std::mem::replace(&mut self.present, new_state);
        self.past.push_back(previous);
        self.enforce_cap();
        if !self.future.is_empty() {
            tracing::trace!(dropped = self.future.len(), "Discarding redo history");
            self.future.clear();
        }
    }

    /// Drops the undo and redo stacks. `present` is kept.
    pub fn clear(&mut self) {
        tracing::debug!(
            past = self.past.len(),
            future = self.future.len(),
            "Clearing history"
        );
        self.past.clear();
        self.future.clear();
    }

    /// Whether there is anything to undo.
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether there is anything to redo.
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// The current state.
    pub fn present(&self) -> &T {
        &self.present
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn max_past(&self) -> usize {
        self.max_past
    }

    /// Consumes the manager, returning its sequences.
    pub fn into_state(self) -> HistoryState<T> {
        HistoryState {
            past: self.past.into(),
            present: self.present,
            future: self.future.into(),
        }
    }

    /// Drops the oldest undo entries until `past` fits the cap.
    fn enforce_cap(&mut self) {
        if self.past.len() > self.max_past {
            let excess = self.past.len() - self.max_past;
            self.past.drain(..excess);
            tracing::trace!(evicted = excess, "Evicted oldest history snapshots");
        }
    }
}

impl<T: Clone> HistoryManager<T> {
    /// Steps back one edit.
    ///
    /// Returns a copy of the restored state, or `None` if there is nothing
    /// to undo (in which case nothing changes).
    pub fn undo(&mut self) -> Option<T> {
        let previous = self.past.pop_back()?;
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        Some(self.present.clone())
    }

    /// Re-applies the most recently undone edit.
    ///
    /// Returns a copy of the restored state, or `None` if there is nothing
    /// to redo (in which case nothing changes).
    pub fn redo(&mut self) -> Option<T> {
        let next = self.future.pop_front()?;
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        self.enforce_cap();
        Some(self.present.clone())
    }

    /// Returns a detached copy of the full history.
    pub fn snapshot(&self) -> HistoryState<T> {
        HistoryState {
            past: self.past.iter().cloned().collect(),
            present: self.present.clone(),
            future: self.future.iter().cloned().collect(),
        }
    }
}
