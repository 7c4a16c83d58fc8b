/// Immutable view of a history stack.
use serde::{Deserialize, Serialize};

/// Snapshot of the three history sequences at one point in time.
///
/// Returned by value from `HistoryManager::snapshot`, so editing it never
/// touches the manager it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState<T> {
    /// Snapshots reachable by undo, oldest first.
    pub past: Vec<T>,
    /// The current document state.
    pub present: T,
    /// Snapshots reachable by redo, nearest first.
    pub future: Vec<T>,
}

impl<T> HistoryState<T> {
    /// A state with no undo or redo entries.
    pub fn new(present: T) -> Self {
        Self {
            past: Vec::new(),
            present,
            future: Vec::new(),
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Total number of stored snapshots, `present` included.
    pub fn snapshot_count(&self) -> usize {
        self.past.len() + 1 + self.future.len()
    }
}
