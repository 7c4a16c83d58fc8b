/// Bounded linear undo/redo history over value snapshots.
///
/// Provides a `HistoryManager<T>` that keeps whole-state snapshots of an
/// editable document, plus an optional on-disk store (redb) so a document's
/// history survives across editing sessions.
pub mod config;
pub mod manager;
pub mod persistence;
pub mod session;
pub mod state;

pub use config::HistoryConfig;
pub use manager::{HistoryManager, DEFAULT_MAX_PAST};
pub use persistence::HistoryStore;
pub use session::EditSession;
pub use state::HistoryState;
