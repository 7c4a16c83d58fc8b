/// Subcommands of the puzzle editor and their execution against the store.
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use dungeon_edit_mod_history::{EditSession, HistoryConfig, HistoryStore};

use crate::puzzle::PuzzleDocument;

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Start a new all-floor puzzle, replacing any existing history.
    New {
        doc: String,
        /// Display name (defaults to the document id).
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value_t = 8)]
        width: usize,
        #[arg(long, default_value_t = 8)]
        height: usize,
    },
    /// Set one tile.
    Set {
        doc: String,
        x: usize,
        y: usize,
        tile: char,
    },
    /// Rename a puzzle.
    Rename { doc: String, name: String },
    /// Undo the last edit.
    Undo { doc: String },
    /// Redo the last undone edit.
    Redo { doc: String },
    /// Print a puzzle and its history counts.
    Show {
        doc: String,
        /// Print the puzzle as JSON instead of a grid.
        #[arg(long)]
        json: bool,
    },
    /// Drop undo/redo history, keeping the current puzzle.
    Clear { doc: String },
    /// Remove a puzzle and its history.
    Delete { doc: String },
    /// List stored puzzles.
    List,
}

/// Open history store plus the settings sessions are opened with.
#[derive(Debug)]
pub struct Workspace {
    store: Arc<HistoryStore>,
    config: HistoryConfig,
}

impl Workspace {
    /// Opens the store under `config.data_dir`.
    pub fn open(config: HistoryConfig) -> Result<Self> {
        let store = HistoryStore::open(&config.data_dir)?;
        Ok(Self { store, config })
    }

    /// Runs one command and returns the text to print.
    pub fn run(&self, command: &Command) -> Result<String> {
        match command {
            Command::New {
                doc,
                name,
                width,
                height,
            } => {
                let name = name.clone().unwrap_or_else(|| doc.clone());
                let puzzle = PuzzleDocument::new(name, *width, *height)?;
                let mut session = EditSession::create(
                    doc.as_str(),
                    puzzle,
                    &self.config,
                    Some(Arc::clone(&self.store)),
                )?;
                session.flush()?;
                Ok(format!("Created {doc}\n{}", session.present()))
            }
            Command::Set { doc, x, y, tile } => {
                let mut session = self.session(doc)?;
                let mut puzzle = session.present().clone();
                if !puzzle.set_tile(*x, *y, *tile)? {
                    return Ok(format!("Tile ({x}, {y}) already {tile:?}"));
                }
                session.push(puzzle);
                session.flush()?;
                Ok(format!("Set ({x}, {y}) to {tile:?}"))
            }
            Command::Rename { doc, name } => {
                let mut session = self.session(doc)?;
                if session.present().name == *name {
                    return Ok(format!("Already named {name:?}"));
                }
                let mut puzzle = session.present().clone();
                puzzle.name.clone_from(name);
                session.push(puzzle);
                session.flush()?;
                Ok(format!("Renamed to {name:?}"))
            }
            Command::Undo { doc } => {
                let mut session = self.session(doc)?;
                match session.undo() {
                    Some(puzzle) => {
                        session.flush()?;
                        Ok(format!("Undone\n{puzzle}"))
                    }
                    None => Ok("Nothing to undo".to_string()),
                }
            }
            Command::Redo { doc } => {
                let mut session = self.session(doc)?;
                match session.redo() {
                    Some(puzzle) => {
                        session.flush()?;
                        Ok(format!("Redone\n{puzzle}"))
                    }
                    None => Ok("Nothing to redo".to_string()),
                }
            }
            Command::Show { doc, json } => {
                let session = self.session(doc)?;
                let history = session.history();
                if *json {
                    return serde_json::to_string_pretty(session.present())
                        .context("Failed to serialize puzzle");
                }
                Ok(format!(
                    "{}tiles: {}, undo: {}, redo: {}",
                    session.present(),
                    session.present().non_floor_count(),
                    history.past_len(),
                    history.future_len()
                ))
            }
            Command::Clear { doc } => {
                let mut session = self.session(doc)?;
                session.clear();
                session.flush()?;
                Ok(format!("Cleared history of {doc}"))
            }
            Command::Delete { doc } => {
                if !self.store.delete_document(doc)? {
                    bail!("Unknown puzzle {doc:?}");
                }
                Ok(format!("Deleted {doc}"))
            }
            Command::List => Ok(self.store.list_documents()?.join("\n")),
        }
    }

    /// Opens the session of an existing puzzle.
    fn session(&self, doc: &str) -> Result<EditSession<PuzzleDocument>> {
        match EditSession::resume(doc, &self.config, Arc::clone(&self.store))? {
            Some(session) => Ok(session),
            None => bail!("Unknown puzzle {doc:?} (create it with `new`)"),
        }
    }
}
