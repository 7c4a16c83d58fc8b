/// Configuration for the history system: defaults, JSON load/save.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::manager::DEFAULT_MAX_PAST;

/// Environment variable overriding the history data directory.
pub const DATA_DIR_ENV: &str = "DUNGEON_EDIT_DATA_DIR";

/// Configuration for the history system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Max undo steps kept per document.
    pub max_past: usize,
    /// Root directory for the history database.
    pub data_dir: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_past: DEFAULT_MAX_PAST,
            data_dir: resolve_data_dir(),
        }
    }
}

impl HistoryConfig {
    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (unreadable file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<HistoryConfig>(&contents) {
                    Ok(mut config) => {
                        config.sanitize();
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {}: {e}", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {}: {e}", path.display());
                }
            }
            // Don't overwrite a broken file
            Self::default()
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e}", path.display());
            }
            config
        }
    }

    /// Saves config to `path` as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Clamps values into their valid ranges.
    pub fn sanitize(&mut self) {
        self.max_past = self.max_past.max(1);
    }
}

/// Resolves the data directory path.
///
/// Resolution order:
/// 1. `DUNGEON_EDIT_DATA_DIR` environment variable
/// 2. `.data/` directory next to the executable
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("."));
    exe.parent().unwrap_or(Path::new(".")).join(".data")
}
