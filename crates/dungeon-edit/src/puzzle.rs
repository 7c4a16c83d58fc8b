/// Puzzle document model edited by the CLI.
use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Tile character for an empty floor cell.
pub const FLOOR: char = '.';

/// Largest accepted grid side.
pub const MAX_SIDE: usize = 256;

/// A dungeon puzzle: a named rectangular grid of tile characters.
///
/// Rows are stored as strings of exactly `width` chars each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleDocument {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub rows: Vec<String>,
}

impl PuzzleDocument {
    /// Creates an all-floor puzzle.
    pub fn new(name: impl Into<String>, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 || width > MAX_SIDE || height > MAX_SIDE {
            bail!("Grid size {width}x{height} out of range (1..={MAX_SIDE} per side)");
        }
        Ok(Self {
            name: name.into(),
            width,
            height,
            rows: vec![FLOOR.to_string().repeat(width); height],
        })
    }

    /// Returns the tile at (`x`, `y`), or `None` when out of bounds.
    pub fn tile(&self, x: usize, y: usize) -> Option<char> {
        self.rows.get(y)?.chars().nth(x)
    }

    /// Sets the tile at (`x`, `y`).
    ///
    /// Returns whether the grid changed.
    pub fn set_tile(&mut self, x: usize, y: usize, tile: char) -> Result<bool> {
        if x >= self.width || y >= self.height {
            bail!(
                "Tile ({x}, {y}) is outside the {}x{} grid",
                self.width,
                self.height
            );
        }
        if tile.is_control() || tile.is_whitespace() {
            bail!("Invalid tile character {tile:?}");
        }
        if self.tile(x, y) == Some(tile) {
            return Ok(false);
        }
        let row = &mut self.rows[y];
        *row = row
            .chars()
            .enumerate()
            .map(|(i, c)| if i == x { tile } else { c })
            .collect();
        Ok(true)
    }

    /// Number of cells that are not floor.
    pub fn non_floor_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|r| r.chars())
            .filter(|&c| c != FLOOR)
            .count()
    }
}

impl fmt::Display for PuzzleDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({}x{})", self.name, self.width, self.height)?;
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}
