//! Pattern grids.

use serde::{Deserialize, Serialize};

use crate::note::Note;

/// A grid of notes indexed `rows[row][channel]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pattern {
    /// Rows of cells; every row should be as wide as the module's channel count.
    pub rows: Vec<Vec<Note>>,
}

impl Pattern {
    /// Create an empty pattern.
    pub fn empty(num_rows: usize, num_channels: u8) -> Self {
        Self {
            rows: vec![vec![Note::empty(); num_channels as usize]; num_rows],
        }
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Set a cell. Out-of-range positions are ignored.
    pub fn set_note(&mut self, row: usize, channel: usize, note: Note) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(channel)) {
            *cell = note;
        }
    }

    /// Builder form of [`Pattern::set_note`].
    pub fn with_note(mut self, row: usize, channel: usize, note: Note) -> Self {
        self.set_note(row, channel, note);
        self
    }

    /// Get a cell.
    pub fn note(&self, row: usize, channel: usize) -> Option<&Note> {
        self.rows.get(row).and_then(|r| r.get(channel))
    }

    /// Iterate over `(row, channel, note)` for every non-empty cell.
    pub fn events(&self) -> impl Iterator<Item = (usize, usize, &Note)> {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, note)| !note.is_empty())
                .map(move |(channel, note)| (row, channel, note))
        })
    }
}
