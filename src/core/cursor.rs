//! Cursor state management
//!
//! The cursor tracks the position within one screen buffer. Its column may
//! equal the buffer width, which marks a pending wrap: the next printed
//! character first moves to the start of the following row.

use serde::{Deserialize, Serialize};

use super::attributes::Attributes;

/// Cursor position (0-indexed)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

impl Cursor {
    /// Create a new cursor at the home position
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to an absolute position, clamping to the buffer bounds
    pub fn move_to(&mut self, row: usize, col: usize, rows: usize, cols: usize) {
        self.row = row.min(rows.saturating_sub(1));
        self.col = col.min(cols.saturating_sub(1));
    }

    /// Move up by n rows, stopping at `min_row`
    pub fn move_up(&mut self, n: usize, min_row: usize) {
        self.row = self.row.saturating_sub(n).max(min_row.min(self.row));
    }

    /// Move down by n rows, stopping at `max_row`
    pub fn move_down(&mut self, n: usize, max_row: usize) {
        self.row = self.row.saturating_add(n).min(max_row.max(self.row));
    }

    /// Move left by n columns, stopping at column 0
    pub fn move_left(&mut self, n: usize) {
        self.col = self.col.saturating_sub(n);
    }

    /// Move right by n columns, stopping at the last column
    pub fn move_right(&mut self, n: usize, cols: usize) {
        self.col = self.col.saturating_add(n).min(cols.saturating_sub(1));
    }

    /// Carriage return - move to column 0
    pub fn carriage_return(&mut self) {
        self.col = 0;
    }

    /// Check whether the cursor sits past the last column
    pub fn is_pending_wrap(&self, cols: usize) -> bool {
        self.col >= cols
    }
}

/// Saved cursor state shared by DECSC/DECRC and CSI s/u
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCursor {
    pub cursor: Cursor,
    pub attrs: Attributes,
}
