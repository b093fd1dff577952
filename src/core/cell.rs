//! Terminal Cell
//!
//! Represents a single cell in the terminal grid, containing a character
//! and the attribute snapshot it was written with.

use serde::{Deserialize, Serialize};

use super::attributes::Attributes;

/// A single cell in the terminal grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The character in this cell
    pub ch: char,
    /// Attributes captured when the character was written
    pub attrs: Attributes,
    /// Display width: 1 normal, 2 for the lead cell of a wide character,
    /// 0 for the continuation cell that follows it
    pub width: u8,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            attrs: Attributes::DEFAULT,
            width: 1,
        }
    }
}

impl Cell {
    /// Create a cell holding `ch` with default attributes
    pub fn new(ch: char) -> Self {
        Self {
            ch,
            ..Default::default()
        }
    }

    /// Create a cell with content and attributes
    pub fn with_attrs(ch: char, attrs: Attributes) -> Self {
        Self {
            ch,
            attrs,
            width: 1,
        }
    }

    /// Lead cell of a double-width character
    pub fn wide(ch: char, attrs: Attributes) -> Self {
        Self {
            ch,
            attrs,
            width: 2,
        }
    }

    /// Placeholder cell that follows a double-width character
    pub fn continuation(attrs: Attributes) -> Self {
        Self {
            ch: ' ',
            attrs,
            width: 0,
        }
    }

    /// Check if this cell is a blank default cell
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }

    /// Check if this cell is the second half of a wide character
    pub fn is_continuation(&self) -> bool {
        self.width == 0
    }

    /// Reset the cell to the default blank state
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
