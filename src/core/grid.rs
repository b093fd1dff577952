//! Terminal Grid
//!
//! An owned 2D grid of cells representing the visible terminal area.
//! Scroll, insert and delete operations rotate whole rows inside the
//! affected band instead of aliasing them, so no two positions ever share
//! a row.

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::line::Line;

/// The terminal grid - rows of cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    lines: Vec<Line>,
    cols: usize,
}

impl Grid {
    /// Create a blank grid
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            lines: (0..rows).map(|_| Line::new(cols)).collect(),
            cols,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.lines.len()
    }

    /// Get a reference to a cell
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.lines.get(row).and_then(|l| l.cell(col))
    }

    /// Get a mutable reference to a cell
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.lines.get_mut(row).and_then(|l| l.cell_mut(col))
    }

    /// Get a reference to a line
    pub fn line(&self, row: usize) -> Option<&Line> {
        self.lines.get(row)
    }

    /// Get a mutable reference to a line
    pub fn line_mut(&mut self, row: usize) -> Option<&mut Line> {
        self.lines.get_mut(row)
    }

    /// Iterate over the lines top to bottom
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    /// Resize, keeping the overlapping top-left region
    pub fn resize(&mut self, cols: usize, rows: usize) {
        for line in &mut self.lines {
            line.resize(cols);
        }
        self.lines.resize_with(rows, || Line::new(cols));
        self.cols = cols;
    }

    /// Clear the entire grid
    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
    }

    /// Clear all lines in `start..end`
    pub fn clear_lines(&mut self, start: usize, end: usize) {
        let end = end.min(self.lines.len());
        if start >= end {
            return;
        }
        for line in &mut self.lines[start..end] {
            line.clear();
        }
    }

    /// Scroll the band `top..=bottom` up by `n` lines.
    ///
    /// Lines leaving the top of the band are returned oldest first; the
    /// vacated lines at the bottom are blank.
    pub fn scroll_up(&mut self, top: usize, bottom: usize, n: usize) -> Vec<Line> {
        let Some(band) = self.band(top, bottom) else {
            return Vec::new();
        };
        let n = n.min(band.len());
        if n == 0 {
            return Vec::new();
        }

        let cols = self.cols;
        let band = &mut self.lines[band];
        band.rotate_left(n);
        let len = band.len();
        band[len - n..]
            .iter_mut()
            .map(|line| std::mem::replace(line, Line::new(cols)))
            .collect()
    }

    /// Scroll the band `top..=bottom` down by `n` lines, discarding lines
    /// pushed past the bottom and leaving blank lines at the top
    pub fn scroll_down(&mut self, top: usize, bottom: usize, n: usize) {
        let Some(band) = self.band(top, bottom) else {
            return;
        };
        let n = n.min(band.len());
        if n == 0 {
            return;
        }

        let band = &mut self.lines[band];
        band.rotate_right(n);
        for line in &mut band[..n] {
            line.clear();
        }
    }

    /// Insert `n` blank lines at `row`, pushing lines below it down within
    /// `row..=bottom`
    pub fn insert_lines(&mut self, row: usize, bottom: usize, n: usize) {
        self.scroll_down(row, bottom, n);
    }

    /// Delete `n` lines at `row`, pulling lines below it up within
    /// `row..=bottom`
    pub fn delete_lines(&mut self, row: usize, bottom: usize, n: usize) {
        self.scroll_up(row, bottom, n);
    }

    fn band(&self, top: usize, bottom: usize) -> Option<std::ops::Range<usize>> {
        let bottom = bottom.min(self.lines.len().checked_sub(1)?);
        (top <= bottom).then_some(top..bottom + 1)
    }
}
