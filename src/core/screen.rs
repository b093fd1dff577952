//! Screen buffer implementation
//!
//! A screen buffer is the visible terminal grid plus its cursor, scroll
//! region and saved-cursor slot. The emulator owns two of them (primary and
//! alternate); this type knows nothing about which one it is; operations
//! that push lines off the top return them so the owner can decide whether
//! they belong in scrollback.

use serde::{Deserialize, Serialize};

use super::attributes::Attributes;
use super::cell::Cell;
use super::cursor::{Cursor, SavedCursor};
use super::grid::Grid;
use super::line::Line;

/// Erase mode for ED / EL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseMode {
    /// From the cursor to the end (inclusive)
    ToEnd,
    /// From the start to the cursor (inclusive)
    ToStart,
    /// Everything
    All,
}

/// One screen buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    grid: Grid,
    cursor: Cursor,
    /// Scroll region top (0-indexed, inclusive)
    scroll_top: usize,
    /// Scroll region bottom (0-indexed, inclusive)
    scroll_bottom: usize,
    saved: SavedCursor,
}

impl Screen {
    /// Create a blank screen buffer. Both dimensions must be at least 1.
    pub fn new(cols: usize, rows: usize) -> Self {
        assert!(cols > 0 && rows > 0, "screen dimensions must be non-zero");
        Self {
            grid: Grid::new(cols, rows),
            cursor: Cursor::new(),
            scroll_top: 0,
            scroll_bottom: rows - 1,
            saved: SavedCursor::default(),
        }
    }

    /// Get the number of columns
    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    /// Get the number of rows
    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    pub fn scroll_bottom(&self) -> usize {
        self.scroll_bottom
    }

    /// Check whether `row` lies inside the scroll region
    pub fn in_scroll_region(&self, row: usize) -> bool {
        (self.scroll_top..=self.scroll_bottom).contains(&row)
    }

    /// Get a cell at the given position
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.grid.cell(row, col)
    }

    /// Get a line at the given row
    pub fn line(&self, row: usize) -> Option<&Line> {
        self.grid.line(row)
    }

    /// Write a cell, clearing any wide character it partially overlaps
    pub fn put_cell(&mut self, row: usize, col: usize, cell: Cell) {
        let cols = self.cols();
        let Some(line) = self.grid.line_mut(row) else {
            return;
        };
        let Some(old) = line.cell(col).copied() else {
            return;
        };

        if old.is_continuation() && col > 0 {
            if let Some(lead) = line.cell_mut(col - 1) {
                lead.clear();
            }
        }
        if old.width == 2 && col + 1 < cols && cell.width != 2 {
            if let Some(tail) = line.cell_mut(col + 1) {
                tail.clear();
            }
        }
        if let Some(slot) = line.cell_mut(col) {
            *slot = cell;
        }
    }

    /// Mark the cursor row as continuing onto the next one
    pub fn set_wrapped(&mut self, row: usize) {
        if let Some(line) = self.grid.line_mut(row) {
            line.set_wrapped(true);
        }
    }

    /// Move down one row, scrolling the region when on its bottom line.
    /// Returns lines evicted from the top of the screen.
    pub fn index(&mut self) -> Vec<Line> {
        if self.cursor.row == self.scroll_bottom {
            return self.scroll_up(1);
        }
        if self.cursor.row + 1 < self.rows() {
            self.cursor.row += 1;
        }
        Vec::new()
    }

    /// Move down one row, scrolling the whole screen (ignoring the scroll
    /// region) when on the last row
    pub fn index_full_screen(&mut self) -> Vec<Line> {
        let last = self.rows() - 1;
        if self.cursor.row >= last {
            return self.grid.scroll_up(0, last, 1);
        }
        self.cursor.row += 1;
        Vec::new()
    }

    /// Move up one row, scrolling the region down when on its top line
    pub fn reverse_index(&mut self) {
        if self.cursor.row == self.scroll_top {
            self.scroll_down(1);
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
        }
    }

    /// Scroll the scroll region up by n lines (content moves up).
    /// Lines leave the screen only when the region starts at row 0; those
    /// are returned oldest first.
    pub fn scroll_up(&mut self, n: usize) -> Vec<Line> {
        let evicted = self.grid.scroll_up(self.scroll_top, self.scroll_bottom, n);
        if self.scroll_top == 0 {
            evicted
        } else {
            Vec::new()
        }
    }

    /// Scroll the scroll region down by n lines (content moves down)
    pub fn scroll_down(&mut self, n: usize) {
        self.grid.scroll_down(self.scroll_top, self.scroll_bottom, n);
    }

    /// Set the scroll region (0-indexed, inclusive). Rejected unless
    /// `top < bottom` and `bottom` lies on screen.
    pub fn set_scroll_region(&mut self, top: usize, bottom: usize) -> bool {
        if top >= bottom || bottom >= self.rows() {
            return false;
        }
        self.scroll_top = top;
        self.scroll_bottom = bottom;
        true
    }

    /// Reset the scroll region to the full screen
    pub fn reset_scroll_region(&mut self) {
        self.scroll_top = 0;
        self.scroll_bottom = self.rows() - 1;
    }

    /// Erase in display (ED 0/1/2)
    pub fn erase_in_display(&mut self, mode: EraseMode) {
        let Cursor { row, col } = self.cursor;
        match mode {
            EraseMode::ToEnd => {
                if let Some(line) = self.grid.line_mut(row) {
                    line.clear_from(col);
                }
                self.grid.clear_lines(row + 1, self.rows());
            }
            EraseMode::ToStart => {
                self.grid.clear_lines(0, row);
                if let Some(line) = self.grid.line_mut(row) {
                    line.clear_to(col);
                }
            }
            EraseMode::All => self.grid.clear(),
        }
    }

    /// Erase in line (EL 0/1/2); the cursor does not move
    pub fn erase_in_line(&mut self, mode: EraseMode) {
        let Cursor { row, col } = self.cursor;
        if let Some(line) = self.grid.line_mut(row) {
            match mode {
                EraseMode::ToEnd => line.clear_from(col),
                EraseMode::ToStart => line.clear_to(col),
                EraseMode::All => line.clear(),
            }
        }
    }

    /// Erase n characters from the cursor (ECH)
    pub fn erase_chars(&mut self, n: usize) {
        let Cursor { row, col } = self.cursor;
        if let Some(line) = self.grid.line_mut(row) {
            line.erase_chars(col, n);
        }
    }

    /// Insert n blank characters at the cursor (ICH)
    pub fn insert_chars(&mut self, n: usize) {
        let Cursor { row, col } = self.cursor;
        if let Some(line) = self.grid.line_mut(row) {
            line.insert_cells(col, n);
        }
    }

    /// Delete n characters at the cursor (DCH)
    pub fn delete_chars(&mut self, n: usize) {
        let Cursor { row, col } = self.cursor;
        if let Some(line) = self.grid.line_mut(row) {
            line.delete_cells(col, n);
        }
    }

    /// Insert n blank lines at the cursor row (IL). No-op outside the
    /// scroll region.
    pub fn insert_lines(&mut self, n: usize) {
        let row = self.cursor.row;
        if self.in_scroll_region(row) {
            self.grid.insert_lines(row, self.scroll_bottom, n);
        }
    }

    /// Delete n lines at the cursor row (DL). No-op outside the scroll
    /// region.
    pub fn delete_lines(&mut self, n: usize) {
        let row = self.cursor.row;
        if self.in_scroll_region(row) {
            self.grid.delete_lines(row, self.scroll_bottom, n);
        }
    }

    /// Save the cursor position and attributes
    pub fn save_cursor(&mut self, attrs: Attributes) {
        self.saved = SavedCursor {
            cursor: self.cursor,
            attrs,
        };
    }

    /// Restore the saved cursor position, clamped to the current size, and
    /// return the saved attributes
    pub fn restore_cursor(&mut self) -> Attributes {
        let SavedCursor { cursor, attrs } = self.saved;
        let (rows, cols) = (self.rows(), self.cols());
        self.cursor.move_to(cursor.row, cursor.col, rows, cols);
        attrs
    }

    /// Forget the saved cursor
    pub fn clear_saved_cursor(&mut self) {
        self.saved = SavedCursor::default();
    }

    /// Clear the grid and return the buffer to its initial state
    pub fn reset(&mut self) {
        self.grid.clear();
        self.cursor = Cursor::new();
        self.reset_scroll_region();
        self.saved = SavedCursor::default();
    }

    /// Resize, keeping the overlapping top-left content. The scroll region
    /// is reset and the cursor clamped. Unchanged dimensions are a no-op.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        assert!(cols > 0 && rows > 0, "screen dimensions must be non-zero");
        if cols == self.cols() && rows == self.rows() {
            return;
        }

        self.grid.resize(cols, rows);
        self.reset_scroll_region();
        let Cursor { row, col } = self.cursor;
        self.cursor.move_to(row, col, rows, cols);
    }

    /// Visible rows joined by line breaks, characters only
    pub fn render_to_string(&self) -> String {
        self.grid
            .lines()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
