//! Terminal line representation
//!
//! A line represents a row of cells in the terminal grid, with metadata
//! about wrapping behavior. Lines evicted into scrollback are stored as-is.

use serde::{Deserialize, Serialize};

use super::cell::Cell;

/// A row of cells in the terminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// The cells in this line
    cells: Vec<Cell>,
    /// True if the previous line overflowed and continued onto this one
    wrapped: bool,
}

impl Line {
    /// Create a blank line with the specified number of columns
    pub fn new(cols: usize) -> Self {
        Self {
            cells: vec![Cell::default(); cols],
            wrapped: false,
        }
    }

    /// Get the number of columns in this line
    pub fn cols(&self) -> usize {
        self.cells.len()
    }

    /// Get a reference to a cell at the given column
    pub fn cell(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    /// Get a mutable reference to a cell at the given column
    pub fn cell_mut(&mut self, col: usize) -> Option<&mut Cell> {
        self.cells.get_mut(col)
    }

    /// Get all cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Check if this line is wrapped from the previous line
    pub fn is_wrapped(&self) -> bool {
        self.wrapped
    }

    /// Set the wrapped flag
    pub fn set_wrapped(&mut self, wrapped: bool) {
        self.wrapped = wrapped;
    }

    /// Resize the line; new cells are blank, extra cells are truncated.
    /// A wide character cut by the new width is blanked.
    pub fn resize(&mut self, cols: usize) {
        self.split_wide_at(cols);
        self.cells.resize(cols, Cell::default());
    }

    /// Clear all cells in the line
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
        self.wrapped = false;
    }

    /// Clear cells from the given column to the end of the line
    pub fn clear_from(&mut self, col: usize) {
        let col = col.min(self.cells.len());
        self.split_wide_at(col);
        self.cells[col..].fill(Cell::default());
    }

    /// Clear cells from the start of the line to the given column (inclusive)
    pub fn clear_to(&mut self, col: usize) {
        let end = col.saturating_add(1).min(self.cells.len());
        self.split_wide_at(end);
        self.cells[..end].fill(Cell::default());
    }

    /// Insert blank cells at the given column, shifting existing cells right.
    /// Cells pushed past the end are lost.
    pub fn insert_cells(&mut self, col: usize, count: usize) {
        let len = self.cells.len();
        if col >= len {
            return;
        }
        let count = count.min(len - col);
        self.split_wide_at(col);
        self.split_wide_at(len - count);
        self.cells[col..].rotate_right(count);
        self.cells[col..col + count].fill(Cell::default());
    }

    /// Delete cells at the given column, shifting remaining cells left.
    /// Vacated cells at the end are blank.
    pub fn delete_cells(&mut self, col: usize, count: usize) {
        let len = self.cells.len();
        if col >= len {
            return;
        }
        let count = count.min(len - col);
        self.split_wide_at(col);
        self.split_wide_at(col + count);
        self.cells[col..].rotate_left(count);
        self.cells[len - count..].fill(Cell::default());
    }

    /// Erase `count` characters starting at the given column
    pub fn erase_chars(&mut self, col: usize, count: usize) {
        let len = self.cells.len();
        let start = col.min(len);
        let end = col.saturating_add(count).min(len);
        self.split_wide_at(start);
        self.split_wide_at(end);
        self.cells[start..end].fill(Cell::default());
    }

    /// Blank a wide character whose two halves sit on either side of the
    /// boundary before `col`, so an edit there never leaves half of it
    fn split_wide_at(&mut self, col: usize) {
        if !self.cells.get(col).is_some_and(Cell::is_continuation) {
            return;
        }
        self.cells[col].clear();
        if let Some(lead) = col.checked_sub(1).and_then(|c| self.cells.get_mut(c)) {
            lead.clear();
        }
    }

    /// Full-width text content, one character per cell.
    /// Continuation cells of wide characters are skipped.
    pub fn text(&self) -> String {
        self.cells
            .iter()
            .filter(|c| !c.is_continuation())
            .map(|c| c.ch)
            .collect()
    }

    /// Text content with trailing blanks trimmed
    pub fn trimmed_text(&self) -> String {
        self.text().trim_end().to_string()
    }

    /// Check if every cell is blank
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_blank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Attributes;

    fn alphabet_line() -> Line {
        let mut line = Line::new(10);
        for i in 0..10 {
            line.cell_mut(i).unwrap().ch = (b'A' + i as u8) as char;
        }
        line
    }

    #[test]
    fn test_line_new() {
        let line = Line::new(80);
        assert_eq!(line.cols(), 80);
        assert!(!line.is_wrapped());
        assert!(line.is_blank());
        assert_eq!(line.text().len(), 80);
    }

    #[test]
    fn test_line_resize() {
        let mut line = Line::new(10);
        line.cell_mut(5).unwrap().ch = 'A';

        line.resize(20);
        assert_eq!(line.cols(), 20);
        assert_eq!(line.cell(5).unwrap().ch, 'A');
        assert!(line.cell(15).unwrap().is_blank());

        line.resize(5);
        assert_eq!(line.cols(), 5);
        assert!(line.cell(5).is_none());
    }

    #[test]
    fn test_line_clear_from_and_to() {
        let mut line = alphabet_line();
        line.clear_from(5);
        assert_eq!(line.text(), "ABCDE     ");

        let mut line = alphabet_line();
        line.clear_to(4);
        assert_eq!(line.text(), "     FGHIJ");

        // Out of range columns are clamped
        let mut line = alphabet_line();
        line.clear_to(50);
        assert!(line.is_blank());
    }

    #[test]
    fn test_line_insert_cells() {
        let mut line = alphabet_line();
        line.insert_cells(2, 3);
        assert_eq!(line.text(), "AB   CDEFG");

        let mut line = alphabet_line();
        line.insert_cells(8, 100);
        assert_eq!(line.text(), "ABCDEFGH  ");
    }

    #[test]
    fn test_line_delete_cells() {
        let mut line = alphabet_line();
        line.delete_cells(2, 3);
        assert_eq!(line.text(), "ABFGHIJ   ");

        let mut line = alphabet_line();
        line.delete_cells(9, 5);
        assert_eq!(line.text(), "ABCDEFGHI ");
    }

    #[test]
    fn test_line_erase_chars() {
        let mut line = alphabet_line();
        line.erase_chars(3, 2);
        assert_eq!(line.text(), "ABC  FGHIJ");

        line.erase_chars(8, usize::MAX);
        assert_eq!(line.trimmed_text(), "ABC  FGH");
    }

    /// "A日B" followed by blanks on 6 columns
    fn wide_line() -> Line {
        let mut line = Line::new(6);
        *line.cell_mut(0).unwrap() = Cell::new('A');
        *line.cell_mut(1).unwrap() = Cell::wide('日', Attributes::DEFAULT);
        *line.cell_mut(2).unwrap() = Cell::continuation(Attributes::DEFAULT);
        *line.cell_mut(3).unwrap() = Cell::new('B');
        line
    }

    fn assert_pairs_intact(line: &Line) {
        for (col, cell) in line.cells().iter().enumerate() {
            if cell.is_continuation() {
                assert!(col > 0, "continuation in column 0");
                assert_eq!(line.cell(col - 1).unwrap().width, 2, "orphan at {}", col);
            }
            if cell.width == 2 {
                assert!(
                    line.cell(col + 1).is_some_and(Cell::is_continuation),
                    "lead without continuation at {}",
                    col
                );
            }
        }
        // Every column renders as exactly one character or one wide half
        let continuations = line.cells().iter().filter(|c| c.is_continuation()).count();
        assert_eq!(line.text().chars().count() + continuations, line.cols());
    }

    #[test]
    fn test_wide_char_delete_at_lead() {
        let mut line = wide_line();
        line.delete_cells(1, 1);
        assert_pairs_intact(&line);
        assert_eq!(line.text(), "A B   ");
    }

    #[test]
    fn test_wide_char_insert_inside() {
        let mut line = wide_line();
        line.insert_cells(2, 1);
        assert_pairs_intact(&line);
        assert_eq!(line.text(), "A   B ");
    }

    #[test]
    fn test_wide_char_insert_before_keeps_pair() {
        let mut line = wide_line();
        line.insert_cells(0, 1);
        assert_pairs_intact(&line);
        assert_eq!(line.text(), " A日B ");
    }

    #[test]
    fn test_wide_char_pushed_off_the_end() {
        let mut line = wide_line();
        line.insert_cells(0, 4);
        assert_pairs_intact(&line);
        assert_eq!(line.text(), "    A ");
    }

    #[test]
    fn test_wide_char_erase_and_clear() {
        let mut line = wide_line();
        line.erase_chars(2, 1);
        assert_pairs_intact(&line);
        assert_eq!(line.text(), "A  B  ");

        let mut line = wide_line();
        line.clear_from(2);
        assert_pairs_intact(&line);
        assert_eq!(line.text(), "A     ");

        let mut line = wide_line();
        line.clear_to(1);
        assert_pairs_intact(&line);
        assert_eq!(line.text(), "   B  ");
    }

    #[test]
    fn test_wide_char_cut_by_resize() {
        let mut line = wide_line();
        line.resize(2);
        assert_pairs_intact(&line);
        assert_eq!(line.text(), "A ");
    }
}
