//! Scrollback buffer implementation
//!
//! The scrollback buffer stores lines that have scrolled off the top of the
//! primary screen. It's a ring buffer with a configurable maximum size; the
//! oldest line is evicted when a push would exceed it.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::line::Line;

/// Default maximum scrollback lines
pub const DEFAULT_SCROLLBACK_SIZE: usize = 10_000;

/// Capped history of evicted lines, oldest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scrollback {
    lines: VecDeque<Line>,
    capacity: usize,
}

impl Default for Scrollback {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLLBACK_SIZE)
    }
}

impl Scrollback {
    /// Create a new scrollback buffer with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            // Don't pre-allocate too much
            lines: VecDeque::with_capacity(capacity.min(1000)),
            capacity,
        }
    }

    /// Get the number of lines in the scrollback
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the scrollback is empty
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the maximum capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Push a line, evicting the oldest one when full
    pub fn push(&mut self, line: Line) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Push several lines, oldest first
    pub fn extend(&mut self, lines: impl IntoIterator<Item = Line>) {
        for line in lines {
            self.push(line);
        }
    }

    /// Get a line by index (0 = oldest line in scrollback)
    pub fn get(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// Get a line by index from the end (0 = most recent line)
    pub fn get_from_end(&self, index: usize) -> Option<&Line> {
        let idx = self.lines.len().checked_sub(index + 1)?;
        self.lines.get(idx)
    }

    /// Clear all lines from the scrollback
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Iterate over all lines from oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Line> + ExactSizeIterator {
        self.lines.iter()
    }

    /// Set a new capacity, dropping the oldest lines if shrinking
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        let excess = self.lines.len().saturating_sub(capacity);
        self.lines.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_line(ch: char) -> Line {
        let mut line = Line::new(4);
        line.cell_mut(0).unwrap().ch = ch;
        line
    }

    fn first_chars(sb: &Scrollback) -> String {
        sb.iter().map(|l| l.cell(0).unwrap().ch).collect()
    }

    #[test]
    fn test_scrollback_push_and_get() {
        let mut sb = Scrollback::new(10);
        sb.push(make_line('a'));
        sb.push(make_line('b'));

        assert_eq!(sb.len(), 2);
        assert_eq!(sb.get(0).unwrap().cell(0).unwrap().ch, 'a');
        assert_eq!(sb.get_from_end(0).unwrap().cell(0).unwrap().ch, 'b');
        assert!(sb.get(2).is_none());
        assert!(sb.get_from_end(2).is_none());
    }

    #[test]
    fn test_scrollback_evicts_oldest() {
        let mut sb = Scrollback::new(3);
        sb.extend("abcde".chars().map(make_line));

        assert_eq!(sb.len(), 3);
        assert_eq!(first_chars(&sb), "cde");
    }

    #[test]
    fn test_zero_capacity() {
        let mut sb = Scrollback::new(0);
        sb.push(make_line('a'));
        assert!(sb.is_empty());
    }

    #[test]
    fn test_set_capacity_shrinks() {
        let mut sb = Scrollback::new(10);
        sb.extend("abcdef".chars().map(make_line));
        sb.set_capacity(2);

        assert_eq!(sb.capacity(), 2);
        assert_eq!(first_chars(&sb), "ef");

        sb.push(make_line('g'));
        assert_eq!(first_chars(&sb), "fg");
    }

    #[test]
    fn test_clear() {
        let mut sb = Scrollback::new(10);
        sb.push(make_line('a'));
        sb.clear();
        assert!(sb.is_empty());
        assert_eq!(sb.capacity(), 10);
    }
}
