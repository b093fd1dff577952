//! Terminal Emulator
//!
//! Ties together the scanner, the interpreter and the screen buffers.
//! [`Terminal::feed`] is the only mutation entry point for terminal
//! output; everything else is read-only state for a renderer.

use crate::config::TerminalConfig;
use crate::core::{
    Attributes, Cell, Grid, Line, Modes, Screen, Scrollback, Snapshot, DEFAULT_SCROLLBACK_SIZE,
};
use crate::error::TerminalError;
use crate::interpreter::Effect;
use crate::parser::{Scanner, Utf8Decoder};

/// Validated terminal dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    cols: usize,
    rows: usize,
}

impl Geometry {
    /// Both dimensions must be at least 1
    pub fn new(cols: usize, rows: usize) -> Result<Self, TerminalError> {
        if cols == 0 || rows == 0 {
            return Err(TerminalError::InvalidGeometry { cols, rows });
        }
        Ok(Self { cols, rows })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
}

/// Receives change notifications from a [`Terminal`]
pub trait TerminalListener: Send {
    /// Called once after a `feed` call that changed terminal state
    fn on_change(&mut self) {}

    /// Called once per BEL character
    fn on_bell(&mut self) {}
}

/// What a single `feed` call did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedOutcome {
    /// Whether any visible state (cells, cursor, modes) changed
    pub changed: bool,
    /// Number of BEL characters seen
    pub bells: usize,
}

/// The terminal emulator
pub struct Terminal {
    /// Primary screen buffer
    pub(crate) primary: Screen,
    /// Alternate screen buffer, present only while it is active
    pub(crate) alternate: Option<Screen>,
    /// Rows scrolled off the top of the primary buffer
    pub(crate) scrollback: Scrollback,
    /// Attributes applied to newly written characters
    pub(crate) attrs: Attributes,
    /// Mode flags
    pub(crate) modes: Modes,
    scanner: Scanner,
    decoder: Utf8Decoder,
    pub(crate) listener: Option<Box<dyn TerminalListener>>,
    dirty: bool,
}

impl Terminal {
    /// Create a new terminal with the given dimensions.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero. Use [`Terminal::try_new`] to get
    /// an error instead.
    pub fn new(cols: usize, rows: usize) -> Self {
        match Self::try_new(cols, rows) {
            Ok(terminal) => terminal,
            Err(err) => panic!("{}", err),
        }
    }

    /// Create a new terminal, rejecting zero dimensions
    pub fn try_new(cols: usize, rows: usize) -> Result<Self, TerminalError> {
        let geometry = Geometry::new(cols, rows)?;
        Ok(Self::build(geometry, DEFAULT_SCROLLBACK_SIZE))
    }

    /// Create a terminal from configuration
    pub fn with_config(config: &TerminalConfig) -> Result<Self, TerminalError> {
        let geometry = config.validate()?;
        Ok(Self::build(geometry, config.scrollback_lines))
    }

    fn build(geometry: Geometry, scrollback_lines: usize) -> Self {
        Self {
            primary: Screen::new(geometry.cols, geometry.rows),
            alternate: None,
            scrollback: Scrollback::new(scrollback_lines),
            attrs: Attributes::DEFAULT,
            modes: Modes::new(),
            scanner: Scanner::new(),
            decoder: Utf8Decoder::new(),
            listener: None,
            dirty: false,
        }
    }

    /// Process terminal output text
    pub fn feed(&mut self, text: &str) -> FeedOutcome {
        let mut outcome = FeedOutcome::default();
        let mut scanner = std::mem::take(&mut self.scanner);

        scanner.feed_with(text, |event| match self.interpret(event) {
            Effect::None => {}
            Effect::Changed => outcome.changed = true,
            Effect::Bell => outcome.bells += 1,
        });
        self.scanner = scanner;

        if outcome.changed {
            self.dirty = true;
            if let Some(listener) = self.listener.as_mut() {
                listener.on_change();
            }
        }
        outcome
    }

    /// Process raw terminal output bytes. UTF-8 sequences may be split
    /// across calls; invalid sequences become U+FFFD.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> FeedOutcome {
        let mut text = String::with_capacity(bytes.len());
        self.decoder.decode(bytes, &mut text);
        self.feed(&text)
    }

    /// The active screen buffer
    pub fn screen(&self) -> &Screen {
        self.alternate.as_ref().unwrap_or(&self.primary)
    }

    pub(crate) fn screen_mut(&mut self) -> &mut Screen {
        match self.alternate.as_mut() {
            Some(alternate) => alternate,
            None => &mut self.primary,
        }
    }

    /// Styled cells of the active buffer, for painting
    pub fn grid(&self) -> &Grid {
        self.screen().grid()
    }

    /// Get a cell of the active buffer
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.screen().cell(row, col)
    }

    /// Active buffer rows joined by line breaks, characters only
    pub fn render_screen_to_string(&self) -> String {
        self.screen().render_to_string()
    }

    /// Cursor column (0-based). May equal `cols()` while a wrap is pending.
    pub fn cursor_x(&self) -> usize {
        self.screen().cursor().col
    }

    /// Cursor row (0-based)
    pub fn cursor_y(&self) -> usize {
        self.screen().cursor().row
    }

    pub fn is_cursor_visible(&self) -> bool {
        self.modes.cursor_visible
    }

    /// Attributes applied to the next printed character
    pub fn attributes(&self) -> Attributes {
        self.attrs
    }

    pub fn modes(&self) -> &Modes {
        &self.modes
    }

    pub fn is_alternate_screen(&self) -> bool {
        self.alternate.is_some()
    }

    pub fn cols(&self) -> usize {
        self.primary.cols()
    }

    pub fn rows(&self) -> usize {
        self.primary.rows()
    }

    pub fn geometry(&self) -> Geometry {
        Geometry {
            cols: self.cols(),
            rows: self.rows(),
        }
    }

    /// Resize both screen buffers in place.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero. Use [`Terminal::try_resize`] to
    /// get an error instead.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        if let Err(err) = self.try_resize(cols, rows) {
            panic!("{}", err);
        }
    }

    /// Resize both screen buffers in place, rejecting zero dimensions.
    /// Resizing to the current dimensions is a no-op.
    pub fn try_resize(&mut self, cols: usize, rows: usize) -> Result<(), TerminalError> {
        let geometry = Geometry::new(cols, rows)?;
        if geometry == self.geometry() {
            return Ok(());
        }

        tracing::debug!(
            from_cols = self.cols(),
            from_rows = self.rows(),
            cols,
            rows,
            "resize"
        );
        self.primary.resize(cols, rows);
        if let Some(alternate) = self.alternate.as_mut() {
            alternate.resize(cols, rows);
        }
        self.dirty = true;
        Ok(())
    }

    /// Rows scrolled off the primary buffer, oldest first
    pub fn scrollback(&self) -> &Scrollback {
        &self.scrollback
    }

    /// Change the scrollback cap, dropping the oldest rows when shrinking
    pub fn set_scrollback_capacity(&mut self, capacity: usize) {
        self.scrollback.set_capacity(capacity);
    }

    /// Number of rows in the history view: scrollback followed by the
    /// screen. Scrollback is hidden while the alternate buffer is active.
    pub fn total_lines(&self) -> usize {
        self.history_len() + self.rows()
    }

    /// Row `index` of the history view (0 is the oldest scrollback row)
    pub fn line(&self, index: usize) -> Option<&Line> {
        let history = self.history_len();
        if index < history {
            self.scrollback.get(index)
        } else {
            self.screen().line(index - history)
        }
    }

    fn history_len(&self) -> usize {
        if self.is_alternate_screen() {
            0
        } else {
            self.scrollback.len()
        }
    }

    /// Capture the full emulator state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(
            self.screen(),
            &self.modes,
            self.attrs,
            self.is_alternate_screen(),
            self.scrollback.len(),
        )
    }

    /// Register a change listener, replacing any previous one
    pub fn set_listener(&mut self, listener: impl TerminalListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Remove the change listener
    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    /// Whether state changed since the last [`Terminal::mark_clean`]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::core::Color;

    #[derive(Clone, Default)]
    struct Counter {
        changes: Arc<AtomicUsize>,
        bells: Arc<AtomicUsize>,
    }

    impl TerminalListener for Counter {
        fn on_change(&mut self) {
            self.changes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_bell(&mut self) {
            self.bells.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_new_terminal() {
        let term = Terminal::new(80, 24);
        assert_eq!(term.cols(), 80);
        assert_eq!(term.rows(), 24);
        assert_eq!(term.cursor_x(), 0);
        assert_eq!(term.cursor_y(), 0);
        assert!(term.is_cursor_visible());
        assert!(!term.is_alternate_screen());
        assert!(term.attributes().is_default());
    }

    #[test]
    #[should_panic(expected = "invalid terminal geometry")]
    fn test_new_zero_cols_panics() {
        let _ = Terminal::new(0, 24);
    }

    #[test]
    fn test_try_new_rejects_zero() {
        assert_eq!(
            Terminal::try_new(80, 0).err(),
            Some(TerminalError::InvalidGeometry { cols: 80, rows: 0 })
        );
    }

    #[test]
    fn test_with_config() {
        let config = TerminalConfig {
            cols: 40,
            rows: 10,
            scrollback_lines: 5,
        };
        let term = Terminal::with_config(&config).unwrap();
        assert_eq!(term.geometry(), Geometry::new(40, 10).unwrap());
        assert_eq!(term.scrollback().capacity(), 5);
    }

    #[test]
    fn test_feed_hello_world() {
        let mut term = Terminal::new(80, 24);
        term.feed("Hello\r\nWorld");

        assert_eq!(term.cursor_y(), 1);
        assert_eq!(term.cursor_x(), 5);
        assert_eq!(term.screen().line(0).unwrap().trimmed_text(), "Hello");
        assert_eq!(term.screen().line(1).unwrap().trimmed_text(), "World");
    }

    #[test]
    fn test_feed_bytes_split_utf8() {
        let mut term = Terminal::new(10, 2);
        let bytes = "é".as_bytes();
        term.feed_bytes(&bytes[..1]);
        assert_eq!(term.cursor_x(), 0);
        term.feed_bytes(&bytes[1..]);
        assert_eq!(term.cell(0, 0).unwrap().ch, 'é');
        assert_eq!(term.cursor_x(), 1);
    }

    #[test]
    fn test_feed_bytes_invalid() {
        let mut term = Terminal::new(10, 2);
        term.feed_bytes(&[b'a', 0xFF, b'b']);
        assert_eq!(term.screen().line(0).unwrap().trimmed_text(), "a\u{FFFD}b");
    }

    #[test]
    fn test_feed_outcome() {
        let mut term = Terminal::new(10, 2);
        assert_eq!(
            term.feed("\x07\x07"),
            FeedOutcome {
                changed: false,
                bells: 2
            }
        );
        assert!(term.feed("x").changed);
        assert!(!term.feed("\x1b]0;title\x07").changed);
    }

    #[test]
    fn test_oversize_osc_payload_is_not_printed() {
        let mut term = Terminal::new(80, 24);
        term.feed("\x1b]52;c;");
        term.feed(&"A".repeat(70 * 1024));
        let outcome = term.feed("ZZZZ\x07");

        assert!(!outcome.changed);
        assert!(term.screen().line(0).unwrap().is_blank());
        assert_eq!((term.cursor_y(), term.cursor_x()), (0, 0));

        term.feed("ok");
        assert_eq!(term.screen().line(0).unwrap().trimmed_text(), "ok");
    }

    #[test]
    fn test_listener_notifications() {
        let counter = Counter::default();
        let mut term = Terminal::new(10, 2);
        term.set_listener(counter.clone());

        term.feed("abc\x07");
        term.feed("\x1b]2;t\x07");
        term.feed("\x07");

        assert_eq!(counter.changes.load(Ordering::SeqCst), 1);
        assert_eq!(counter.bells.load(Ordering::SeqCst), 2);

        term.clear_listener();
        term.feed("x");
        assert_eq!(counter.changes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dirty_tracking() {
        let mut term = Terminal::new(10, 2);
        assert!(!term.is_dirty());
        term.feed("x");
        assert!(term.is_dirty());
        term.mark_clean();
        assert!(!term.is_dirty());
        term.resize(20, 4);
        assert!(term.is_dirty());
    }

    #[test]
    fn test_resize_idempotent() {
        let mut term = Terminal::new(10, 4);
        term.feed("abc\r\ndef");
        term.resize(6, 3);
        let once = term.snapshot();
        term.resize(6, 3);
        assert_eq!(term.snapshot(), once);
    }

    #[test]
    fn test_try_resize_rejects_zero() {
        let mut term = Terminal::new(10, 4);
        assert!(term.try_resize(0, 4).is_err());
        assert_eq!(term.cols(), 10);
    }

    #[test]
    #[should_panic(expected = "invalid terminal geometry")]
    fn test_resize_zero_panics() {
        let mut term = Terminal::new(10, 4);
        term.resize(10, 0);
    }

    #[test]
    fn test_resize_alternate_screen() {
        let mut term = Terminal::new(10, 4);
        term.feed("\x1b[?1049h");
        term.resize(20, 6);
        assert_eq!(term.screen().cols(), 20);
        term.feed("\x1b[?1049l");
        assert_eq!(term.screen().cols(), 20);
        assert_eq!(term.screen().rows(), 6);
    }

    #[test]
    fn test_history_view() {
        let mut term = Terminal::new(5, 2);
        term.feed("one\r\ntwo\r\nthree");

        assert_eq!(term.scrollback().len(), 1);
        assert_eq!(term.total_lines(), 3);
        assert_eq!(term.line(0).unwrap().trimmed_text(), "one");
        assert_eq!(term.line(1).unwrap().trimmed_text(), "two");
        assert_eq!(term.line(2).unwrap().trimmed_text(), "three");
        assert!(term.line(3).is_none());

        term.feed("\x1b[?1049h");
        assert_eq!(term.total_lines(), 2);
        assert!(term.line(0).unwrap().is_blank());
    }

    #[test]
    fn test_scrollback_capacity() {
        let mut term = Terminal::new(5, 1);
        for i in 0..10 {
            term.feed(&format!("{}\n\r", i));
        }
        assert_eq!(term.scrollback().len(), 10);

        term.set_scrollback_capacity(3);
        assert_eq!(term.scrollback().len(), 3);
        assert_eq!(term.line(0).unwrap().trimmed_text(), "7");
    }

    #[test]
    fn test_snapshot_state() {
        let mut term = Terminal::new(10, 3);
        term.feed("\x1b[31mA\x1b[?25l");

        let snapshot = term.snapshot();
        assert_eq!(snapshot.grid[0][0].ch, 'A');
        assert_eq!(snapshot.grid[0][0].fg, Color::RED);
        assert!(!snapshot.cursor.visible);
        assert_eq!(snapshot.attrs.fg, Color::RED);
        assert_eq!(snapshot.to_text(), "A\n");
    }
}
