//! Sequence Interpreter
//!
//! Applies scanner events to the terminal state: the active screen
//! buffer, the current attributes, the mode flags and the scrollback.
//! Malformed or unsupported sequences are logged and otherwise ignored;
//! nothing here can fail.

use unicode_width::UnicodeWidthChar;

use crate::core::{Attributes, Cell, Color, EraseMode, Line, ModeCode, NamedColor, Screen};
use crate::parser::{ControlChar, CsiSequence, EscapeKind, Event, OscCommand};
use crate::terminal::Terminal;

/// Tab stops are fixed every 8 columns
const TAB_WIDTH: usize = 8;

/// Effect of one event on the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Effect {
    /// Nothing observable changed
    None,
    /// Cells, cursor or modes changed
    Changed,
    /// A BEL was received
    Bell,
}

impl From<bool> for Effect {
    fn from(changed: bool) -> Self {
        if changed {
            Effect::Changed
        } else {
            Effect::None
        }
    }
}

impl Terminal {
    /// Apply a single scanned event
    pub(crate) fn interpret(&mut self, event: Event) -> Effect {
        match event {
            Event::Text(c) => self.print(c).into(),
            Event::Control(ctrl) => self.execute_control(ctrl),
            Event::Csi(csi) => self.execute_csi(&csi).into(),
            Event::Escape(kind) => self.execute_esc(kind).into(),
            Event::Osc(osc) => {
                self.execute_osc(&osc);
                Effect::None
            }
            Event::Dcs(payload) => {
                tracing::debug!(len = payload.len(), "DCS sequence ignored");
                Effect::None
            }
            Event::Unknown(raw) => {
                tracing::debug!(?raw, "unknown sequence ignored");
                Effect::None
            }
        }
    }

    /// Write a printable character at the cursor
    fn print(&mut self, c: char) -> bool {
        let width = match c.width() {
            Some(0) | None => {
                tracing::trace!(?c, "zero-width character dropped");
                return false;
            }
            Some(w) => w,
        };

        let attrs = self.attrs;
        let autowrap = self.modes.autowrap;
        let cols = self.screen().cols();
        // A wide character cannot fit on a single-column screen
        let width = if width > cols { 1 } else { width };

        if self.screen().cursor().col + width > cols {
            if autowrap {
                let row = self.screen().cursor().row;
                self.screen_mut().set_wrapped(row);
                self.line_feed();
                self.screen_mut().cursor_mut().carriage_return();
            } else {
                self.screen_mut().cursor_mut().col = cols - width;
            }
        }

        let screen = self.screen_mut();
        let (row, col) = (screen.cursor().row, screen.cursor().col);
        if width == 2 {
            // Continuation first so the lead is not cleared as an orphan
            screen.put_cell(row, col + 1, Cell::continuation(attrs));
            screen.put_cell(row, col, Cell::wide(c, attrs));
        } else {
            screen.put_cell(row, col, Cell::with_attrs(c, attrs));
        }

        // Without auto-wrap the cursor sticks to the last column
        let next = col + width;
        screen.cursor_mut().col = if autowrap { next } else { next.min(cols - 1) };
        true
    }

    /// Execute a control character
    fn execute_control(&mut self, ctrl: ControlChar) -> Effect {
        match ctrl {
            ControlChar::Bell => {
                tracing::trace!("bell");
                if let Some(listener) = self.listener.as_mut() {
                    listener.on_bell();
                }
                return Effect::Bell;
            }
            ControlChar::Backspace => {
                let screen = self.screen_mut();
                let cols = screen.cols();
                let cursor = screen.cursor_mut();
                cursor.col = cursor.col.min(cols).saturating_sub(1);
            }
            ControlChar::Tab => {
                let screen = self.screen_mut();
                let cols = screen.cols();
                let cursor = screen.cursor_mut();
                cursor.col = ((cursor.col / TAB_WIDTH + 1) * TAB_WIDTH).min(cols - 1);
            }
            ControlChar::LineFeed => self.line_feed(),
            ControlChar::VerticalTab | ControlChar::FormFeed => {
                // These scroll the whole screen, ignoring the scroll region
                let evicted = self.screen_mut().index_full_screen();
                self.push_scrollback(evicted);
            }
            ControlChar::CarriageReturn => self.screen_mut().cursor_mut().carriage_return(),
            ControlChar::Delete => {
                let screen = self.screen_mut();
                let row = screen.cursor().row;
                let col = screen.cursor().col.min(screen.cols() - 1);
                screen.put_cell(row, col, Cell::default());
            }
            ControlChar::Other(code) => {
                tracing::debug!(code, "control character ignored");
                return Effect::None;
            }
        }
        Effect::Changed
    }

    /// Move down one row, scrolling the region at its bottom margin
    fn line_feed(&mut self) {
        let evicted = self.screen_mut().index();
        self.push_scrollback(evicted);
    }

    /// Store rows scrolled off the top. Only the primary buffer has history.
    fn push_scrollback(&mut self, evicted: Vec<Line>) {
        if !evicted.is_empty() && !self.is_alternate_screen() {
            self.scrollback.extend(evicted);
        }
    }

    /// Execute a CSI sequence
    fn execute_csi(&mut self, csi: &CsiSequence) -> bool {
        if csi.is_private() {
            return self.execute_csi_private(csi);
        }
        if csi.marker.is_some() {
            tracing::debug!(?csi, "unhandled CSI with marker");
            return false;
        }
        if !csi.intermediates.is_empty() {
            return match (csi.intermediates.as_slice(), csi.command) {
                // DECSTR - Soft Terminal Reset
                (['!'], 'p') => {
                    self.soft_reset();
                    true
                }
                _ => {
                    tracing::debug!(?csi, "unhandled CSI with intermediates");
                    false
                }
            };
        }

        let n = csi.param_or_default(0, 1) as usize;
        match csi.command {
            // Cursor movement
            'A' => {
                // CUU - Cursor Up
                let screen = self.screen_mut();
                let row = screen.cursor().row;
                let top = if row >= screen.scroll_top() { screen.scroll_top() } else { 0 };
                clear_pending_wrap(screen);
                screen.cursor_mut().move_up(n, top);
            }
            'B' | 'e' => {
                // CUD - Cursor Down, VPR - Vertical Position Relative
                self.cursor_down(n);
            }
            'C' | 'a' => {
                // CUF - Cursor Forward, HPR - Horizontal Position Relative
                let screen = self.screen_mut();
                let cols = screen.cols();
                clear_pending_wrap(screen);
                screen.cursor_mut().move_right(n, cols);
            }
            'D' => {
                // CUB - Cursor Backward
                let screen = self.screen_mut();
                clear_pending_wrap(screen);
                screen.cursor_mut().move_left(n);
            }
            'E' => {
                // CNL - Cursor Next Line
                self.cursor_down(n);
                self.screen_mut().cursor_mut().carriage_return();
            }
            'F' => {
                // CPL - Cursor Previous Line
                let screen = self.screen_mut();
                let row = screen.cursor().row;
                let top = if row >= screen.scroll_top() { screen.scroll_top() } else { 0 };
                screen.cursor_mut().move_up(n, top);
                screen.cursor_mut().carriage_return();
            }
            'G' | '`' => {
                // CHA - Cursor Character Absolute, HPA
                let screen = self.screen_mut();
                let cols = screen.cols();
                screen.cursor_mut().col = (n - 1).min(cols - 1);
            }
            'H' | 'f' => {
                // CUP - Cursor Position, HVP
                let row = csi.param_or_default(0, 1) as usize - 1;
                let col = csi.param_or_default(1, 1) as usize - 1;
                self.move_cursor_to(row, col);
            }
            'd' => {
                // VPA - Vertical Position Absolute
                let screen = self.screen_mut();
                let rows = screen.rows();
                clear_pending_wrap(screen);
                screen.cursor_mut().row = (n - 1).min(rows - 1);
            }

            // Erase operations
            'J' => {
                // ED - Erase in Display
                match csi.param(0, 0) {
                    0 => self.screen_mut().erase_in_display(EraseMode::ToEnd),
                    1 => self.screen_mut().erase_in_display(EraseMode::ToStart),
                    2 => self.screen_mut().erase_in_display(EraseMode::All),
                    3 => {
                        self.screen_mut().erase_in_display(EraseMode::All);
                        self.scrollback.clear();
                    }
                    mode => {
                        tracing::debug!(mode, "unknown ED mode");
                        return false;
                    }
                }
            }
            'K' => {
                // EL - Erase in Line
                let mode = match csi.param(0, 0) {
                    0 => EraseMode::ToEnd,
                    1 => EraseMode::ToStart,
                    2 => EraseMode::All,
                    mode => {
                        tracing::debug!(mode, "unknown EL mode");
                        return false;
                    }
                };
                self.screen_mut().erase_in_line(mode);
            }
            'X' => {
                // ECH - Erase Characters
                self.screen_mut().erase_chars(n);
            }

            // Insert/Delete
            'L' => {
                // IL - Insert Lines
                self.screen_mut().insert_lines(n);
            }
            'M' => {
                // DL - Delete Lines
                self.screen_mut().delete_lines(n);
            }
            '@' => {
                // ICH - Insert Characters
                self.screen_mut().insert_chars(n);
            }
            'P' => {
                // DCH - Delete Characters
                self.screen_mut().delete_chars(n);
            }

            // Scroll
            'S' => {
                // SU - Scroll Up
                let evicted = self.screen_mut().scroll_up(n);
                self.push_scrollback(evicted);
            }
            'T' => {
                // SD - Scroll Down
                self.screen_mut().scroll_down(n);
            }

            // Scroll region
            'r' => {
                // DECSTBM - Set Top and Bottom Margins
                let rows = self.screen().rows();
                let top = csi.param_or_default(0, 1) as usize - 1;
                let default_bottom = u16::try_from(rows).unwrap_or(u16::MAX);
                let bottom = (csi.param_or_default(1, default_bottom) as usize).min(rows) - 1;
                if !self.screen_mut().set_scroll_region(top, bottom) {
                    tracing::debug!(top, bottom, "scroll region rejected");
                    return false;
                }
                self.home_cursor();
            }

            // SGR - Select Graphic Rendition
            'm' => {
                self.execute_sgr(&csi.params);
            }

            // Cursor save/restore (ANSI.SYS), same slot as DECSC/DECRC.
            // Saving changes nothing visible.
            's' => {
                let attrs = self.attrs;
                self.screen_mut().save_cursor(attrs);
                return false;
            }
            'u' => {
                self.attrs = self.screen_mut().restore_cursor();
            }

            // Mode set/reset
            'h' => return self.set_ansi_modes(&csi.params, true),
            'l' => return self.set_ansi_modes(&csi.params, false),

            _ => {
                tracing::debug!(
                    params = ?csi.params,
                    command = %csi.command,
                    "unhandled CSI"
                );
                return false;
            }
        }
        true
    }

    /// Execute a private CSI sequence (starts with ?)
    fn execute_csi_private(&mut self, csi: &CsiSequence) -> bool {
        let enable = match csi.command {
            'h' => true,
            'l' => false,
            _ => {
                tracing::debug!(
                    params = ?csi.params,
                    command = %csi.command,
                    "unhandled private CSI"
                );
                return false;
            }
        };
        for &mode in &csi.params {
            self.set_dec_mode(mode, enable);
        }
        !csi.params.is_empty()
    }

    /// Set or reset a DEC private mode
    fn set_dec_mode(&mut self, mode: u16, enable: bool) {
        match mode {
            6 => {
                // DECOM - Origin Mode
                self.modes.origin = enable;
                self.home_cursor();
            }
            7 => {
                // DECAWM - Autowrap Mode
                self.modes.autowrap = enable;
                if !enable {
                    clear_pending_wrap(self.screen_mut());
                }
            }
            25 => {
                // DECTCEM - Text Cursor Enable Mode
                self.modes.cursor_visible = enable;
            }
            1049 => {
                // Alternate screen buffer
                if enable {
                    self.enter_alternate_screen();
                } else {
                    self.exit_alternate_screen();
                }
            }
            _ => {
                tracing::debug!(mode, enable, "DEC mode recorded");
                self.modes.record(ModeCode::Dec(mode), enable);
            }
        }
    }

    /// Set or reset ANSI modes. None has dedicated behavior.
    fn set_ansi_modes(&mut self, params: &[u16], enable: bool) -> bool {
        for &mode in params {
            tracing::debug!(mode, enable, "ANSI mode recorded");
            self.modes.record(ModeCode::Ansi(mode), enable);
        }
        !params.is_empty()
    }

    /// Switch to a fresh alternate buffer. Re-entering starts blank again.
    fn enter_alternate_screen(&mut self) {
        let (cols, rows) = (self.primary.cols(), self.primary.rows());
        self.alternate = Some(Screen::new(cols, rows));
    }

    /// Switch back to the primary buffer, discarding the alternate one
    fn exit_alternate_screen(&mut self) {
        self.alternate = None;
    }

    /// Move the cursor to an absolute position. In origin mode the row is
    /// relative to the scroll region and confined to it.
    fn move_cursor_to(&mut self, row: usize, col: usize) {
        let origin = self.modes.origin;
        let screen = self.screen_mut();
        let (rows, cols) = (screen.rows(), screen.cols());
        let (top, bottom) = (screen.scroll_top(), screen.scroll_bottom());

        let row = if origin {
            top.saturating_add(row).min(bottom)
        } else {
            row
        };
        screen.cursor_mut().move_to(row, col, rows, cols);
    }

    /// Home the cursor: (0,0), or the top of the scroll region in origin mode
    fn home_cursor(&mut self) {
        self.move_cursor_to(0, 0);
    }

    /// Move down n rows, stopping at the scroll region bottom when the
    /// cursor starts above it
    fn cursor_down(&mut self, n: usize) {
        let screen = self.screen_mut();
        let row = screen.cursor().row;
        let bottom = if row <= screen.scroll_bottom() {
            screen.scroll_bottom()
        } else {
            screen.rows() - 1
        };
        clear_pending_wrap(screen);
        screen.cursor_mut().move_down(n, bottom);
    }

    /// Execute SGR (Select Graphic Rendition)
    fn execute_sgr(&mut self, params: &[u16]) {
        // CSI m is CSI 0 m
        if params.is_empty() {
            self.attrs = Attributes::DEFAULT;
            return;
        }

        let mut attrs = self.attrs;
        let mut i = 0;
        while i < params.len() {
            let code = params[i];
            i += 1;
            attrs = match code {
                0 => attrs.reset(),
                1 => attrs.with_bold(true),
                2 => attrs.with_dim(true),
                3 => attrs.with_italic(true),
                4 => attrs.with_underline(true),
                5 | 6 => attrs.with_blink(true),
                7 => attrs.with_inverse(true),
                8 => attrs.with_hidden(true),
                9 => attrs.with_strikethrough(true),
                21 | 22 => attrs.with_bold(false).with_dim(false),
                23 => attrs.with_italic(false),
                24 => attrs.with_underline(false),
                25 => attrs.with_blink(false),
                27 => attrs.with_inverse(false),
                28 => attrs.with_hidden(false),
                29 => attrs.with_strikethrough(false),
                30..=37 => attrs.with_fg(named(code - 30)),
                38 => {
                    let (color, used) = extended_color(&params[i..]);
                    i += used;
                    match color {
                        Some(color) => attrs.with_fg(color),
                        None => attrs,
                    }
                }
                39 => attrs.with_fg(Color::Default),
                40..=47 => attrs.with_bg(named(code - 40)),
                48 => {
                    let (color, used) = extended_color(&params[i..]);
                    i += used;
                    match color {
                        Some(color) => attrs.with_bg(color),
                        None => attrs,
                    }
                }
                49 => attrs.with_bg(Color::Default),
                90..=97 => attrs.with_fg(named(code - 90 + 8)),
                100..=107 => attrs.with_bg(named(code - 100 + 8)),
                _ => {
                    tracing::debug!(code, "unknown SGR code ignored");
                    attrs
                }
            };
        }
        self.attrs = attrs;
    }

    /// Execute an escape sequence
    fn execute_esc(&mut self, kind: EscapeKind) -> bool {
        match kind {
            EscapeKind::SaveCursor => {
                // DECSC
                let attrs = self.attrs;
                self.screen_mut().save_cursor(attrs);
                return false;
            }
            EscapeKind::RestoreCursor => {
                // DECRC
                self.attrs = self.screen_mut().restore_cursor();
            }
            EscapeKind::FullReset => {
                // RIS
                self.full_reset();
            }
            EscapeKind::Index => {
                // IND
                self.line_feed();
            }
            EscapeKind::NextLine => {
                // NEL
                self.line_feed();
                self.screen_mut().cursor_mut().carriage_return();
            }
            EscapeKind::ReverseIndex => {
                // RI
                self.screen_mut().reverse_index();
            }
            EscapeKind::TabSet | EscapeKind::Identify => {
                tracing::debug!(?kind, "escape accepted without effect");
                return false;
            }
        }
        true
    }

    /// OSC commands are recognized but have no effect on terminal state
    fn execute_osc(&mut self, osc: &OscCommand) {
        match osc.code {
            0 | 1 | 2 => tracing::debug!(code = osc.code, title = %osc.data, "title ignored"),
            4 | 10 | 11 | 104 => {
                tracing::debug!(code = osc.code, len = osc.data.len(), "palette command ignored")
            }
            code => tracing::debug!(code, len = osc.data.len(), "unhandled OSC"),
        }
    }

    /// Full reset (RIS). Scrollback is kept.
    fn full_reset(&mut self) {
        self.alternate = None;
        self.primary.reset();
        self.attrs = Attributes::DEFAULT;
        self.modes.reset();
    }

    /// Soft terminal reset (DECSTR). Screen content is kept.
    fn soft_reset(&mut self) {
        self.attrs = Attributes::DEFAULT;
        self.modes.origin = false;
        self.modes.autowrap = true;
        self.modes.cursor_visible = true;
        let screen = self.screen_mut();
        screen.reset_scroll_region();
        screen.clear_saved_cursor();
    }
}

/// Any cursor movement cancels a pending wrap
fn clear_pending_wrap(screen: &mut Screen) {
    let cols = screen.cols();
    let cursor = screen.cursor_mut();
    if cursor.is_pending_wrap(cols) {
        cursor.col = cols - 1;
    }
}

fn named(index: u16) -> Color {
    match u8::try_from(index).ok().and_then(NamedColor::from_index) {
        Some(color) => Color::Named(color),
        None => Color::Default,
    }
}

/// Parse the arguments of SGR 38/48: `5;index` or `2;r;g;b`.
///
/// Returns the color, if complete and in range, and the number of
/// parameters consumed.
fn extended_color(args: &[u16]) -> (Option<Color>, usize) {
    match args.first().copied() {
        Some(5) => match args.get(1) {
            Some(&index) => (u8::try_from(index).ok().map(Color::Indexed), 2),
            None => (None, 1),
        },
        Some(2) => match args.get(1..4) {
            Some(&[r, g, b]) => {
                let rgb = (u8::try_from(r), u8::try_from(g), u8::try_from(b));
                match rgb {
                    (Ok(r), Ok(g), Ok(b)) => (Some(Color::Rgb(r, g, b)), 4),
                    _ => (None, 4),
                }
            }
            _ => (None, args.len()),
        },
        Some(kind) => {
            tracing::debug!(kind, "unknown extended color kind");
            (None, 1)
        }
        None => (None, 0),
    }
}
