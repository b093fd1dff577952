//! Deterministic snapshot generation
//!
//! Snapshots capture the complete emulator state in a serializable format
//! for testing and debugging. Given the same byte stream, the emulator
//! must produce identical snapshots.

use serde::{Deserialize, Serialize};

use super::attributes::Attributes;
use super::cell::Cell;
use super::color::Color;
use super::modes::Modes;
use super::screen::Screen;

/// A complete snapshot of the emulator state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Screen dimensions
    pub cols: usize,
    pub rows: usize,
    /// Visible grid content of the active buffer (row-major)
    pub grid: Vec<Vec<CellSnapshot>>,
    /// Cursor state
    pub cursor: CursorSnapshot,
    /// Scroll region
    pub scroll_top: usize,
    pub scroll_bottom: usize,
    /// Terminal modes
    pub modes: ModesSnapshot,
    /// Current attributes applied to new characters
    pub attrs: Attributes,
    /// Whether the alternate buffer is active
    pub alternate_screen: bool,
    /// Scrollback line count
    pub scrollback_lines: usize,
}

/// Snapshot of a single cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub ch: char,
    #[serde(default, skip_serializing_if = "is_default_color")]
    pub fg: Color,
    #[serde(default, skip_serializing_if = "is_default_color")]
    pub bg: Color,
    pub style: StyleSnapshot,
    /// Cell width (0 for continuation, 1 normal, 2 wide)
    pub width: u8,
}

/// Snapshot of style attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StyleSnapshot {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dim: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub blink: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub inverse: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn is_default_color(c: &Color) -> bool {
    *c == Color::Default
}

/// Snapshot of cursor state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub row: usize,
    pub col: usize,
    pub visible: bool,
}

/// Snapshot of terminal modes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModesSnapshot {
    pub autowrap: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub origin: bool,
    /// Recorded modes without dedicated behavior, e.g. `"?2004": true`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other: Vec<(String, bool)>,
}

impl From<&Attributes> for StyleSnapshot {
    fn from(attrs: &Attributes) -> Self {
        StyleSnapshot {
            bold: attrs.bold,
            dim: attrs.dim,
            italic: attrs.italic,
            underline: attrs.underline,
            blink: attrs.blink,
            inverse: attrs.inverse,
            hidden: attrs.hidden,
            strikethrough: attrs.strikethrough,
        }
    }
}

impl From<&Cell> for CellSnapshot {
    fn from(cell: &Cell) -> Self {
        CellSnapshot {
            ch: cell.ch,
            fg: cell.attrs.fg,
            bg: cell.attrs.bg,
            style: StyleSnapshot::from(&cell.attrs),
            width: cell.width,
        }
    }
}

impl From<&Modes> for ModesSnapshot {
    fn from(modes: &Modes) -> Self {
        use super::modes::ModeCode;

        ModesSnapshot {
            autowrap: modes.autowrap,
            origin: modes.origin,
            other: modes
                .recorded()
                .map(|(code, enabled)| {
                    let key = match code {
                        ModeCode::Ansi(n) => n.to_string(),
                        ModeCode::Dec(n) => format!("?{}", n),
                    };
                    (key, enabled)
                })
                .collect(),
        }
    }
}

impl Snapshot {
    /// Capture the given active buffer plus emulator-level state
    pub fn capture(
        screen: &Screen,
        modes: &Modes,
        attrs: Attributes,
        alternate_screen: bool,
        scrollback_lines: usize,
    ) -> Self {
        let grid = screen
            .grid()
            .lines()
            .map(|line| line.cells().iter().map(CellSnapshot::from).collect())
            .collect();

        Snapshot {
            cols: screen.cols(),
            rows: screen.rows(),
            grid,
            cursor: CursorSnapshot {
                row: screen.cursor().row,
                col: screen.cursor().col,
                visible: modes.cursor_visible,
            },
            scroll_top: screen.scroll_top(),
            scroll_bottom: screen.scroll_bottom(),
            modes: ModesSnapshot::from(modes),
            attrs,
            alternate_screen,
            scrollback_lines,
        }
    }

    /// Convert snapshot to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse snapshot from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Plain text rendering with trailing blanks and trailing empty rows
    /// removed (for debugging)
    pub fn to_text(&self) -> String {
        let mut lines: Vec<String> = self
            .grid
            .iter()
            .map(|row| {
                row.iter()
                    .filter(|cell| cell.width != 0)
                    .map(|cell| cell.ch)
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect();

        while lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }

        let mut result = lines.join("\n");
        result.push('\n');
        result
    }

    /// Compare grid content only, ignoring cursor and modes
    pub fn content_equals(&self, other: &Snapshot) -> bool {
        self.cols == other.cols && self.rows == other.rows && self.grid == other.grid
    }
}
