//! Scanner events
//!
//! Typed tokens produced by the scanner and consumed by the interpreter.

use serde::{Deserialize, Serialize};

/// Maximum number of CSI parameters kept; extra ones are dropped
pub const MAX_CSI_PARAMS: usize = 32;

/// A token scanned from the input stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A single printable character
    Text(char),
    /// A C0 (or C1) control character
    Control(ControlChar),
    /// `ESC [ ...` control sequence
    Csi(CsiSequence),
    /// `ESC ] code ; data (BEL | ST)`
    Osc(OscCommand),
    /// `ESC` followed by one recognized character
    Escape(EscapeKind),
    /// `ESC P ... ST` payload, captured but not interpreted
    Dcs(String),
    /// Anything else; the raw text is kept for diagnostics
    Unknown(String),
}

/// Control characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlChar {
    /// BEL (0x07)
    Bell,
    /// BS (0x08)
    Backspace,
    /// HT (0x09)
    Tab,
    /// LF (0x0A)
    LineFeed,
    /// VT (0x0B)
    VerticalTab,
    /// FF (0x0C)
    FormFeed,
    /// CR (0x0D)
    CarriageReturn,
    /// DEL (0x7F)
    Delete,
    /// Any other C0 (0x00-0x1F) or C1 (0x80-0x9F) code
    Other(u8),
}

impl ControlChar {
    /// Classify a control character; `None` if `c` is not one
    pub fn from_char(c: char) -> Option<Self> {
        let code = u32::from(c);
        let ctrl = match code {
            0x07 => ControlChar::Bell,
            0x08 => ControlChar::Backspace,
            0x09 => ControlChar::Tab,
            0x0A => ControlChar::LineFeed,
            0x0B => ControlChar::VerticalTab,
            0x0C => ControlChar::FormFeed,
            0x0D => ControlChar::CarriageReturn,
            0x7F => ControlChar::Delete,
            0x00..=0x1F | 0x80..=0x9F => ControlChar::Other(code as u8),
            _ => return None,
        };
        Some(ctrl)
    }
}

/// A parsed CSI sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsiSequence {
    /// Leading parameter marker (`?`, `>`, `<` or `=`)
    pub marker: Option<char>,
    /// Parameters; an omitted parameter is stored as 0
    pub params: Vec<u16>,
    /// Intermediate characters (0x20-0x2F) before the final byte
    pub intermediates: Vec<char>,
    /// Final command character (0x40-0x7E)
    pub command: char,
}

impl CsiSequence {
    pub fn new(command: char) -> Self {
        Self {
            marker: None,
            params: Vec::new(),
            intermediates: Vec::new(),
            command,
        }
    }

    /// True for DEC private sequences (`CSI ? ...`)
    pub fn is_private(&self) -> bool {
        self.marker == Some('?')
    }

    /// Get parameter at index, or default value if not present
    pub fn param(&self, index: usize, default: u16) -> u16 {
        self.params.get(index).copied().unwrap_or(default)
    }

    /// Get parameter at index, treating 0 as default
    pub fn param_or_default(&self, index: usize, default: u16) -> u16 {
        match self.params.get(index) {
            Some(&0) | None => default,
            Some(&v) => v,
        }
    }
}

/// A parsed OSC command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OscCommand {
    /// Numeric command code (0/2 title, 4 palette, ...)
    pub code: u16,
    /// Everything after the first `;`
    pub data: String,
}

/// Recognized single-character escapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscapeKind {
    /// ESC 7 - Save cursor (DECSC)
    SaveCursor,
    /// ESC 8 - Restore cursor (DECRC)
    RestoreCursor,
    /// ESC c - Full reset (RIS)
    FullReset,
    /// ESC D - Index (IND)
    Index,
    /// ESC E - Next line (NEL)
    NextLine,
    /// ESC H - Horizontal tab set (HTS)
    TabSet,
    /// ESC M - Reverse index (RI)
    ReverseIndex,
    /// ESC Z - Identify terminal (DECID)
    Identify,
}

impl EscapeKind {
    pub fn from_char(c: char) -> Option<Self> {
        let kind = match c {
            '7' => EscapeKind::SaveCursor,
            '8' => EscapeKind::RestoreCursor,
            'c' => EscapeKind::FullReset,
            'D' => EscapeKind::Index,
            'E' => EscapeKind::NextLine,
            'H' => EscapeKind::TabSet,
            'M' => EscapeKind::ReverseIndex,
            'Z' => EscapeKind::Identify,
            _ => return None,
        };
        Some(kind)
    }
}
