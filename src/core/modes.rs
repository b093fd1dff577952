//! Terminal mode flags
//!
//! Auto-wrap, origin mode and cursor visibility have dedicated behavior.
//! Every other mode set or reset through `CSI h`/`CSI l` is only recorded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Numeric mode code, keyed by whether it was sent with the `?` marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModeCode {
    /// `CSI Ps h` / `CSI Ps l`
    Ansi(u16),
    /// `CSI ? Ps h` / `CSI ? Ps l`
    Dec(u16),
}

/// Terminal mode flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modes {
    /// DECAWM - characters written past the right margin wrap to the next line
    pub autowrap: bool,

    /// DECOM - cursor addressing is relative to the scroll region
    pub origin: bool,

    /// DECTCEM - cursor is drawn
    pub cursor_visible: bool,

    /// Modes with no dedicated behavior
    other: BTreeMap<ModeCode, bool>,
}

impl Default for Modes {
    fn default() -> Self {
        Self {
            autowrap: true,
            origin: false,
            cursor_visible: true,
            other: BTreeMap::new(),
        }
    }
}

impl Modes {
    /// Create new default modes
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all modes to default values (RIS)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record a mode with no dedicated behavior
    pub fn record(&mut self, code: ModeCode, enabled: bool) {
        self.other.insert(code, enabled);
    }

    /// Look up a recorded mode; `None` if it was never set or reset
    pub fn get(&self, code: ModeCode) -> Option<bool> {
        self.other.get(&code).copied()
    }

    /// Iterate over recorded modes in code order
    pub fn recorded(&self) -> impl Iterator<Item = (ModeCode, bool)> + '_ {
        self.other.iter().map(|(code, enabled)| (*code, *enabled))
    }
}
