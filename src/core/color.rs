//! Logical colors
//!
//! The emulator stores colors as logical values. Resolution to an actual
//! pixel value only happens at render time, through [`Color::to_rgb`] or a
//! renderer-supplied palette.

use serde::{Deserialize, Serialize};

/// One of the 16 standard ANSI colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl NamedColor {
    const ALL: [NamedColor; 16] = [
        NamedColor::Black,
        NamedColor::Red,
        NamedColor::Green,
        NamedColor::Yellow,
        NamedColor::Blue,
        NamedColor::Magenta,
        NamedColor::Cyan,
        NamedColor::White,
        NamedColor::BrightBlack,
        NamedColor::BrightRed,
        NamedColor::BrightGreen,
        NamedColor::BrightYellow,
        NamedColor::BrightBlue,
        NamedColor::BrightMagenta,
        NamedColor::BrightCyan,
        NamedColor::BrightWhite,
    ];

    /// Look up a named color by its 0-15 palette index
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Palette index (0-15)
    pub fn index(self) -> u8 {
        self as u8
    }
}

/// A logical color value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// The terminal default: white for foreground, black for background
    Default,
    /// Standard 16-color palette entry (SGR 30-37, 90-97 and friends)
    Named(NamedColor),
    /// 256-color palette index (SGR 38;5;n)
    Indexed(u8),
    /// 24-bit color (SGR 38;2;r;g;b)
    Rgb(u8, u8, u8),
}

impl Default for Color {
    fn default() -> Self {
        Color::Default
    }
}

impl Color {
    pub const BLACK: Color = Color::Named(NamedColor::Black);
    pub const RED: Color = Color::Named(NamedColor::Red);
    pub const GREEN: Color = Color::Named(NamedColor::Green);
    pub const YELLOW: Color = Color::Named(NamedColor::Yellow);
    pub const BLUE: Color = Color::Named(NamedColor::Blue);
    pub const MAGENTA: Color = Color::Named(NamedColor::Magenta);
    pub const CYAN: Color = Color::Named(NamedColor::Cyan);
    pub const WHITE: Color = Color::Named(NamedColor::White);

    /// Convert a 256-color index to RGB using the xterm palette
    pub fn indexed_to_rgb(index: u8) -> (u8, u8, u8) {
        match index {
            0 => (0, 0, 0),
            1 => (205, 0, 0),
            2 => (0, 205, 0),
            3 => (205, 205, 0),
            4 => (0, 0, 238),
            5 => (205, 0, 205),
            6 => (0, 205, 205),
            7 => (229, 229, 229),
            8 => (127, 127, 127),
            9 => (255, 0, 0),
            10 => (0, 255, 0),
            11 => (255, 255, 0),
            12 => (92, 92, 255),
            13 => (255, 0, 255),
            14 => (0, 255, 255),
            15 => (255, 255, 255),
            // 6x6x6 color cube
            16..=231 => {
                let n = index - 16;
                let r = n / 36;
                let g = (n % 36) / 6;
                let b = n % 6;
                let to_rgb = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
                (to_rgb(r), to_rgb(g), to_rgb(b))
            }
            // Grayscale ramp
            232..=255 => {
                let gray = 8 + (index - 232) * 10;
                (gray, gray, gray)
            }
        }
    }

    /// Resolve to RGB with the built-in palette.
    ///
    /// `Default` resolves to white in the foreground and black in the
    /// background.
    pub fn to_rgb(&self, is_foreground: bool) -> (u8, u8, u8) {
        match self {
            Color::Default => {
                if is_foreground {
                    Self::indexed_to_rgb(NamedColor::White.index())
                } else {
                    Self::indexed_to_rgb(NamedColor::Black.index())
                }
            }
            Color::Named(named) => Self::indexed_to_rgb(named.index()),
            Color::Indexed(i) => Self::indexed_to_rgb(*i),
            Color::Rgb(r, g, b) => (*r, *g, *b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_from_index() {
        assert_eq!(NamedColor::from_index(1), Some(NamedColor::Red));
        assert_eq!(NamedColor::from_index(15), Some(NamedColor::BrightWhite));
        assert_eq!(NamedColor::from_index(16), None);
        assert_eq!(NamedColor::BrightBlue.index(), 12);
    }

    #[test]
    fn test_indexed_to_rgb() {
        assert_eq!(Color::indexed_to_rgb(0), (0, 0, 0));
        assert_eq!(Color::indexed_to_rgb(15), (255, 255, 255));
        assert_eq!(Color::indexed_to_rgb(16), (0, 0, 0));
        assert_eq!(Color::indexed_to_rgb(231), (255, 255, 255));
        assert_eq!(Color::indexed_to_rgb(232), (8, 8, 8));
        assert_eq!(Color::indexed_to_rgb(255), (238, 238, 238));
    }

    #[test]
    fn test_default_resolution() {
        assert_eq!(Color::Default.to_rgb(true), (229, 229, 229));
        assert_eq!(Color::Default.to_rgb(false), (0, 0, 0));
        assert_eq!(Color::Rgb(1, 2, 3).to_rgb(true), (1, 2, 3));
        assert_eq!(Color::RED.to_rgb(true), (205, 0, 0));
    }
}
