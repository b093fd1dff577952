//! Rendering attributes
//!
//! [`Attributes`] is an immutable snapshot of the current graphic rendition.
//! Every transition returns a new value with exactly one field changed, so a
//! snapshot captured into a cell or a saved cursor can never be altered
//! afterwards.

use serde::{Deserialize, Serialize};

use super::color::Color;

/// Text rendering attributes applied to newly written cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attributes {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub blink: bool,
    pub inverse: bool,
    pub hidden: bool,
    pub strikethrough: bool,
}

impl Attributes {
    /// The documented terminal defaults: default colors, no flags
    pub const DEFAULT: Attributes = Attributes {
        fg: Color::Default,
        bg: Color::Default,
        bold: false,
        dim: false,
        italic: false,
        underline: false,
        blink: false,
        inverse: false,
        hidden: false,
        strikethrough: false,
    };

    /// Reset to the terminal defaults (SGR 0)
    #[must_use]
    pub fn reset(self) -> Self {
        Self::DEFAULT
    }

    #[must_use]
    pub fn with_fg(self, fg: Color) -> Self {
        Self { fg, ..self }
    }

    #[must_use]
    pub fn with_bg(self, bg: Color) -> Self {
        Self { bg, ..self }
    }

    #[must_use]
    pub fn with_bold(self, bold: bool) -> Self {
        Self { bold, ..self }
    }

    #[must_use]
    pub fn with_dim(self, dim: bool) -> Self {
        Self { dim, ..self }
    }

    #[must_use]
    pub fn with_italic(self, italic: bool) -> Self {
        Self { italic, ..self }
    }

    #[must_use]
    pub fn with_underline(self, underline: bool) -> Self {
        Self { underline, ..self }
    }

    #[must_use]
    pub fn with_blink(self, blink: bool) -> Self {
        Self { blink, ..self }
    }

    #[must_use]
    pub fn with_inverse(self, inverse: bool) -> Self {
        Self { inverse, ..self }
    }

    #[must_use]
    pub fn with_hidden(self, hidden: bool) -> Self {
        Self { hidden, ..self }
    }

    #[must_use]
    pub fn with_strikethrough(self, strikethrough: bool) -> Self {
        Self {
            strikethrough,
            ..self
        }
    }

    /// Check whether this snapshot equals the terminal defaults
    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot() {
        let attrs = Attributes::default();
        assert_eq!(attrs, Attributes::DEFAULT);
        assert_eq!(attrs.fg, Color::Default);
        assert_eq!(attrs.bg, Color::Default);
        assert!(attrs.is_default());
    }

    #[test]
    fn test_transitions_change_one_field() {
        let base = Attributes::default();
        let bold = base.with_bold(true);

        assert!(bold.bold);
        assert_eq!(bold.with_bold(false), base);
        // The original is untouched
        assert!(!base.bold);

        let styled = base
            .with_italic(true)
            .with_fg(Color::RED)
            .with_bg(Color::Indexed(200));
        assert!(styled.italic);
        assert!(!styled.bold);
        assert_eq!(styled.fg, Color::RED);
        assert_eq!(styled.bg, Color::Indexed(200));
    }

    #[test]
    fn test_reset() {
        let attrs = Attributes::default()
            .with_underline(true)
            .with_inverse(true)
            .with_strikethrough(true)
            .with_fg(Color::Rgb(1, 2, 3));
        assert!(!attrs.is_default());
        assert!(attrs.reset().is_default());
    }
}
