//! Terminal Core Module
//!
//! Platform-independent terminal state. This module contains:
//! - Logical colors and the immutable attribute snapshot
//! - Cells, lines and the owned 2D grid
//! - Screen buffers (cursor, scroll region, saved cursor)
//! - Mode flags
//! - Scrollback buffer
//! - Deterministic snapshot generation
//!
//! The core is deterministic: given the same sequence of operations, it
//! always produces the same state.

mod attributes;
mod cell;
mod color;
mod cursor;
mod grid;
mod line;
mod modes;
mod screen;
mod scrollback;
mod snapshot;

pub use attributes::Attributes;
pub use cell::Cell;
pub use color::{Color, NamedColor};
pub use cursor::{Cursor, SavedCursor};
pub use grid::Grid;
pub use line::Line;
pub use modes::{ModeCode, Modes};
pub use screen::{EraseMode, Screen};
pub use scrollback::{Scrollback, DEFAULT_SCROLLBACK_SIZE};
pub use snapshot::{CellSnapshot, CursorSnapshot, ModesSnapshot, Snapshot, StyleSnapshot};
