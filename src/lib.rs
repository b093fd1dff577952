//! vtemu - ANSI/VT100 Terminal Emulator Engine
//!
//! Consumes the output stream of a program running in a pseudo-terminal
//! and maintains the emulated screen state a renderer draws from.
//! This crate provides:
//!
//! - `core`: Screen buffers, cells, attributes, cursor, scrollback, snapshots
//! - `parser`: Scanner turning text into typed escape-sequence events
//! - `Terminal`: the emulator facade (feed, query, resize, notify)
//!
//! The engine is single-threaded and synchronous: `feed` runs to
//! completion with no I/O. Callers sharing a `Terminal` across threads
//! must serialize access themselves.
//!
//! ```
//! use vtemu::Terminal;
//!
//! let mut term = Terminal::new(80, 24);
//! term.feed("Hello\r\n\x1b[31mWorld\x1b[0m");
//! assert_eq!(term.cursor_y(), 1);
//! assert_eq!(term.cursor_x(), 5);
//! ```

pub mod config;
pub mod core;
pub mod error;
mod interpreter;
pub mod parser;
pub mod terminal;

pub use config::{ConfigError, TerminalConfig};
pub use error::TerminalError;
pub use terminal::{FeedOutcome, Geometry, Terminal, TerminalListener};
