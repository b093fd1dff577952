//! Terminal escape sequence scanner
//!
//! Converts a character stream into typed events for the interpreter.
//! Partial sequences at the end of a chunk are carried over to the next
//! call. Byte input is decoded by [`Utf8Decoder`] first.

mod event;
mod scanner;
mod utf8;

pub use event::{ControlChar, CsiSequence, EscapeKind, Event, OscCommand, MAX_CSI_PARAMS};
pub use scanner::{scan, Scan, Scanner, MAX_PENDING};
pub use utf8::{Utf8Decoder, REPLACEMENT};
