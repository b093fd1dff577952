//! Error types
//!
//! Malformed input never produces an error: the interpreter absorbs it.
//! The only caller-visible failure is a geometry precondition violation,
//! reported here by the checked constructors.

/// Terminal error
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TerminalError {
    #[error("invalid terminal geometry {cols}x{rows}: both dimensions must be at least 1")]
    InvalidGeometry { cols: usize, rows: usize },
}
