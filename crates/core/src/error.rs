//! Fatal precondition errors.
//!
//! Ordinary game no-ops (digging an empty cell, a color mismatch, placing onto
//! an occupied cell) are plain values, never errors. These variants only
//! describe caller misuse at construction time.

/// Errors raised when an engine or grid cannot be built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("grid dimensions must be positive (got {height}x{width})")]
    InvalidDimensions { height: usize, width: usize },

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid rules: {0}")]
    InvalidRules(String),
}
