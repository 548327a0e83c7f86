//! Error types for code fixes and refactorings.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for providers, edits and dispatch.
#[derive(Error, Debug)]
pub enum FixError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Tree-sitter parse error for {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Tree-sitter query error: {0}")]
    Query(#[from] tree_sitter::QueryError),

    #[error("Language not supported: {0}")]
    UnsupportedLanguage(String),

    #[error("Operation was cancelled")]
    Cancelled,

    #[error("Conflicting edits at bytes {first_start}..{first_end} and {second_start}..{second_end}")]
    ConflictingEdits {
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },

    #[error("Span {start}..{end} is outside of the document (length {len})")]
    SpanOutOfRange { start: usize, end: usize, len: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No action with equivalence key '{0}'")]
    ActionNotFound(String),
}

impl FixError {
    /// Returns true if this error is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FixError::Cancelled)
    }
}

/// A specialized Result type for fix operations.
pub type Result<T> = std::result::Result<T, FixError>;
