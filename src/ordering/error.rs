//! Reindexer error types.

use crate::storage::StorageError;

/// Result type for reindexing operations.
pub type Result<T> = std::result::Result<T, ReindexError>;

/// Errors raised while keeping a partition dense.
///
/// Input errors are raised before any shift is issued. Storage errors are
/// passed through untouched; the enclosing transaction should roll back.
#[derive(Debug, thiserror::Error)]
pub enum ReindexError {
    #[error("Negative position {position} for column '{column}'")]
    NegativePosition { column: String, position: i64 },

    #[error("Scope arity mismatch for column '{column}': expected {expected} values, got {actual}")]
    ScopeArity {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Record has no value for column '{0}'")]
    MissingColumn(String),

    #[error("Column '{column}' holds non-integer position {value}")]
    InvalidPosition { column: String, value: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}
