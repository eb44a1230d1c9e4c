//! Storage layer.
//!
//! The reindexer never reads or writes a record by identity. Everything it
//! needs from storage is one operation, [`PartitionStore::shift`], applied to
//! a set of siblings selected by scope equality and a position range.

use async_trait::async_trait;

use crate::ordering::Shift;

#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod sql;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockPartitionStore;

#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub use sql::{build_shift_statement, SqlDatabase};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Interface for bulk position shifts.
///
/// Implementations apply a [`Shift`] as a single set-based mutation and
/// return the number of rows shifted. `&mut self` lets callers hand in the
/// connection that holds their open transaction, so the shift commits or
/// rolls back together with the triggering record's own write.
///
/// # Implementations
///
/// - `SqliteConnection` / `SqlitePool`: SQLite storage
/// - `PgConnection` / `PgPool`: PostgreSQL storage
/// - `MockPartitionStore`: In-memory rows for testing
#[async_trait]
pub trait PartitionStore: Send {
    /// Add `shift.delta` to every matching sibling's position.
    async fn shift(&mut self, shift: &Shift) -> Result<u64>;
}
