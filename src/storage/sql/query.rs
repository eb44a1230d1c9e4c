//! SQL database abstraction trait.

use sea_query::UpdateStatement;
use sea_query_binder::SqlxValues;

/// Trait for SQL database backends.
///
/// This trait abstracts over different SQL databases (PostgreSQL, SQLite)
/// by providing the query building method.
pub trait SqlDatabase: Send + Sync + 'static {
    /// Build a parameterized SQL query from a sea-query UPDATE statement.
    fn build_update(stmt: &UpdateStatement) -> (String, SqlxValues);
}
