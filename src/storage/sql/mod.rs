//! Unified SQL storage implementations.
//!
//! This module provides the shared shift implementation for SQL-based storage
//! backends (PostgreSQL, SQLite). The implementation is parameterized by
//! database type using the `SqlDatabase` trait.

mod partition_store;
mod query;

pub use partition_store::build_shift_statement;
pub use query::SqlDatabase;

#[cfg(feature = "postgres")]
pub mod postgres {
    //! PostgreSQL database backend.

    use sea_query::PostgresQueryBuilder;
    use sea_query_binder::{SqlxBinder, SqlxValues};
    use sqlx::postgres::{PgPool, PgPoolOptions};
    use tracing::info;

    use crate::config::PostgresConfig;

    /// PostgreSQL database marker type.
    pub struct Postgres;

    impl super::SqlDatabase for Postgres {
        fn build_update(stmt: &sea_query::UpdateStatement) -> (String, SqlxValues) {
            stmt.build_sqlx(PostgresQueryBuilder)
        }
    }

    /// Open a PostgreSQL connection pool.
    pub async fn connect(config: &PostgresConfig) -> crate::storage::Result<PgPool> {
        info!("Storage: postgres at {}", config.uri);
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.uri)
            .await?;
        Ok(pool)
    }
}

#[cfg(feature = "sqlite")]
pub mod sqlite {
    //! SQLite database backend.

    use sea_query::SqliteQueryBuilder;
    use sea_query_binder::{SqlxBinder, SqlxValues};
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
    use tracing::info;

    use crate::config::SqliteConfig;

    /// SQLite database marker type.
    pub struct Sqlite;

    impl super::SqlDatabase for Sqlite {
        fn build_update(stmt: &sea_query::UpdateStatement) -> (String, SqlxValues) {
            stmt.build_sqlx(SqliteQueryBuilder)
        }
    }

    /// Open a SQLite connection pool, creating the database file if needed.
    ///
    /// An in-memory database is private to one connection, so the pool is
    /// capped at a single connection in that case.
    pub async fn connect(config: &SqliteConfig) -> crate::storage::Result<SqlitePool> {
        info!("Storage: sqlite at {}", config.path);

        let in_memory = config.path == ":memory:";
        if !in_memory {
            if let Some(parent) = std::path::Path::new(&config.path).parent() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let max_connections = if in_memory { 1 } else { config.max_connections };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&config.url())
            .await?;
        Ok(pool)
    }
}
