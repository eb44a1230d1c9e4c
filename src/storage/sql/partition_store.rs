//! Unified SQL PartitionStore implementation.
//!
//! Uses a macro to generate implementations for each SQL backend,
//! eliminating code duplication while maintaining type safety.

use sea_query::{Alias, Expr, Query, UpdateStatement};

use crate::ordering::Shift;

/// Render a shift as a single bulk UPDATE.
///
/// ```sql
/// UPDATE <table> SET <col> = <col> +/- 1
/// WHERE <col> IS NOT NULL
///   AND <scope_1> = ? AND ...
///   AND <col> >= <from> [AND <col> <= <to>]
///   [AND <id> <> <triggering id>]
/// ```
///
/// A NULL scope value renders as `IS NULL`.
pub fn build_shift_statement(shift: &Shift) -> UpdateStatement {
    let column = Alias::new(shift.column.as_str());

    let shifted = if shift.delta < 0 {
        Expr::col(column.clone()).sub(-shift.delta)
    } else {
        Expr::col(column.clone()).add(shift.delta)
    };

    let mut stmt = Query::update();
    stmt.table(Alias::new(shift.table.as_str()))
        .value(column.clone(), shifted)
        .and_where(Expr::col(column.clone()).is_not_null());

    for (scope_column, value) in &shift.scope {
        let scope_col = Expr::col(Alias::new(scope_column.as_str()));
        if value.is_null() {
            stmt.and_where(scope_col.is_null());
        } else {
            stmt.and_where(scope_col.eq(sea_query::Value::from(value)));
        }
    }

    stmt.and_where(Expr::col(column.clone()).gte(shift.range.from));
    if let Some(to) = shift.range.to {
        stmt.and_where(Expr::col(column).lte(to));
    }

    if let Some((id_column, id)) = &shift.exclude {
        if !id.is_null() {
            stmt.and_where(
                Expr::col(Alias::new(id_column.as_str())).ne(sea_query::Value::from(id)),
            );
        }
    }

    stmt
}

/// Macro to implement PartitionStore for a specific SQL backend.
///
/// Connections run the shift inside whatever transaction they hold. Pools
/// run it on any free connection in its own implicit transaction.
macro_rules! impl_partition_store {
    ($db_type:ty, $conn:ty, $pool:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::storage::PartitionStore for $conn {
            async fn shift(&mut self, shift: &Shift) -> crate::storage::Result<u64> {
                use super::SqlDatabase;

                let stmt = build_shift_statement(shift);
                let (sql, values) = <$db_type>::build_update(&stmt);
                let result = sqlx::query_with(&sql, values).execute(&mut *self).await?;
                Ok(result.rows_affected())
            }
        }

        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::storage::PartitionStore for $pool {
            async fn shift(&mut self, shift: &Shift) -> crate::storage::Result<u64> {
                use super::SqlDatabase;

                let stmt = build_shift_statement(shift);
                let (sql, values) = <$db_type>::build_update(&stmt);
                let result = sqlx::query_with(&sql, values).execute(&*self).await?;
                Ok(result.rows_affected())
            }
        }
    };
}

// Generate implementations for each SQL backend
impl_partition_store!(
    super::postgres::Postgres,
    sqlx::PgConnection,
    sqlx::PgPool,
    "postgres"
);
impl_partition_store!(
    super::sqlite::Sqlite,
    sqlx::SqliteConnection,
    sqlx::SqlitePool,
    "sqlite"
);
