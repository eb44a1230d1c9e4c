//! Ordering declarations.
//!
//! One [`OrderingConfig`] per table lists the position columns kept dense and
//! the scope columns that partition each of them. The declaration is
//! immutable once a driver is built from it.

use std::collections::HashSet;

use serde::Deserialize;

use super::ConfigError;

/// Default identity column used to exclude the triggering record.
pub const DEFAULT_ID_COLUMN: &str = "id";

fn default_id_column() -> String {
    DEFAULT_ID_COLUMN.to_string()
}

/// A position column and the columns scoping it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderedColumn {
    /// Name of the integer position column.
    pub column: String,
    /// Scope columns; empty means the whole table is one partition.
    #[serde(default)]
    pub scope: Vec<String>,
}

impl OrderedColumn {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            scope: Vec::new(),
        }
    }

    /// Add a scope column.
    pub fn scoped_by(mut self, column: impl Into<String>) -> Self {
        self.scope.push(column.into());
        self
    }
}

/// Ordering declaration for one table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderingConfig {
    /// Table holding the ordered records.
    pub table: String,
    /// Identity column of the table.
    #[serde(default = "default_id_column")]
    pub id_column: String,
    /// Ordered columns, processed in declaration order.
    #[serde(default)]
    pub columns: Vec<OrderedColumn>,
}

impl OrderingConfig {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            id_column: default_id_column(),
            columns: Vec::new(),
        }
    }

    pub fn with_id_column(mut self, id_column: impl Into<String>) -> Self {
        self.id_column = id_column.into();
        self
    }

    /// Declare another ordered column. Declaration order is processing order.
    pub fn with_column(mut self, column: OrderedColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Check the declaration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table.trim().is_empty() {
            return Err(ConfigError::Invalid("ordering table name is empty".into()));
        }
        if self.id_column.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "id column for table '{}' is empty",
                self.table
            )));
        }

        let mut seen = HashSet::new();
        for ordered in &self.columns {
            if ordered.column.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "ordered column name for table '{}' is empty",
                    self.table
                )));
            }
            if !seen.insert(ordered.column.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "column '{}' declared twice on table '{}'",
                    ordered.column, self.table
                )));
            }
            if ordered.scope.iter().any(|s| s == &ordered.column) {
                return Err(ConfigError::Invalid(format!(
                    "column '{}' cannot scope itself",
                    ordered.column
                )));
            }
            if ordered.scope.iter().any(|s| s.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "empty scope column for '{}.{}'",
                    self.table, ordered.column
                )));
            }
        }
        Ok(())
    }
}
