//! Mock storage implementation for testing.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{PartitionStore, Result, StorageError};
use crate::ordering::{RecordSnapshot, ScopeValue, Shift};

/// One in-memory row.
#[derive(Debug, Clone)]
struct MockRow {
    table: String,
    id: ScopeValue,
    fields: HashMap<String, ScopeValue>,
}

/// Mock partition store that keeps rows in memory.
///
/// Applies shifts with the same selection rules as the SQL backends and
/// records every shift it was asked to apply.
#[derive(Debug, Default)]
pub struct MockPartitionStore {
    rows: Vec<MockRow>,
    shifts: Vec<Shift>,
    fail_on_shift: bool,
}

impl MockPartitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row. Fields not given read as NULL.
    pub fn insert(
        &mut self,
        table: &str,
        id: impl Into<ScopeValue>,
        fields: &[(&str, ScopeValue)],
    ) {
        self.rows.push(MockRow {
            table: table.to_string(),
            id: id.into(),
            fields: fields
                .iter()
                .map(|(column, value)| (column.to_string(), value.clone()))
                .collect(),
        });
    }

    /// Overwrite one field of a row, as the caller's own persistence would.
    pub fn set(
        &mut self,
        table: &str,
        id: impl Into<ScopeValue>,
        column: &str,
        value: impl Into<ScopeValue>,
    ) {
        let id = id.into();
        if let Some(row) = self.rows.iter_mut().find(|r| r.table == table && r.id == id) {
            row.fields.insert(column.to_string(), value.into());
        }
    }

    pub fn remove(&mut self, table: &str, id: impl Into<ScopeValue>) {
        let id = id.into();
        self.rows.retain(|r| !(r.table == table && r.id == id));
    }

    /// Current value of one field.
    pub fn get(&self, table: &str, id: impl Into<ScopeValue>, column: &str) -> Option<ScopeValue> {
        let id = id.into();
        self.find(table, &id)
            .map(|row| row.fields.get(column).cloned().unwrap_or(ScopeValue::Null))
    }

    /// Snapshot of a stored row, suitable for driving lifecycle hooks.
    pub fn record(&self, table: &str, id: impl Into<ScopeValue>) -> Option<RecordSnapshot> {
        let id = id.into();
        self.find(table, &id).map(|row| {
            row.fields.iter().fold(
                RecordSnapshot::new().with_id(row.id.clone()),
                |snapshot, (column, value)| snapshot.with(column.as_str(), value.clone()),
            )
        })
    }

    /// Ids and positions of a partition, sorted by position.
    pub fn ordered(
        &self,
        table: &str,
        column: &str,
        scope: &[(&str, ScopeValue)],
    ) -> Vec<(ScopeValue, i64)> {
        let mut ordered: Vec<(ScopeValue, i64)> = self
            .rows
            .iter()
            .filter(|row| row.table == table)
            .filter(|row| {
                scope.iter().all(|(c, v)| {
                    row.fields.get(*c).cloned().unwrap_or(ScopeValue::Null) == *v
                })
            })
            .filter_map(|row| {
                row.fields
                    .get(column)
                    .and_then(|v| v.as_int())
                    .map(|p| (row.id.clone(), p))
            })
            .collect();
        ordered.sort_by_key(|(_, p)| *p);
        ordered
    }

    /// Every shift issued so far, in order.
    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    pub fn set_fail_on_shift(&mut self, fail: bool) {
        self.fail_on_shift = fail;
    }

    fn find(&self, table: &str, id: &ScopeValue) -> Option<&MockRow> {
        self.rows.iter().find(|r| r.table == table && r.id == *id)
    }
}

#[async_trait]
impl PartitionStore for MockPartitionStore {
    async fn shift(&mut self, shift: &Shift) -> Result<u64> {
        if self.fail_on_shift {
            return Err(StorageError::Database(sqlx::Error::Protocol(format!(
                "shift rejected on table {}",
                shift.table
            ))));
        }
        self.shifts.push(shift.clone());

        let mut affected = 0u64;
        for row in self.rows.iter_mut().filter(|r| r.table == shift.table) {
            let id = row.id.clone();
            let fields = &row.fields;
            let matched = shift.matches(|column| {
                if Some(column) == shift.exclude.as_ref().map(|(c, _)| c.as_str()) {
                    return Some(id.clone());
                }
                fields.get(column).cloned()
            });
            if !matched {
                continue;
            }
            if let Some(ScopeValue::Int(position)) = row.fields.get_mut(&shift.column) {
                *position += shift.delta;
                affected += 1;
            }
        }
        Ok(affected)
    }
}
