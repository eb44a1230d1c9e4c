//! Lifecycle driver.
//!
//! The persistence layer calls the driver at three points: before a record
//! is inserted, before it is removed, and before an update is persisted. The
//! driver reads the record's scope and position values, plans the shifts for
//! every ordered column in declaration order, and applies them. Planning
//! completes for all columns before the first shift is issued, so invalid
//! input never leaves a partially shifted table behind.

use std::collections::HashMap;

use tracing::{debug, info};

use super::error::{ReindexError, Result};
use super::reindexer::{apply_shift, Reindexer};
use super::scope::{ScopeKey, ScopeValue};
use super::shift::Shift;
use crate::config::{ConfigError, OrderedColumn, OrderingConfig};
use crate::storage::PartitionStore;

/// Read access to the values of a record the driver needs.
pub trait OrderedRecord {
    /// Identity of the record, if it has one yet.
    fn record_id(&self) -> Option<ScopeValue>;

    /// Value of a column, `None` if the record does not carry the column.
    fn field(&self, column: &str) -> Option<ScopeValue>;
}

/// Map-backed record values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSnapshot {
    id: Option<ScopeValue>,
    fields: HashMap<String, ScopeValue>,
}

impl RecordSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<ScopeValue>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<ScopeValue>) -> Self {
        self.fields.insert(column.into(), value.into());
        self
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<ScopeValue>) {
        self.fields.insert(column.into(), value.into());
    }
}

impl OrderedRecord for RecordSnapshot {
    fn record_id(&self) -> Option<ScopeValue> {
        self.id.clone().filter(|id| !id.is_null())
    }

    fn field(&self, column: &str) -> Option<ScopeValue> {
        self.fields.get(column).cloned()
    }
}

/// Keeps every ordered column of one table dense across lifecycle events.
#[derive(Debug, Clone)]
pub struct OrderingDriver {
    reindexer: Reindexer,
    columns: Vec<OrderedColumn>,
}

impl OrderingDriver {
    /// Build a driver from a validated ordering declaration.
    pub fn new(config: OrderingConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        info!(
            table = %config.table,
            columns = config.columns.len(),
            "Ordering registered"
        );
        Ok(Self {
            reindexer: Reindexer::new(config.table, config.id_column),
            columns: config.columns,
        })
    }

    pub fn reindexer(&self) -> &Reindexer {
        &self.reindexer
    }

    /// Ordered columns in processing order.
    pub fn columns(&self) -> &[OrderedColumn] {
        &self.columns
    }

    /// Shifts needed before `record` is inserted.
    ///
    /// Nothing is excluded by identity, so these must be applied before the
    /// new row is written.
    pub fn plan_insert<R: OrderedRecord + ?Sized>(&self, record: &R) -> Result<Vec<Shift>> {
        let mut shifts = Vec::new();
        for ordered in &self.columns {
            let scope = scope_of(record, ordered)?;
            let position = position_of(record, &ordered.column)?;
            shifts.extend(self.reindexer.plan_insert(ordered, &scope, position, None)?);
        }
        Ok(shifts)
    }

    /// Shifts needed before `record` is removed. `record` holds the values
    /// as currently stored.
    pub fn plan_remove<R: OrderedRecord + ?Sized>(&self, record: &R) -> Result<Vec<Shift>> {
        let id = record.record_id();
        let mut shifts = Vec::new();
        for ordered in &self.columns {
            let scope = scope_of(record, ordered)?;
            let position = position_of(record, &ordered.column)?;
            shifts.extend(
                self.reindexer
                    .plan_remove(ordered, &scope, position, id.as_ref())?,
            );
        }
        Ok(shifts)
    }

    /// Shifts needed before an update from `old` to `new` is persisted.
    ///
    /// A column whose position is unchanged and whose scope is unchanged
    /// produces nothing. A changed scope is handled as a removal from the old
    /// partition followed by an insertion into the new one.
    pub fn plan_update<R, N>(&self, old: &R, new: &N) -> Result<Vec<Shift>>
    where
        R: OrderedRecord + ?Sized,
        N: OrderedRecord + ?Sized,
    {
        let id = new.record_id().or_else(|| old.record_id());
        let mut shifts = Vec::new();
        for ordered in &self.columns {
            let old_scope = scope_of(old, ordered)?;
            let new_scope = scope_of(new, ordered)?;
            let old_position = position_of(old, &ordered.column)?;
            let new_position = position_of(new, &ordered.column)?;

            if old_scope != new_scope {
                shifts.extend(self.reindexer.plan_remove(
                    ordered,
                    &old_scope,
                    old_position,
                    id.as_ref(),
                )?);
                shifts.extend(self.reindexer.plan_insert(
                    ordered,
                    &new_scope,
                    new_position,
                    id.as_ref(),
                )?);
            } else if old_position != new_position {
                shifts.extend(self.reindexer.plan_update(
                    ordered,
                    &new_scope,
                    old_position,
                    new_position,
                    id.as_ref(),
                )?);
            }
        }
        Ok(shifts)
    }

    /// Call before `record` is durably stored. Returns the number of
    /// siblings shifted.
    pub async fn before_insert<S, R>(&self, store: &mut S, record: &R) -> Result<u64>
    where
        S: PartitionStore + ?Sized,
        R: OrderedRecord + ?Sized,
    {
        let shifts = self.plan_insert(record)?;
        self.apply_all(store, "insert", &shifts).await
    }

    /// Call before `record` is durably removed, inside the same transaction.
    pub async fn before_remove<S, R>(&self, store: &mut S, record: &R) -> Result<u64>
    where
        S: PartitionStore + ?Sized,
        R: OrderedRecord + ?Sized,
    {
        let shifts = self.plan_remove(record)?;
        self.apply_all(store, "remove", &shifts).await
    }

    /// Call before an update from `old` to `new` is durably stored.
    pub async fn before_update<S, R, N>(&self, store: &mut S, old: &R, new: &N) -> Result<u64>
    where
        S: PartitionStore + ?Sized,
        R: OrderedRecord + ?Sized,
        N: OrderedRecord + ?Sized,
    {
        let shifts = self.plan_update(old, new)?;
        self.apply_all(store, "update", &shifts).await
    }

    async fn apply_all<S: PartitionStore + ?Sized>(
        &self,
        store: &mut S,
        event: &str,
        shifts: &[Shift],
    ) -> Result<u64> {
        let mut rows = 0;
        for shift in shifts {
            rows += apply_shift(store, shift).await?;
        }
        debug!(
            table = %self.reindexer.table(),
            event,
            shifts = shifts.len(),
            rows,
            "Reindexed"
        );
        Ok(rows)
    }
}

fn scope_of<R: OrderedRecord + ?Sized>(record: &R, ordered: &OrderedColumn) -> Result<ScopeKey> {
    ordered
        .scope
        .iter()
        .map(|column| {
            record
                .field(column)
                .ok_or_else(|| ReindexError::MissingColumn(column.clone()))
        })
        .collect::<Result<Vec<_>>>()
        .map(ScopeKey::new)
}

fn position_of<R: OrderedRecord + ?Sized>(record: &R, column: &str) -> Result<Option<i64>> {
    match record.field(column) {
        None => Err(ReindexError::MissingColumn(column.to_string())),
        Some(ScopeValue::Null) => Ok(None),
        Some(ScopeValue::Int(position)) => Ok(Some(position)),
        Some(other) => Err(ReindexError::InvalidPosition {
            column: column.to_string(),
            value: other.to_string(),
        }),
    }
}
