//! Position reindexing.
//!
//! Decides which siblings move, by how much and in which direction when a
//! record enters a partition, leaves it, or changes slot inside it. The
//! triggering record itself is never shifted; its caller writes its new
//! position through the normal persistence path.

use tracing::{debug, trace};

use super::error::{ReindexError, Result};
use super::scope::{ScopeKey, ScopeValue};
use super::shift::{PositionRange, Shift};
use crate::config::OrderedColumn;
use crate::storage::PartitionStore;

/// Stateless reindexer for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reindexer {
    table: String,
    id_column: String,
}

impl Reindexer {
    pub fn new(table: impl Into<String>, id_column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            id_column: id_column.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    /// Plan the shift that makes room for a record entering at `new_position`.
    ///
    /// Every sibling at or after `new_position` moves one step later. Pass
    /// `record_id` when the entering record's row may already hold its new
    /// values, so it is not shifted along with its siblings.
    pub fn plan_insert(
        &self,
        ordered: &OrderedColumn,
        scope: &ScopeKey,
        new_position: Option<i64>,
        record_id: Option<&ScopeValue>,
    ) -> Result<Option<Shift>> {
        self.check_scope(ordered, scope)?;
        let Some(position) = new_position else {
            return Ok(None);
        };
        check_position(ordered, position)?;

        Ok(Some(self.shift(
            ordered,
            scope,
            PositionRange::starting_at(position),
            1,
            record_id,
        )))
    }

    /// Plan the shift that closes the gap left at `old_position`.
    ///
    /// Every sibling at or after `old_position` moves one step earlier. The
    /// leaving record is excluded by identity when `record_id` is known.
    pub fn plan_remove(
        &self,
        ordered: &OrderedColumn,
        scope: &ScopeKey,
        old_position: Option<i64>,
        record_id: Option<&ScopeValue>,
    ) -> Result<Option<Shift>> {
        self.check_scope(ordered, scope)?;
        let Some(position) = old_position else {
            return Ok(None);
        };
        check_position(ordered, position)?;

        Ok(Some(self.shift(
            ordered,
            scope,
            PositionRange::starting_at(position),
            -1,
            record_id,
        )))
    }

    /// Plan the shift for a position change within one partition.
    ///
    /// Transitions to or from NULL are a remove or an insert. A move shifts
    /// the window `[min(new, old + 1), max(new, old - 1)]`: one step later
    /// when the record moves earlier, one step earlier when it moves later.
    pub fn plan_update(
        &self,
        ordered: &OrderedColumn,
        scope: &ScopeKey,
        old_position: Option<i64>,
        new_position: Option<i64>,
        record_id: Option<&ScopeValue>,
    ) -> Result<Option<Shift>> {
        match (old_position, new_position) {
            (None, None) => {
                self.check_scope(ordered, scope)?;
                Ok(None)
            }
            (Some(_), None) => self.plan_remove(ordered, scope, old_position, record_id),
            (None, Some(_)) => self.plan_insert(ordered, scope, new_position, record_id),
            (Some(old), Some(new)) => {
                self.check_scope(ordered, scope)?;
                check_position(ordered, old)?;
                check_position(ordered, new)?;
                if old == new {
                    return Ok(None);
                }

                let from = new.min(old.saturating_add(1));
                let to = new.max(old.saturating_sub(1));
                let delta = if new < old { 1 } else { -1 };

                Ok(Some(self.shift(
                    ordered,
                    scope,
                    PositionRange::between(from, to),
                    delta,
                    record_id,
                )))
            }
        }
    }

    /// Make room for a record entering the partition.
    pub async fn on_insert<S: PartitionStore + ?Sized>(
        &self,
        store: &mut S,
        ordered: &OrderedColumn,
        scope: &ScopeKey,
        new_position: Option<i64>,
        record_id: Option<&ScopeValue>,
    ) -> Result<u64> {
        let planned = self.plan_insert(ordered, scope, new_position, record_id)?;
        self.apply_planned(store, ordered, planned).await
    }

    /// Close the gap left by a record leaving the partition.
    pub async fn on_remove<S: PartitionStore + ?Sized>(
        &self,
        store: &mut S,
        ordered: &OrderedColumn,
        scope: &ScopeKey,
        old_position: Option<i64>,
        record_id: Option<&ScopeValue>,
    ) -> Result<u64> {
        let planned = self.plan_remove(ordered, scope, old_position, record_id)?;
        self.apply_planned(store, ordered, planned).await
    }

    /// Shift siblings for a position change.
    pub async fn on_update<S: PartitionStore + ?Sized>(
        &self,
        store: &mut S,
        ordered: &OrderedColumn,
        scope: &ScopeKey,
        old_position: Option<i64>,
        new_position: Option<i64>,
        record_id: Option<&ScopeValue>,
    ) -> Result<u64> {
        let planned = self.plan_update(ordered, scope, old_position, new_position, record_id)?;
        self.apply_planned(store, ordered, planned).await
    }

    async fn apply_planned<S: PartitionStore + ?Sized>(
        &self,
        store: &mut S,
        ordered: &OrderedColumn,
        planned: Option<Shift>,
    ) -> Result<u64> {
        match planned {
            Some(shift) => apply_shift(store, &shift).await,
            None => {
                trace!(table = %self.table, column = %ordered.column, "No shift needed");
                Ok(0)
            }
        }
    }

    fn check_scope(&self, ordered: &OrderedColumn, scope: &ScopeKey) -> Result<()> {
        if scope.len() != ordered.scope.len() {
            return Err(ReindexError::ScopeArity {
                column: ordered.column.clone(),
                expected: ordered.scope.len(),
                actual: scope.len(),
            });
        }
        Ok(())
    }

    fn shift(
        &self,
        ordered: &OrderedColumn,
        scope: &ScopeKey,
        range: PositionRange,
        delta: i64,
        record_id: Option<&ScopeValue>,
    ) -> Shift {
        Shift {
            table: self.table.clone(),
            column: ordered.column.clone(),
            scope: ordered
                .scope
                .iter()
                .cloned()
                .zip(scope.values().iter().cloned())
                .collect(),
            range,
            delta,
            exclude: record_id
                .filter(|id| !id.is_null())
                .map(|id| (self.id_column.clone(), id.clone())),
        }
    }
}

/// Apply one planned shift. Storage errors are returned as-is.
pub(super) async fn apply_shift<S: PartitionStore + ?Sized>(
    store: &mut S,
    shift: &Shift,
) -> Result<u64> {
    let rows = store.shift(shift).await?;
    debug!(
        table = %shift.table,
        column = %shift.column,
        from = shift.range.from,
        to = ?shift.range.to,
        delta = shift.delta,
        rows,
        "Shifted positions"
    );
    Ok(rows)
}

fn check_position(ordered: &OrderedColumn, position: i64) -> Result<()> {
    if position < 0 {
        return Err(ReindexError::NegativePosition {
            column: ordered.column.clone(),
            position,
        });
    }
    Ok(())
}
