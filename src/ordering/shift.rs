//! Structured description of a bulk position shift.
//!
//! A [`Shift`] is the only mutation the reindexer ever issues: "for every
//! sibling in this partition whose position lies in this range, add this
//! delta". Storage backends render it into their native bulk update.

use super::scope::ScopeValue;

/// Inclusive range of positions. `to = None` is unbounded above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionRange {
    pub from: i64,
    pub to: Option<i64>,
}

impl PositionRange {
    /// Every position at or after `from`.
    pub fn starting_at(from: i64) -> Self {
        Self { from, to: None }
    }

    /// Positions in `from..=to`.
    pub fn between(from: i64, to: i64) -> Self {
        Self { from, to: Some(to) }
    }

    pub fn contains(&self, position: i64) -> bool {
        position >= self.from && self.to.map_or(true, |to| position <= to)
    }
}

/// A signed shift over one partition of one ordered column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shift {
    /// Table holding the records.
    pub table: String,
    /// Ordered column being shifted.
    pub column: String,
    /// Equality conditions identifying the partition, one per scope column.
    pub scope: Vec<(String, ScopeValue)>,
    /// Positions affected by the shift.
    pub range: PositionRange,
    /// Amount added to every matched position (+1 or -1).
    pub delta: i64,
    /// Identity of the triggering record, never matched as its own sibling.
    pub exclude: Option<(String, ScopeValue)>,
}

impl Shift {
    /// Whether a sibling with these values falls under this shift.
    ///
    /// `field` returns the sibling's value for a column, `None` if absent.
    pub fn matches<F>(&self, field: F) -> bool
    where
        F: Fn(&str) -> Option<ScopeValue>,
    {
        let position = match field(&self.column).and_then(|v| v.as_int()) {
            Some(p) => p,
            None => return false,
        };
        if !self.range.contains(position) {
            return false;
        }
        let in_scope = self
            .scope
            .iter()
            .all(|(column, value)| field(column).unwrap_or(ScopeValue::Null) == *value);
        if !in_scope {
            return false;
        }
        match &self.exclude {
            Some((id_column, id)) => field(id_column).as_ref() != Some(id),
            None => true,
        }
    }
}
