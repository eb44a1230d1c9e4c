//! Scope values and partition keys.

use std::fmt;

/// A single scope column value.
///
/// `Null` is a real value here: a record whose scope column is NULL belongs
/// to the partition of all siblings whose column is also NULL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScopeValue {
    Null,
    Int(i64),
    Text(String),
    Bool(bool),
}

impl ScopeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScopeValue::Null)
    }

    /// Integer view, used when the value is read as a position.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ScopeValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for ScopeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeValue::Null => f.write_str("NULL"),
            ScopeValue::Int(v) => write!(f, "{}", v),
            ScopeValue::Text(v) => write!(f, "'{}'", v),
            ScopeValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for ScopeValue {
    fn from(v: i64) -> Self {
        ScopeValue::Int(v)
    }
}

impl From<i32> for ScopeValue {
    fn from(v: i32) -> Self {
        ScopeValue::Int(v as i64)
    }
}

impl From<u32> for ScopeValue {
    fn from(v: u32) -> Self {
        ScopeValue::Int(v as i64)
    }
}

impl From<bool> for ScopeValue {
    fn from(v: bool) -> Self {
        ScopeValue::Bool(v)
    }
}

impl From<String> for ScopeValue {
    fn from(v: String) -> Self {
        ScopeValue::Text(v)
    }
}

impl From<&str> for ScopeValue {
    fn from(v: &str) -> Self {
        ScopeValue::Text(v.to_string())
    }
}

impl<T: Into<ScopeValue>> From<Option<T>> for ScopeValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(ScopeValue::Null)
    }
}

impl From<&ScopeValue> for sea_query::Value {
    fn from(v: &ScopeValue) -> Self {
        match v {
            ScopeValue::Null => sea_query::Value::BigInt(None),
            ScopeValue::Int(i) => (*i).into(),
            ScopeValue::Text(s) => s.clone().into(),
            ScopeValue::Bool(b) => (*b).into(),
        }
    }
}

/// Ordered tuple of scope values identifying one partition.
///
/// An empty key means the whole table is a single partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ScopeKey(Vec<ScopeValue>);

impl ScopeKey {
    pub fn new(values: Vec<ScopeValue>) -> Self {
        Self(values)
    }

    /// Key for an unscoped column.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[ScopeValue] {
        &self.0
    }
}

impl From<Vec<ScopeValue>> for ScopeKey {
    fn from(values: Vec<ScopeValue>) -> Self {
        Self(values)
    }
}

impl FromIterator<ScopeValue> for ScopeKey {
    fn from_iter<I: IntoIterator<Item = ScopeValue>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
