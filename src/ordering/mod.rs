//! Dense ordering of scoped records.

mod driver;
mod error;
mod reindexer;
mod scope;
mod shift;

pub use driver::{OrderedRecord, OrderingDriver, RecordSnapshot};
pub use error::{ReindexError, Result};
pub use reindexer::Reindexer;
pub use scope::{ScopeKey, ScopeValue};
pub use shift::{PositionRange, Shift};
