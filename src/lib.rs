//! Ordinals - gapless positions for scoped records
//!
//! Keeps an integer `position` column dense (1, 2, 3, …) within every scope
//! of a table while records are inserted, removed and reordered. The
//! surrounding persistence layer calls an [`OrderingDriver`] at three
//! lifecycle points; the driver turns each event into at most a couple of
//! set-based `UPDATE` statements against the record's siblings.

pub mod config;
pub mod ordering;
pub mod storage;
pub mod utils;

pub use ordering::{
    OrderedRecord, OrderingDriver, PositionRange, RecordSnapshot, ReindexError, Reindexer,
    ScopeKey, ScopeValue, Shift,
};
pub use storage::{PartitionStore, StorageError};
