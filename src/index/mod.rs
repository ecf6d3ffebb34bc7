//! The persistent extent store and its range scans.

pub mod bounds;
pub mod persistent;
pub mod range;
pub mod tables;

pub use bounds::Bounds;
pub use persistent::{IndexStats, PersistentTemporalIndex, INDEX_DIR, INDEX_FILE};
pub use range::{in_range, Range, RangeQueryIterator};
pub use tables::Secondary;
