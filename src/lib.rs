//! Temporal index: a persistent sub-index of a triple store that answers
//! interval-algebra queries (before, overlaps, during, meets, ...) with range
//! scans instead of full-store scans.
//!
//! Nodes map to extents (instants or intervals) held in an embedded redb file
//! with two derived orderings, by start and by end. Each relation knows how to
//! turn one known operand into a box over the (start, end) plane; the box
//! drives a cursor walk over the cheaper ordering.

pub mod cli;
pub mod engine;
pub mod format;
pub mod graph;
pub mod index;
pub mod types;

// Re-export commonly used types at the crate root
pub use engine::{
    Matches, Operand, OperandResolver, OperatorRegistry, QueryCache, RecordFactory, Relation,
    TemporalMatch, TemporalOperator,
};
pub use graph::{BasicPattern, Binding, Triple};
pub use index::{Bounds, PersistentTemporalIndex, Range, RangeQueryIterator};
pub use types::{
    Extent, ExtentType, IndexConfig, IndexType, Instant, Interval, Literal, Node, Record,
    TemporalError, TemporalResult, MAX_TIME, MIN_TIME,
};
