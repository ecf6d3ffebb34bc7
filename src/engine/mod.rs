//! Query-time evaluation: relations, operators, and operand resolution.

pub mod operand;
pub mod operator;
pub mod record_factory;
pub mod registry;
pub mod relation;

pub use operand::{Operand, OperandResolver, QueryCache};
pub use operator::{BoundVarIterator, Matches, NestedLoopIterator, Side, TemporalMatch, TemporalOperator};
pub use record_factory::{RecordFactory, TemporalField};
pub use registry::OperatorRegistry;
pub use relation::{lookup, Relation, RELATIONS};
