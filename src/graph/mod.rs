//! Minimal graph vocabulary shared with the enclosing triple store.

pub mod pattern;
pub mod triple;

pub use pattern::{with_predicate, BasicPattern};
pub use triple::{Binding, Triple};
