//! Index records: a node paired with its extent.

use serde::Serialize;

use super::extent::Extent;
use super::node::Node;

/// A node and the temporal extent the index stores for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Record {
    pub node: Node,
    pub extent: Extent,
}

impl Record {
    pub fn new(node: Node, extent: Extent) -> Self {
        Self { node, extent }
    }
}
