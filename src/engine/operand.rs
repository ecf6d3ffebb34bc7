//! Resolving query nodes to extents.
//!
//! Resolution order for a node:
//!
//! 1. an extent cached earlier in the same query,
//! 2. the persistent store (or the literal itself, for literal nodes),
//! 3. temporal triples about the node in the query pattern.

use std::collections::HashMap;

use crate::format::literal::extent_from_literal;
use crate::graph::{with_predicate, BasicPattern, Binding, Triple};
use crate::index::PersistentTemporalIndex;
use crate::types::{Extent, Node, Record, TemporalResult, RDF_TYPE};

use super::operator::TemporalMatch;
use super::record_factory::{temporal_entity, TemporalField};

/// A query node paired with its extent, if one was found.
#[derive(Debug, Clone, PartialEq)]
pub struct Operand {
    node: Node,
    extent: Option<Extent>,
    used_triples: Vec<Triple>,
}

impl Operand {
    /// An unresolved operand.
    pub fn new(node: Node) -> Self {
        Self {
            node,
            extent: None,
            used_triples: Vec::new(),
        }
    }

    /// An operand with a known extent.
    pub fn bound(node: Node, extent: Extent) -> Self {
        Self {
            node,
            extent: Some(extent),
            used_triples: Vec::new(),
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn extent(&self) -> Option<&Extent> {
        self.extent.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.extent.is_some()
    }

    /// Pattern triples consumed while resolving this operand.
    pub fn used_triples(&self) -> &[Triple] {
        &self.used_triples
    }

    /// The operand as a record, when bound.
    pub fn record(&self) -> Option<Record> {
        self.extent.map(|e| Record::new(self.node.clone(), e))
    }
}

/// Extents resolved during one query evaluation.
#[derive(Debug, Default)]
pub struct QueryCache {
    extents: HashMap<Node, Extent>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node: &Node) -> Option<Extent> {
        self.extents.get(node).copied()
    }

    pub fn insert(&mut self, node: Node, extent: Extent) {
        self.extents.insert(node, extent);
    }

    /// Remember both sides of a produced match.
    pub fn record_match(&mut self, m: &TemporalMatch) {
        self.insert(m.first.node.clone(), m.first.extent);
        self.insert(m.second.node.clone(), m.second.extent);
    }

    pub fn len(&self) -> usize {
        self.extents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extents.is_empty()
    }

    pub fn clear(&mut self) {
        self.extents.clear();
    }
}

/// Resolves operands against an index.
pub struct OperandResolver<'a> {
    index: &'a PersistentTemporalIndex,
}

impl<'a> OperandResolver<'a> {
    pub fn new(index: &'a PersistentTemporalIndex) -> Self {
        Self { index }
    }

    /// Resolve `node` using only the cache and the store.
    pub fn resolve(
        &self,
        node: &Node,
        binding: &Binding,
        cache: &mut QueryCache,
    ) -> TemporalResult<Operand> {
        let mut op = Operand::new(node.clone());
        let value = binding.resolve(node).unwrap_or(node);
        op.extent = self.representation(value, cache)?;
        log::trace!("representation of {}: {:?}", node, op.extent);
        Ok(op)
    }

    /// Resolve `node`, falling back to temporal triples about it in `pattern`.
    pub fn resolve_in_pattern(
        &self,
        node: &Node,
        pattern: &BasicPattern,
        binding: &Binding,
        cache: &mut QueryCache,
    ) -> TemporalResult<Operand> {
        let op = self.resolve(node, binding, cache)?;
        if op.is_bound() {
            return Ok(op);
        }

        let about = pattern.with_subject(node);
        let mut used = Vec::new();
        for field in TemporalField::ALL {
            let candidates = with_predicate(&about, &field.predicate());
            if let Some(extent) = extract_extent(&candidates, binding, &mut used)? {
                used.push(type_triple(node, &temporal_entity()));
                used.push(type_triple(node, &field.entity_type()));
                cache.insert(node.clone(), extent);
                return Ok(Operand {
                    node: node.clone(),
                    extent: Some(extent),
                    used_triples: used,
                });
            }
        }
        Ok(Operand {
            node: node.clone(),
            extent: None,
            used_triples: used,
        })
    }

    fn representation(&self, node: &Node, cache: &mut QueryCache) -> TemporalResult<Option<Extent>> {
        if let Some(extent) = cache.get(node) {
            return Ok(Some(extent));
        }
        let found = match node {
            Node::Literal(literal) => extent_from_literal(literal)?,
            Node::Uri(_) | Node::Blank(_) => self.index.find(node)?.map(|r| r.extent),
            Node::Variable(_) => None,
        };
        if let Some(extent) = found {
            cache.insert(node.clone(), extent);
        }
        Ok(found)
    }
}

/// First temporal literal among `triples`, newest first. Every inspected
/// triple is recorded in `used`.
fn extract_extent(
    triples: &[&Triple],
    binding: &Binding,
    used: &mut Vec<Triple>,
) -> TemporalResult<Option<Extent>> {
    for triple in triples.iter().rev() {
        used.push((*triple).clone());
        let Some(Node::Literal(literal)) = binding.resolve(&triple.object) else {
            continue;
        };
        if let Some(extent) = extent_from_literal(literal)? {
            return Ok(Some(extent));
        }
    }
    Ok(None)
}

fn type_triple(node: &Node, class: &str) -> Triple {
    Triple::new(node.clone(), Node::uri(RDF_TYPE), Node::uri(class))
}
