//! Recognition of temporal-entity triples.

use crate::format::literal::extent_from_literal;
use crate::graph::Triple;
use crate::types::{Extent, Node, Record, TemporalResult, PT_NS, TIME_NS};

/// A predicate whose object literal carries an extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalField {
    /// `pt:asInstant` with an `xsd:dateTime` object.
    AsInstant,
    /// `pt:asInterval` with a `pt:intervalLiteral` object.
    AsInterval,
}

impl TemporalField {
    pub const ALL: [TemporalField; 2] = [TemporalField::AsInstant, TemporalField::AsInterval];

    pub fn predicate(&self) -> String {
        match self {
            TemporalField::AsInstant => format!("{}asInstant", PT_NS),
            TemporalField::AsInterval => format!("{}asInterval", PT_NS),
        }
    }

    /// OWL-Time class of the subject.
    pub fn entity_type(&self) -> String {
        match self {
            TemporalField::AsInstant => format!("{}Instant", TIME_NS),
            TemporalField::AsInterval => format!("{}ProperInterval", TIME_NS),
        }
    }

    pub fn for_predicate(predicate: &Node) -> Option<TemporalField> {
        match predicate {
            Node::Uri(p) => Self::ALL.into_iter().find(|f| f.predicate() == *p),
            _ => None,
        }
    }
}

/// IRI of `time:TemporalEntity`.
pub fn temporal_entity() -> String {
    format!("{}TemporalEntity", TIME_NS)
}

/// Turns recognized triples into index records.
pub struct RecordFactory;

impl RecordFactory {
    /// Predicates this factory recognizes.
    pub fn matchers() -> Vec<String> {
        TemporalField::ALL.iter().map(|f| f.predicate()).collect()
    }

    /// Record for `triple`, or `None` if it does not describe a temporal entity.
    pub fn create_record(triple: &Triple) -> TemporalResult<Option<Record>> {
        if TemporalField::for_predicate(&triple.predicate).is_none() {
            return Ok(None);
        }
        if !matches!(triple.subject, Node::Uri(_) | Node::Blank(_)) {
            return Ok(None);
        }
        match Self::extent_of(&triple.object)? {
            Some(extent) => {
                log::trace!("recognized temporal triple {}", triple);
                Ok(Some(Record::new(triple.subject.clone(), extent)))
            }
            None => {
                log::debug!("no temporal literal in {}", triple);
                Ok(None)
            }
        }
    }

    fn extent_of(object: &Node) -> TemporalResult<Option<Extent>> {
        match object.as_literal() {
            Some(literal) => extent_from_literal(literal),
            None => Ok(None),
        }
    }
}
