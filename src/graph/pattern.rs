//! Basic graph patterns: the triples of one query block.

use crate::types::Node;

use super::triple::Triple;

/// An ordered list of triple patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicPattern {
    triples: Vec<Triple>,
}

impl BasicPattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, triple: Triple) {
        self.triples.push(triple);
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// Triples whose subject is `subject`.
    pub fn with_subject(&self, subject: &Node) -> Vec<&Triple> {
        self.triples.iter().filter(|t| t.subject == *subject).collect()
    }

    /// Patterns not in `used`.
    pub fn without(&self, used: &[Triple]) -> BasicPattern {
        self.triples
            .iter()
            .filter(|t| !used.contains(t))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }
}

impl FromIterator<Triple> for BasicPattern {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

/// Of `triples`, those with predicate `iri`.
pub fn with_predicate<'a>(triples: &[&'a Triple], iri: &str) -> Vec<&'a Triple> {
    triples
        .iter()
        .copied()
        .filter(|t| t.has_predicate(iri))
        .collect()
}
