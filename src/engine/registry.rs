//! Relation name → descriptor lookup owned by one index instance.

use std::collections::HashMap;

use super::relation::{Relation, RELATIONS};

/// Registered relations, keyed by local name and by full IRI.
#[derive(Debug, Default)]
pub struct OperatorRegistry {
    relations: HashMap<String, &'static Relation>,
}

impl OperatorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every known relation.
    pub fn register_all(&mut self) {
        for relation in RELATIONS {
            self.register(relation);
        }
        log::debug!("registered {} temporal relations", RELATIONS.len());
    }

    pub fn register(&mut self, relation: &'static Relation) {
        self.relations.insert(relation.name.to_string(), relation);
        self.relations.insert(relation.iri(), relation);
    }

    pub fn get(&self, name: &str) -> Option<&'static Relation> {
        self.relations.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    /// Registered relations, sorted by local name.
    pub fn relations(&self) -> Vec<&'static Relation> {
        let mut out: Vec<&'static Relation> = self
            .relations
            .iter()
            .filter(|(k, r)| k.as_str() == r.name)
            .map(|(_, r)| *r)
            .collect();
        out.sort_by_key(|r| r.name);
        out
    }

    pub fn clear(&mut self) {
        self.relations.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TIME_NS;

    #[test]
    fn register_and_clear() {
        let mut reg = OperatorRegistry::new();
        assert!(reg.get("intervalOverlaps").is_none());

        reg.register_all();
        assert!(reg.contains("intervalOverlaps"));
        assert!(reg.contains(&format!("{}intervalOverlaps", TIME_NS)));
        assert_eq!(reg.relations().len(), RELATIONS.len());

        reg.clear();
        assert!(reg.is_empty());
    }
}
