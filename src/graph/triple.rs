//! Triples and variable bindings.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::types::Node;

/// A subject-predicate-object statement, or a pattern when any term is a variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Triple {
    pub subject: Node,
    pub predicate: Node,
    pub object: Node,
}

impl Triple {
    pub fn new(subject: Node, predicate: Node, object: Node) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Whether the predicate is the IRI `iri`.
    pub fn has_predicate(&self, iri: &str) -> bool {
        matches!(&self.predicate, Node::Uri(p) if p == iri)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// Variable name → value assignments produced so far in a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    values: HashMap<String, Node>,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value bound to `var` (a `Node::Variable` or a bare name).
    pub fn get(&self, var: &Node) -> Option<&Node> {
        match var {
            Node::Variable(name) => self.values.get(name),
            _ => None,
        }
    }

    pub fn bind(&mut self, name: impl Into<String>, value: Node) {
        self.values.insert(name.into(), value);
    }

    /// Builder form of [`Binding::bind`].
    pub fn with(mut self, name: impl Into<String>, value: Node) -> Self {
        self.bind(name, value);
        self
    }

    /// Replace a variable with its value; other nodes pass through.
    pub fn resolve<'a>(&'a self, node: &'a Node) -> Option<&'a Node> {
        if node.is_variable() {
            self.get(node)
        } else {
            Some(node)
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
