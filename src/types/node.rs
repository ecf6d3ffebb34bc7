//! Graph nodes and their byte-key encoding.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{TemporalError, TemporalResult};

/// Prefix marking a blank-node key in the store.
pub const BLANK_NODE_PREFIX: &str = "~@#$BNODE";

/// A literal value with an optional datatype IRI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub lexical: String,
    pub datatype: Option<String>,
}

impl Literal {
    pub fn new(lexical: impl Into<String>, datatype: Option<&str>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: datatype.map(str::to_string),
        }
    }

    pub fn typed(lexical: impl Into<String>, datatype: &str) -> Self {
        Self::new(lexical, Some(datatype))
    }
}

/// A term in a triple or a query pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Node {
    Uri(String),
    Blank(String),
    Literal(Literal),
    Variable(String),
}

impl Node {
    pub fn uri(s: impl Into<String>) -> Self {
        Node::Uri(s.into())
    }

    pub fn blank(s: impl Into<String>) -> Self {
        Node::Blank(s.into())
    }

    pub fn var(s: impl Into<String>) -> Self {
        Node::Variable(s.into())
    }

    pub fn literal(lexical: impl Into<String>, datatype: &str) -> Self {
        Node::Literal(Literal::typed(lexical, datatype))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Node::Variable(_))
    }

    /// Everything except a variable is concrete.
    pub fn is_concrete(&self) -> bool {
        !self.is_variable()
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Node::Literal(l) => Some(l),
            _ => None,
        }
    }

    /// Store key for a resource node: the IRI, or the prefixed blank label.
    pub fn to_key(&self) -> TemporalResult<Vec<u8>> {
        match self {
            Node::Uri(u) => Ok(u.as_bytes().to_vec()),
            Node::Blank(b) => {
                let mut key = Vec::with_capacity(BLANK_NODE_PREFIX.len() + b.len());
                key.extend_from_slice(BLANK_NODE_PREFIX.as_bytes());
                key.extend_from_slice(b.as_bytes());
                Ok(key)
            }
            other => Err(TemporalError::InvalidArgument(format!(
                "{} cannot be used as an index key",
                other
            ))),
        }
    }

    /// Inverse of [`Node::to_key`].
    pub fn from_key(key: &[u8]) -> Self {
        let s = String::from_utf8_lossy(key);
        match s.strip_prefix(BLANK_NODE_PREFIX) {
            Some(label) => Node::Blank(label.to_string()),
            None => Node::Uri(s.into_owned()),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Uri(u) => write!(f, "<{}>", u),
            Node::Blank(b) => write!(f, "_:{}", b),
            Node::Literal(l) => match &l.datatype {
                Some(dt) => write!(f, "\"{}\"^^<{}>", l.lexical, dt),
                None => write!(f, "\"{}\"", l.lexical),
            },
            Node::Variable(v) => write!(f, "?{}", v),
        }
    }
}

/// Parse a command-line node argument: `_:label` is blank, anything else an IRI.
pub fn parse_node_arg(arg: &str) -> Node {
    match arg.strip_prefix("_:") {
        Some(label) => Node::blank(label),
        None => Node::uri(arg.trim_start_matches('<').trim_end_matches('>')),
    }
}
