//! Data types for the temporal index.

pub mod config;
pub mod error;
pub mod extent;
pub mod node;
pub mod record;

pub use config::{IndexConfig, IndexType};
pub use error::{TemporalError, TemporalResult};
pub use extent::{Endpoint, Extent, ExtentType, Instant, Interval, MAX_TIME, MIN_TIME};
pub use node::{parse_node_arg, Literal, Node, BLANK_NODE_PREFIX};
pub use record::Record;

/// OWL-Time namespace: relation and entity type IRIs.
pub const TIME_NS: &str = "http://www.w3.org/2006/time#";

/// Namespace of the temporal literal predicates and datatypes.
pub const PT_NS: &str = "http://parliament.semwebcentral.org/pt#";

/// XML Schema namespace.
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

/// `rdf:type`.
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Size in bytes of an encoded extent.
pub const EXTENT_SIZE: usize = 16;
