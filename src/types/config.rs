//! Index configuration.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{TemporalError, TemporalResult};

/// Property key selecting the index implementation.
pub const INDEX_TYPE: &str = "indexType";
/// Property key forcing starts-index scans and nested-loop evaluation.
pub const ALWAYS_USE_FIRST: &str = "alwaysUseFirst";
/// Property key permitting evaluation with both operands unbound.
pub const ALLOW_UNBOUND: &str = "allowUnbound";

/// Backing implementation of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    Persistent,
    Memory,
}

impl FromStr for IndexType {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "persistent" => Ok(IndexType::Persistent),
            "memory" => Ok(IndexType::Memory),
            other => Err(TemporalError::InvalidConfig(format!(
                "unrecognized {}: {:?}",
                INDEX_TYPE, other
            ))),
        }
    }
}

fn default_allow_unbound() -> bool {
    true
}

/// Settings read when an index is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexConfig {
    pub index_type: IndexType,
    /// Skip cost-based index selection and force nested-loop evaluation.
    #[serde(default)]
    pub always_use_first: bool,
    /// When false, evaluating a relation with neither side bound is an error.
    #[serde(default = "default_allow_unbound")]
    pub allow_unbound: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            index_type: IndexType::Persistent,
            always_use_first: false,
            allow_unbound: true,
        }
    }
}

impl IndexConfig {
    /// Build from string key/value properties. `indexType` is required.
    pub fn from_properties(props: &HashMap<String, String>) -> TemporalResult<Self> {
        let index_type = props
            .get(INDEX_TYPE)
            .ok_or_else(|| TemporalError::InvalidConfig(format!("missing {}", INDEX_TYPE)))?
            .parse()?;
        Ok(Self {
            index_type,
            always_use_first: parse_flag(props, ALWAYS_USE_FIRST, false)?,
            allow_unbound: parse_flag(props, ALLOW_UNBOUND, true)?,
        })
    }

    /// Parse a JSON object with the same keys as the properties form.
    pub fn from_json(text: &str) -> TemporalResult<Self> {
        serde_json::from_str(text).map_err(|e| TemporalError::InvalidConfig(e.to_string()))
    }
}

fn parse_flag(props: &HashMap<String, String>, key: &str, default: bool) -> TemporalResult<bool> {
    match props.get(key) {
        None => Ok(default),
        Some(v) => v.trim().parse::<bool>().map_err(|_| {
            TemporalError::InvalidConfig(format!("{} must be true or false, got {:?}", key, v))
        }),
    }
}
