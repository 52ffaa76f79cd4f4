use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Generic attribute map attached to every node.
///
/// Attributes are grouped by value type so the wire format stays
/// schema-free while values keep their native types. Keys are unique within
/// each group; `BTreeMap` keeps serialization order stable.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGenericMetadata {
    #[serde(default)]
    pub strings: BTreeMap<String, String>,
    #[serde(default)]
    pub doubles: BTreeMap<String, f64>,
    #[serde(default)]
    pub ints: BTreeMap<String, i64>,
    #[serde(default)]
    pub booleans: BTreeMap<String, bool>,
}

impl NodeGenericMetadata {
    /// Create an empty metadata map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a string attribute, chainable.
    pub fn set_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.strings.insert(key.into(), value.into());
        self
    }

    /// Set a double attribute, chainable.
    pub fn set_double(mut self, key: impl Into<String>, value: f64) -> Self {
        self.doubles.insert(key.into(), value);
        self
    }

    /// Set an integer attribute, chainable.
    pub fn set_int(mut self, key: impl Into<String>, value: i64) -> Self {
        self.ints.insert(key.into(), value);
        self
    }

    /// Set a boolean attribute, chainable.
    pub fn set_boolean(mut self, key: impl Into<String>, value: bool) -> Self {
        self.booleans.insert(key.into(), value);
        self
    }

    /// Total number of attributes across all groups.
    pub fn len(&self) -> usize {
        self.strings.len() + self.doubles.len() + self.ints.len() + self.booleans.len()
    }

    /// Returns `true` if no attribute is set.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
