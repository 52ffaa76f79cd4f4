use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metadata::NodeGenericMetadata;

/// Opaque identifier of a node in the remote store.
///
/// Node IDs are assigned by the server and are globally unique within a
/// store instance. The client never interprets their contents.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap a server-assigned identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A tree entry in the remote store.
///
/// Every non-root node has exactly one parent; the `name` is unique among
/// siblings and the `pseudo_class` tags the node's logical type. Timestamps
/// are epoch milliseconds, as carried on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    pub pseudo_class: String,
    pub description: String,
    pub creation_time: i64,
    pub modification_time: i64,
    pub version: u64,
    pub generic_metadata: NodeGenericMetadata,
}

impl NodeInfo {
    /// Create a node description with empty metadata.
    pub fn new(
        id: impl Into<NodeId>,
        name: impl Into<String>,
        pseudo_class: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pseudo_class: pseudo_class.into(),
            description: String::new(),
            creation_time: 0,
            modification_time: 0,
            version: 0,
            generic_metadata: NodeGenericMetadata::new(),
        }
    }
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.pseudo_class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_roundtrip() {
        let id = NodeId::new("a1b2c3");
        assert_eq!(id.as_str(), "a1b2c3");
        assert_eq!(format!("{id}"), "a1b2c3");
    }

    #[test]
    fn node_id_serializes_transparently() {
        let id = NodeId::new("xyz");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"xyz\"");
        let parsed: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn node_info_wire_fields_are_camel_case() {
        let info = NodeInfo::new("n1", "case.db", "file");
        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("pseudoClass").is_some());
        assert!(json.get("creationTime").is_some());
        assert!(json.get("modificationTime").is_some());
        assert!(json.get("genericMetadata").is_some());
    }

    #[test]
    fn node_info_serde_roundtrip() {
        let mut info = NodeInfo::new("n1", "root", "folder");
        info.description = "top level".into();
        info.version = 3;
        let json = serde_json::to_string(&info).unwrap();
        let parsed: NodeInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, info);
    }

    #[test]
    fn display_shows_name_and_class() {
        let info = NodeInfo::new("n1", "a.txt", "file");
        assert_eq!(format!("{info}"), "a.txt (file)");
    }
}
