use serde::{Deserialize, Serialize};

use crate::node::NodeInfo;

/// A named, directed edge from one node to another.
///
/// The `(source, name, target)` triple is unique in the store; the source is
/// implicit (the node the dependency was listed from), so only the name and
/// the target node travel on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDependency {
    pub name: String,
    pub node_info: NodeInfo,
}

impl NodeDependency {
    pub fn new(name: impl Into<String>, node_info: NodeInfo) -> Self {
        Self {
            name: name.into(),
            node_info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip() {
        let dep = NodeDependency::new("input", NodeInfo::new("n2", "data.csv", "file"));
        let json = serde_json::to_string(&dep).unwrap();
        let parsed: NodeDependency = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, dep);
    }

    #[test]
    fn wire_field_is_node_info() {
        let dep = NodeDependency::new("case", NodeInfo::new("n9", "a", "b"));
        let json = serde_json::to_value(&dep).unwrap();
        assert!(json.get("nodeInfo").is_some());
    }
}
