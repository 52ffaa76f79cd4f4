use serde::{Deserialize, Serialize};

use arbor_types::NodeId;

/// A single change observed on the remote node tree.
///
/// Events are produced by the store for every committed mutation, batched,
/// and delivered to node-event subscribers in arrival order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeEvent {
    #[serde(rename_all = "camelCase")]
    NodeCreated { id: NodeId, parent_id: Option<NodeId> },
    #[serde(rename_all = "camelCase")]
    NodeRemoved { id: NodeId, parent_id: Option<NodeId> },
    #[serde(rename_all = "camelCase")]
    NodeDescriptionUpdated { id: NodeId, description: String },
    #[serde(rename_all = "camelCase")]
    NodeNameUpdated { id: NodeId, name: String },
    #[serde(rename_all = "camelCase")]
    ParentChanged { id: NodeId },
    #[serde(rename_all = "camelCase")]
    DependencyAdded { id: NodeId, dependency_name: String },
    #[serde(rename_all = "camelCase")]
    DependencyRemoved { id: NodeId, dependency_name: String },
    #[serde(rename_all = "camelCase")]
    NodeDataUpdated { id: NodeId, data_name: String },
    #[serde(rename_all = "camelCase")]
    NodeDataRemoved { id: NodeId, data_name: String },
    #[serde(rename_all = "camelCase")]
    TimeSeriesCreated { id: NodeId, time_series_name: String },
    #[serde(rename_all = "camelCase")]
    TimeSeriesDataUpdated { id: NodeId, time_series_name: String },
    #[serde(rename_all = "camelCase")]
    TimeSeriesCleared { id: NodeId },
}

impl NodeEvent {
    /// The node the event concerns.
    pub fn id(&self) -> &NodeId {
        match self {
            Self::NodeCreated { id, .. }
            | Self::NodeRemoved { id, .. }
            | Self::NodeDescriptionUpdated { id, .. }
            | Self::NodeNameUpdated { id, .. }
            | Self::ParentChanged { id }
            | Self::DependencyAdded { id, .. }
            | Self::DependencyRemoved { id, .. }
            | Self::NodeDataUpdated { id, .. }
            | Self::NodeDataRemoved { id, .. }
            | Self::TimeSeriesCreated { id, .. }
            | Self::TimeSeriesDataUpdated { id, .. }
            | Self::TimeSeriesCleared { id } => id,
        }
    }
}

/// A batch of node events delivered as one message.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeEventList {
    pub events: Vec<NodeEvent>,
}

impl NodeEventList {
    pub fn new(events: Vec<NodeEvent>) -> Self {
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
