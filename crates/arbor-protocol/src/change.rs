use serde::{Deserialize, Serialize};

use arbor_types::{DoubleDataChunk, NodeId, StringDataChunk, TimeSeriesMetadata};

use crate::error::{ProtocolError, ProtocolResult};

/// A deferrable mutation buffered by the client and shipped in a
/// [`StorageChangeSet`].
///
/// Only the high-volume time-series mutations are deferrable; every other
/// mutation goes straight over the wire. The JSON tag matches the remote
/// contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StorageChange {
    #[serde(rename_all = "camelCase")]
    TimeSeriesCreation {
        node_id: NodeId,
        metadata: TimeSeriesMetadata,
    },
    #[serde(rename_all = "camelCase")]
    DoubleTimeSeriesChunksAddition {
        node_id: NodeId,
        version: i64,
        time_series_name: String,
        chunks: Vec<DoubleDataChunk>,
    },
    #[serde(rename_all = "camelCase")]
    StringTimeSeriesChunksAddition {
        node_id: NodeId,
        version: i64,
        time_series_name: String,
        chunks: Vec<StringDataChunk>,
    },
}

impl StorageChange {
    /// Serialized JSON size of this change, in bytes.
    ///
    /// Used by the change buffer to evaluate its byte threshold; this is an
    /// estimate of the flush request's share for this change, not of the
    /// compressed wire size.
    pub fn estimated_size(&self) -> ProtocolResult<usize> {
        let bytes = serde_json::to_vec(self)
            .map_err(|e| ProtocolError::Serialization(e.to_string()))?;
        Ok(bytes.len())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::TimeSeriesCreation { .. } => "TimeSeriesCreation",
            Self::DoubleTimeSeriesChunksAddition { .. } => "DoubleTimeSeriesChunksAddition",
            Self::StringTimeSeriesChunksAddition { .. } => "StringTimeSeriesChunksAddition",
        }
    }

    /// The node the change applies to.
    pub fn node_id(&self) -> &NodeId {
        match self {
            Self::TimeSeriesCreation { node_id, .. }
            | Self::DoubleTimeSeriesChunksAddition { node_id, .. }
            | Self::StringTimeSeriesChunksAddition { node_id, .. } => node_id,
        }
    }
}

/// An ordered batch of changes, sent as one request and acknowledged
/// atomically: the remote store accepts all of it or the flush fails as a
/// whole.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageChangeSet {
    pub changes: Vec<StorageChange>,
}

impl StorageChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
