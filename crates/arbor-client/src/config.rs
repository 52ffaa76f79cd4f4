use serde::{Deserialize, Serialize};

/// Connection settings for one remote store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the remote endpoint, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Logical store name addressed by every operation.
    pub store: String,
    /// Bearer token sent as the `Authorization` header, if any.
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Change-buffer flush threshold, in buffered changes.
    pub max_buffered_changes: usize,
    /// Change-buffer flush threshold, in estimated serialized bytes.
    pub max_buffered_bytes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            store: String::new(),
            token: None,
            timeout_secs: 30,
            max_buffered_changes: 1000,
            max_buffered_bytes: 1 << 20,
        }
    }
}
