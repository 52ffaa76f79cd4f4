//! Remote access layer for the Arbor store.
//!
//! [`RemoteStore`] presents the full node/dependency/attachment/time-series
//! operation set of a remote store as ordinary async calls. Under the hood,
//! three mechanisms keep it fast without breaking the caller's ordering:
//!
//! - a [`ChangeBuffer`] that coalesces high-volume time-series mutations
//!   into batched flush requests, forced out before any unbuffered mutation;
//! - a [`GzipTransport`] layer that compresses request bodies and
//!   decompresses responses, invisible to the operations above it;
//! - a [`DataWriter`] that streams attachment uploads and commits on close.
//!
//! ```rust,no_run
//! use arbor_client::{RemoteStore, StoreConfig};
//!
//! # async fn example() -> Result<(), arbor_client::StoreError> {
//! let store = RemoteStore::new(StoreConfig {
//!     base_url: "http://localhost:8080".into(),
//!     store: "grid".into(),
//!     ..Default::default()
//! })?;
//!
//! let root = store.create_root_node("root", "folder").await?;
//! let children = store.get_child_nodes(&root.id).await?;
//! store.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod config;
pub mod download;
pub mod error;
pub mod request;
pub mod store;
pub mod transport;
pub mod upload;

pub use buffer::{ChangeBuffer, ChangeSink};
pub use config::StoreConfig;
pub use download::DataReader;
pub use error::{StoreError, StoreResult};
pub use request::RequestBuilder;
pub use store::RemoteStore;
pub use transport::{GzipTransport, HttpTransport, Transport, WireRequest, WireResponse};
pub use upload::DataWriter;
