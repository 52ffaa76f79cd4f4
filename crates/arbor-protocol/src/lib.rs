//! Wire contract between the Arbor client and the remote store.
//!
//! Defines the REST endpoint templates, the batched [`StorageChangeSet`]
//! submitted by the change buffer, and the transport conventions (success
//! status, gzip content encoding) every exchange follows. The crate holds
//! types and constants only; issuing requests is the client's job.

pub mod change;
pub mod endpoint;
pub mod error;

pub use change::{StorageChange, StorageChangeSet};
pub use endpoint::{endpoints, expand, status, API_VERSION, GZIP_ENCODING, REST_PREFIX};
pub use error::{ProtocolError, ProtocolResult};
