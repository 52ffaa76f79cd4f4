//! Foundation types for the Arbor store.
//!
//! This crate provides the data model shared by every other Arbor crate:
//! the node tree, generic metadata attributes, inter-node dependencies, and
//! the versioned time-series model.
//!
//! # Key Types
//!
//! - [`NodeId`] — Opaque, server-assigned node identifier
//! - [`NodeInfo`] — A tree entry: name, pseudo-class, description, version,
//!   timestamps, and generic metadata
//! - [`NodeGenericMetadata`] — Typed attribute maps (string/double/int/bool)
//! - [`NodeDependency`] — A named, directed edge between two nodes
//! - [`TimeSeriesMetadata`] — Immutable description of a named, typed series
//! - [`DoubleDataChunk`] / [`StringDataChunk`] — Contiguous slices of
//!   time-series data for one version of a series

pub mod chunk;
pub mod dependency;
pub mod error;
pub mod metadata;
pub mod node;
pub mod timeseries;

pub use chunk::{DoubleDataChunk, StringDataChunk};
pub use dependency::NodeDependency;
pub use error::TypeError;
pub use metadata::NodeGenericMetadata;
pub use node::{NodeId, NodeInfo};
pub use timeseries::{check_version, TimeSeriesDataType, TimeSeriesIndex, TimeSeriesMetadata};
