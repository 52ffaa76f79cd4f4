use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Value type of a time series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeSeriesDataType {
    Double,
    String,
}

impl fmt::Display for TimeSeriesDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Double => write!(f, "double"),
            Self::String => write!(f, "string"),
        }
    }
}

/// Regular index describing the points a series covers.
///
/// `spacing` is the distance between consecutive points; all three fields
/// are epoch milliseconds. Point `i` sits at `start_time + i * spacing`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesIndex {
    pub start_time: i64,
    pub end_time: i64,
    pub spacing: i64,
}

impl TimeSeriesIndex {
    pub fn new(start_time: i64, end_time: i64, spacing: i64) -> Self {
        Self {
            start_time,
            end_time,
            spacing,
        }
    }

    /// Number of points the index spans.
    pub fn point_count(&self) -> usize {
        if self.spacing <= 0 || self.end_time < self.start_time {
            return 0;
        }
        ((self.end_time - self.start_time) / self.spacing + 1) as usize
    }
}

/// Immutable description of a named, typed time series owned by a node.
///
/// Created once per (node, name); data is then appended per integer version
/// as ordered chunks. Two versions of the same series are independent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesMetadata {
    pub name: String,
    pub data_type: TimeSeriesDataType,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    pub index: TimeSeriesIndex,
}

impl TimeSeriesMetadata {
    pub fn new(
        name: impl Into<String>,
        data_type: TimeSeriesDataType,
        index: TimeSeriesIndex,
    ) -> Self {
        Self {
            name: name.into(),
            data_type,
            tags: BTreeMap::new(),
            index,
        }
    }
}

/// Validate a time-series version number.
///
/// Versions are non-negative integers; anything else is rejected locally,
/// before any network call.
pub fn check_version(version: i64) -> Result<(), TypeError> {
    if version < 0 {
        return Err(TypeError::InvalidVersion(version));
    }
    Ok(())
}
