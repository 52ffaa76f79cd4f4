use serde::{Deserialize, Serialize};

/// A contiguous slice of double values for one version of a series.
///
/// The chunk covers indices `offset .. offset + values.len()` of the
/// series' index. Chunks appended to the same version never shrink the
/// covered range; ordering is the append order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoubleDataChunk {
    pub offset: usize,
    pub values: Vec<f64>,
}

impl DoubleDataChunk {
    pub fn new(offset: usize, values: Vec<f64>) -> Self {
        Self { offset, values }
    }

    /// Number of points in the chunk.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First index past the end of the chunk.
    pub fn end_offset(&self) -> usize {
        self.offset + self.values.len()
    }
}

/// A contiguous slice of string values for one version of a series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringDataChunk {
    pub offset: usize,
    pub values: Vec<String>,
}

impl StringDataChunk {
    pub fn new(offset: usize, values: Vec<String>) -> Self {
        Self { offset, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn end_offset(&self) -> usize {
        self.offset + self.values.len()
    }
}
