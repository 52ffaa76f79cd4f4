use thiserror::Error;

/// Errors produced by local type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid time series version: {0}")]
    InvalidVersion(i64),
}
