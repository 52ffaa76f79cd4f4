use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("remote store fault: {0}")]
    ServerFault(String),

    #[error("unexpected response status: '{0}'")]
    UnexpectedStatus(u16),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] arbor_protocol::ProtocolError),

    #[error("type error: {0}")]
    Type(#[from] arbor_types::TypeError),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("exchange canceled: {0}")]
    Canceled(String),

    #[error("store client already closed")]
    Closed,

    #[error("flush of {count} buffered changes failed: {source}")]
    Flush {
        count: usize,
        #[source]
        source: Box<StoreError>,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
