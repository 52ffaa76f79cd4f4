use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unknown template variable: {{{0}}}")]
    UnknownTemplateVariable(String),

    #[error("unterminated template variable in '{0}'")]
    UnterminatedTemplateVariable(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
