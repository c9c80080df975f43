use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("embed: empty input")]
    EmptyInput,

    #[error("embed: invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("embed: API error: {0}")]
    Api(String),

    #[error("embed: authentication error: {0}")]
    Auth(String),

    #[error("embed: missing embedding for index {0}")]
    MissingIndex(usize),

    #[error("embed: unexpected embedding index {index} for batch size {batch_size}")]
    UnexpectedIndex { index: usize, batch_size: usize },

    #[error("embed: expected {expected} embeddings, got {got}")]
    CountMismatch { expected: usize, got: usize },

    #[error("embed: expected dimension {expected}, got {got} at position {position}")]
    DimensionMismatch {
        position: usize,
        expected: usize,
        got: usize,
    },
}

impl EmbedError {
    /// Returns true for errors caused by the caller's configuration
    /// rather than by the remote service.
    pub fn is_config(&self) -> bool {
        matches!(self, EmbedError::InvalidConfig(_) | EmbedError::EmptyInput)
    }
}
