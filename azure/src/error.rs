//! Error types for Azure credential and secret operations.

use thiserror::Error;

/// Result type alias for Azure operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Azure operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration. Never retried.
    #[error("azure: invalid configuration: {0}")]
    Config(String),

    /// A credential could not produce a token.
    #[error("azure: credential error: {0}")]
    Credential(String),

    /// Non-success response from an Azure service.
    #[error("azure: {message} (http_status={status})")]
    Api { status: u16, message: String },

    /// HTTP request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}
