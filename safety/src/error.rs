//! Error types for the Content Safety client.

use thiserror::Error;

use crate::types::TextCategory;

/// Result type alias for Content Safety operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Content Safety operations.
///
/// [`Error::Config`] is the caller's to fix. Everything else describes a
/// failed or unusable remote call.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration.
    #[error("content safety: invalid configuration: {0}")]
    Config(String),

    /// No token could be obtained for the service.
    #[error("content safety: credential error: {0}")]
    Credential(String),

    /// Error response from the service.
    #[error("content safety: {code} - {message} (http_status={http_status})")]
    Api {
        code: String,
        message: String,
        http_status: u16,
    },

    /// The response did not contain the requested category.
    #[error("content safety: no analysis for category {0:?}")]
    MissingCategory(TextCategory),

    /// HTTP request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Returns true if this is a rate limit error.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Error::Api { http_status: 429, .. })
    }
}

impl From<newsdesk_azure::Error> for Error {
    fn from(e: newsdesk_azure::Error) -> Self {
        match e {
            newsdesk_azure::Error::Config(msg) => Error::Config(msg),
            other => Error::Credential(other.to_string()),
        }
    }
}
