//! Shared HTTP client settings.

use std::time::Duration;

use crate::error::{Error, Result};

/// Request timeout for Entra ID and Key Vault calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Config(format!("http client: {e}")))
}
