use std::time::Duration;

/// Request timeout used when `timeout_secs` is zero.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder-style configuration for embedder implementations.
///
/// Empty or zero fields fall back to the embedder's defaults.
#[derive(Debug, Clone, Default)]
pub struct EmbedConfig {
    pub model: String,
    pub dimension: usize,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl EmbedConfig {
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_dimension(mut self, dim: usize) -> Self {
        self.dimension = dim;
        self
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub(crate) fn model_or(&self, default: &str) -> String {
        if self.model.is_empty() {
            default.to_string()
        } else {
            self.model.clone()
        }
    }

    pub(crate) fn dimension_or(&self, default: usize) -> usize {
        if self.dimension == 0 {
            default
        } else {
            self.dimension
        }
    }

    pub(crate) fn base_url_or(&self, default: &str) -> String {
        if self.base_url.is_empty() {
            default.to_string()
        } else {
            self.base_url.trim_end_matches('/').to_string()
        }
    }

    pub(crate) fn timeout(&self) -> Duration {
        if self.timeout_secs == 0 {
            DEFAULT_TIMEOUT
        } else {
            Duration::from_secs(self.timeout_secs)
        }
    }

    pub(crate) fn http_client(&self) -> Result<reqwest::Client, crate::EmbedError> {
        reqwest::Client::builder()
            .timeout(self.timeout())
            .build()
            .map_err(|e| crate::EmbedError::InvalidConfig(e.to_string()))
    }
}
