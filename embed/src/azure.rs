use std::sync::Arc;

use reqwest::Client;

use crate::config::EmbedConfig;
use crate::embed::{Embedder, EmbeddingRequest};
use crate::error::EmbedError;
use crate::openai::{DEFAULT_DIMENSION, DEFAULT_MODEL, OPENAI_MAX_BATCH};
use crate::openai_compat::{call_embedding_api, Auth};

/// Default Azure OpenAI data-plane API version.
pub const DEFAULT_API_VERSION: &str = "2024-08-01-preview";

/// Source of bearer tokens for Entra ID authentication.
///
/// Implementations are expected to cache tokens and refresh them
/// before they expire.
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync {
    async fn bearer_token(&self) -> Result<String, EmbedError>;
}

/// Authentication mode for an Azure OpenAI resource.
#[derive(Clone)]
pub enum AzureAuth {
    /// Resource key sent in the `api-key` header.
    ApiKey(String),
    /// Entra ID bearer token fetched per request.
    Token(Arc<dyn TokenSource>),
}

impl std::fmt::Debug for AzureAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AzureAuth::ApiKey(_) => f.write_str("ApiKey(***)"),
            AzureAuth::Token(_) => f.write_str("Token"),
        }
    }
}

/// Azure OpenAI embedder.
///
/// The model name of a request is the deployment name on the resource.
pub struct AzureOpenAI {
    client: Client,
    endpoint: String,
    api_version: String,
    auth: AzureAuth,
    model: String,
    dim: usize,
}

impl AzureOpenAI {
    pub fn new(endpoint: &str, api_version: &str, auth: AzureAuth) -> Result<Self, EmbedError> {
        Self::with_config(api_version, auth, EmbedConfig::default().with_base_url(endpoint))
    }

    /// Build from a config whose `base_url` is the resource endpoint.
    pub fn with_config(
        api_version: &str,
        auth: AzureAuth,
        cfg: EmbedConfig,
    ) -> Result<Self, EmbedError> {
        if cfg.base_url.is_empty() {
            return Err(EmbedError::InvalidConfig(
                "azure openai endpoint must be provided".to_string(),
            ));
        }
        Ok(Self {
            client: cfg.http_client()?,
            endpoint: cfg.base_url_or(""),
            api_version: api_version.to_string(),
            auth,
            model: cfg.model_or(DEFAULT_MODEL),
            dim: cfg.dimension_or(DEFAULT_DIMENSION),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn auth(&self) -> &AzureAuth {
        &self.auth
    }

    pub(crate) fn embeddings_url(&self, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/embeddings?api-version={}",
            self.endpoint, deployment, self.api_version
        )
    }
}

#[async_trait::async_trait]
impl Embedder for AzureOpenAI {
    async fn create(&self, req: EmbeddingRequest<'_>) -> Result<Vec<Vec<f32>>, EmbedError> {
        if req.texts.is_empty() {
            return Err(EmbedError::EmptyInput);
        }
        if req.texts.len() > OPENAI_MAX_BATCH {
            return Err(EmbedError::InvalidConfig(format!(
                "at most {OPENAI_MAX_BATCH} inputs per call, got {}",
                req.texts.len()
            )));
        }

        let url = self.embeddings_url(req.model);
        match &self.auth {
            AzureAuth::ApiKey(key) => {
                call_embedding_api(
                    &self.client,
                    &url,
                    Auth::ApiKey(key),
                    req.model,
                    req.dimensions,
                    req.texts,
                )
                .await
            }
            AzureAuth::Token(source) => {
                let token = source.bearer_token().await?;
                call_embedding_api(
                    &self.client,
                    &url,
                    Auth::Bearer(&token),
                    req.model,
                    req.dimensions,
                    req.texts,
                )
                .await
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn max_batch_size(&self) -> Option<usize> {
        Some(OPENAI_MAX_BATCH)
    }
}
