use reqwest::Client;

use crate::config::EmbedConfig;
use crate::embed::{Embedder, EmbeddingRequest};
use crate::error::EmbedError;
use crate::openai_compat::{call_embedding_api, Auth};

/// OpenAI embedding models.
pub const MODEL_OPENAI_3_SMALL: &str = "text-embedding-3-small";
pub const MODEL_OPENAI_3_LARGE: &str = "text-embedding-3-large";
pub const MODEL_OPENAI_ADA_002: &str = "text-embedding-ada-002";

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Largest input array the embeddings endpoint accepts in one call.
pub const OPENAI_MAX_BATCH: usize = 2048;

pub const DEFAULT_MODEL: &str = MODEL_OPENAI_3_LARGE;
pub const DEFAULT_DIMENSION: usize = 1024;

/// OpenAI embedder using the OpenAI embeddings API.
///
/// Also works with any OpenAI-compatible provider via `with_config`
/// and `EmbedConfig::with_base_url`.
pub struct OpenAI {
    client: Client,
    api_key: String,
    model: String,
    dim: usize,
    base_url: String,
}

impl OpenAI {
    pub fn new(api_key: &str) -> Result<Self, EmbedError> {
        Self::with_config(api_key, EmbedConfig::default())
    }

    pub fn with_config(api_key: &str, cfg: EmbedConfig) -> Result<Self, EmbedError> {
        Ok(Self {
            client: cfg.http_client()?,
            api_key: api_key.to_string(),
            model: cfg.model_or(DEFAULT_MODEL),
            dim: cfg.dimension_or(DEFAULT_DIMENSION),
            base_url: cfg.base_url_or(OPENAI_BASE_URL),
        })
    }
}

#[async_trait::async_trait]
impl Embedder for OpenAI {
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
        let url = format!("{}/embeddings", self.base_url);
        call_embedding_api(
            &self.client,
            &url,
            Auth::Bearer(&self.api_key),
            req.model,
            req.dimensions,
            req.texts,
        )
        .await
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Err(EmbedError::EmptyInput);
        }

        let mut result = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(OPENAI_MAX_BATCH) {
            let vecs = self
                .create(EmbeddingRequest {
                    texts: chunk,
                    model: &self.model,
                    dimensions: self.dim,
                })
                .await?;
            result.extend(vecs);
        }
        Ok(result)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_pipeline_settings() {
        let e = OpenAI::new("sk-test").unwrap();
        assert_eq!(e.model(), MODEL_OPENAI_3_LARGE);
        assert_eq!(e.dimension(), 1024);
    }

    #[tokio::test]
    async fn create_rejects_empty_input() {
        let e = OpenAI::new("sk-test").unwrap();
        let err = e
            .create(EmbeddingRequest {
                texts: &[],
                model: MODEL_OPENAI_3_SMALL,
                dimensions: 8,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EmbedError::EmptyInput));
    }

    #[tokio::test]
    async fn unresponsive_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((sock, _)) = listener.accept().await {
                held.push(sock);
            }
        });

        let cfg = EmbedConfig::default()
            .with_base_url(&format!("http://{addr}/v1"))
            .with_timeout_secs(1);
        let e = OpenAI::with_config("sk-test", cfg).unwrap();
        let err = e.embed("hei").await.unwrap_err();

        assert!(matches!(err, EmbedError::Api(_)));
        assert!(!err.is_config());
        server.abort();
    }
}
