use crate::error::EmbedError;

/// A single embedding call: the texts, in order, plus the model and the
/// requested output dimensionality.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddingRequest<'a> {
    pub texts: &'a [&'a str],
    pub model: &'a str,
    pub dimensions: usize,
}

/// Embedder converts text into dense float32 vectors.
///
/// Implementations must be safe for concurrent use (Send + Sync).
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    /// Issue exactly one remote call for `req` and return one vector per
    /// text, in request order.
    async fn create(&self, req: EmbeddingRequest<'_>) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Return the embedding vector for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if text.is_empty() {
            return Err(EmbedError::EmptyInput);
        }
        let vecs = self.embed_batch(&[text]).await?;
        vecs.into_iter().next().ok_or(EmbedError::MissingIndex(0))
    }

    /// Return embedding vectors for multiple texts using the embedder's
    /// own model and dimension.
    /// Implementations may split large batches into smaller API calls.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Err(EmbedError::EmptyInput);
        }
        self.create(EmbeddingRequest {
            texts,
            model: self.model(),
            dimensions: self.dimension(),
        })
        .await
    }

    /// Return the default model name.
    fn model(&self) -> &str;

    /// Return the dimensionality of the output vectors.
    fn dimension(&self) -> usize;

    /// Largest number of texts a single `create` call accepts, if bounded.
    fn max_batch_size(&self) -> Option<usize> {
        None
    }
}
