use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::EmbedError;

/// How a request authenticates against an OpenAI-compatible endpoint.
pub(crate) enum Auth<'a> {
    /// `Authorization: Bearer <token>` (OpenAI keys, Entra ID tokens).
    Bearer(&'a str),
    /// `api-key: <key>` (Azure OpenAI resource keys).
    ApiKey(&'a str),
}

/// OpenAI-compatible embedding request body.
#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    dimensions: usize,
    encoding_format: &'a str,
}

/// OpenAI-compatible embedding response.
#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f64>,
}

/// Call an OpenAI-compatible embedding endpoint.
///
/// OpenAI and Azure OpenAI share the request/response format; they differ
/// in URL layout and auth header, which the caller supplies.
pub(crate) async fn call_embedding_api(
    client: &Client,
    url: &str,
    auth: Auth<'_>,
    model: &str,
    dimensions: usize,
    texts: &[&str],
) -> Result<Vec<Vec<f32>>, EmbedError> {
    let body = EmbeddingRequest {
        model,
        input: texts,
        dimensions,
        encoding_format: "float",
    };

    let req = match auth {
        Auth::Bearer(token) => client
            .post(url)
            .header("Authorization", format!("Bearer {token}")),
        Auth::ApiKey(key) => client.post(url).header("api-key", key),
    };

    let resp = req
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| EmbedError::Api(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(EmbedError::Api(format!("HTTP {status}: {body}")));
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| EmbedError::Api(e.to_string()))?;
    parse_embedding_response(&bytes, texts.len())
}

/// Decode a response body into vectors ordered by their `index` field.
pub(crate) fn parse_embedding_response(
    body: &[u8],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>, EmbedError> {
    let data: EmbeddingResponse =
        serde_json::from_slice(body).map_err(|e| EmbedError::Api(e.to_string()))?;

    // Fill results by index (API may return out of order).
    let mut vecs: Vec<Option<Vec<f32>>> = vec![None; batch_size];
    for item in data.data {
        if item.index >= batch_size {
            return Err(EmbedError::UnexpectedIndex {
                index: item.index,
                batch_size,
            });
        }
        vecs[item.index] = Some(item.embedding.iter().map(|&v| v as f32).collect());
    }

    vecs.into_iter()
        .enumerate()
        .map(|(i, v)| v.ok_or(EmbedError::MissingIndex(i)))
        .collect()
}
