//! Azure AI Content Safety REST client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

use newsdesk_azure::env::COGNITIVE_SERVICES_SCOPE;
use newsdesk_azure::{BearerTokenProvider, TokenCredential};

use crate::error::{Error, Result};
use crate::types::{AnalyzeTextOptions, AnalyzeTextResult};

/// Content Safety data-plane API version.
pub const API_VERSION: &str = "2023-10-01";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that can run a text analysis. Implemented by
/// [`ContentSafetyClient`]; tests substitute fakes.
#[async_trait::async_trait]
pub trait Moderator: Send + Sync {
    async fn analyze_text(&self, options: &AnalyzeTextOptions) -> Result<AnalyzeTextResult>;
}

enum Auth {
    Token(BearerTokenProvider),
    Key(String),
}

/// Content Safety client for one resource endpoint.
pub struct ContentSafetyClient {
    http: reqwest::Client,
    endpoint: String,
    auth: Auth,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl ContentSafetyClient {
    /// Client authenticating with Entra ID tokens from `credential`.
    pub fn new(endpoint: &str, credential: Arc<dyn TokenCredential>) -> Result<Self> {
        let endpoint = parse_endpoint(endpoint)?;
        Ok(Self {
            http: build_http()?,
            endpoint,
            auth: Auth::Token(BearerTokenProvider::new(credential, COGNITIVE_SERVICES_SCOPE)),
        })
    }

    /// Client authenticating with a resource key.
    pub fn with_key(endpoint: &str, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::Config("content safety key must be non-empty".to_string()));
        }
        let endpoint = parse_endpoint(endpoint)?;
        Ok(Self {
            http: build_http()?,
            endpoint,
            auth: Auth::Key(key),
        })
    }

    /// Returns the configured endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub(crate) fn analyze_url(&self) -> String {
        format!(
            "{}/contentsafety/text:analyze?api-version={}",
            self.endpoint, API_VERSION
        )
    }
}

#[async_trait::async_trait]
impl Moderator for ContentSafetyClient {
    async fn analyze_text(&self, options: &AnalyzeTextOptions) -> Result<AnalyzeTextResult> {
        let mut request = self.http.post(self.analyze_url()).json(options);
        request = match &self.auth {
            Auth::Token(tokens) => request.bearer_auth(tokens.token().await?),
            Auth::Key(key) => request.header("Ocp-Apim-Subscription-Key", key),
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

fn build_http() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .map_err(|e| Error::Config(e.to_string()))
}

fn parse_endpoint(endpoint: &str) -> Result<String> {
    let url = Url::parse(endpoint)
        .map_err(|e| Error::Config(format!("invalid endpoint {endpoint:?}: {e}")))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(Error::Config(format!(
            "endpoint must be an http(s) url, got {endpoint:?}"
        )));
    }
    Ok(endpoint.trim_end_matches('/').to_string())
}

fn api_error(http_status: u16, body: &[u8]) -> Error {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(env) => Error::Api {
            code: env.error.code,
            message: env.error.message,
            http_status,
        },
        Err(_) => Error::Api {
            code: String::new(),
            message: String::from_utf8_lossy(body).into_owned(),
            http_status,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_url_layout() {
        let c = ContentSafetyClient::with_key("https://news-cs.cognitiveservices.azure.com/", "k")
            .unwrap();
        assert_eq!(
            c.analyze_url(),
            "https://news-cs.cognitiveservices.azure.com/contentsafety/text:analyze?api-version=2023-10-01"
        );
    }

    #[test]
    fn rejects_malformed_endpoint() {
        let err = ContentSafetyClient::with_key("news-cs", "k").err().unwrap();
        assert!(err.is_config());
    }

    #[test]
    fn rejects_empty_key() {
        let err = ContentSafetyClient::with_key("https://x", "").err().unwrap();
        assert!(err.is_config());
    }

    #[test]
    fn api_error_from_envelope() {
        let body = br#"{"error":{"code":"InvalidRequestBody","message":"text too long"}}"#;
        match api_error(400, body) {
            Error::Api {
                code,
                message,
                http_status,
            } => {
                assert_eq!(code, "InvalidRequestBody");
                assert_eq!(message, "text too long");
                assert_eq!(http_status, 400);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn api_error_from_plain_body() {
        let err = api_error(429, b"Too Many Requests");
        assert!(err.is_rate_limit());
    }
}
