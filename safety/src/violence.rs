//! Violence check over Content Safety.
//!
//! Configuration problems (no endpoint, bad threshold) are returned as
//! [`Error::Config`]. Once configured, a failed or unusable analysis is
//! logged and reported as "not violent" so callers keep going.

use std::sync::Arc;

use tracing::warn;

use newsdesk_azure::env::{self, EnvLookup};
use newsdesk_azure::{default_credential, TokenCredential};

use crate::client::{ContentSafetyClient, Moderator};
use crate::error::{Error, Result};
use crate::types::{AnalyzeTextOptions, TextCategory};

/// Severities strictly above this are flagged.
pub const DEFAULT_THRESHOLD: f64 = 0.0;

/// Settings for building a [`ViolenceClassifier`].
#[derive(Clone)]
pub struct ClassifierOptions {
    /// Resource endpoint; `AZURE_CONTENT_SAFETY_ENDPOINT` when unset.
    pub endpoint: Option<String>,
    /// Token credential; the default chain when unset.
    pub credential: Option<Arc<dyn TokenCredential>>,
    pub threshold: f64,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            endpoint: None,
            credential: None,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl ClassifierOptions {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn credential(mut self, credential: Arc<dyn TokenCredential>) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Explicit endpoint, else the environment.
    pub fn resolve_endpoint(&self, env: &EnvLookup) -> Result<String> {
        if let Some(e) = self.endpoint.as_deref().filter(|e| !e.is_empty()) {
            return Ok(e.to_string());
        }
        env(env::AZURE_CONTENT_SAFETY_ENDPOINT).ok_or_else(|| {
            Error::Config(format!(
                "the content safety endpoint must be provided or set in the {} environment variable",
                env::AZURE_CONTENT_SAFETY_ENDPOINT
            ))
        })
    }
}

fn check_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(Error::Config(format!(
            "threshold must be a non-negative number, got {threshold}"
        )));
    }
    Ok(())
}

/// Flags text whose violence severity exceeds a threshold.
pub struct ViolenceClassifier<M> {
    moderator: M,
    threshold: f64,
}

impl ViolenceClassifier<ContentSafetyClient> {
    /// Builds a classifier, resolving the endpoint from the process
    /// environment when not given.
    pub fn from_options(opts: ClassifierOptions) -> Result<Self> {
        Self::from_options_with_env(opts, &env::process_lookup())
    }

    /// Like [`from_options`](Self::from_options) with an explicit
    /// environment lookup.
    pub fn from_options_with_env(opts: ClassifierOptions, env: &EnvLookup) -> Result<Self> {
        check_threshold(opts.threshold)?;
        let endpoint = opts.resolve_endpoint(env)?;
        let credential = opts.credential.unwrap_or_else(default_credential);
        let client = ContentSafetyClient::new(&endpoint, credential)?;
        Ok(Self {
            moderator: client,
            threshold: opts.threshold,
        })
    }
}

impl<M: Moderator> ViolenceClassifier<M> {
    pub fn new(moderator: M, threshold: f64) -> Result<Self> {
        check_threshold(threshold)?;
        Ok(Self {
            moderator,
            threshold,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Violence severity of `text`, with every failure surfaced.
    pub async fn severity(&self, text: &str) -> Result<f64> {
        let options = AnalyzeTextOptions::new(text, &[TextCategory::Violence]);
        let result = self.moderator.analyze_text(&options).await?;
        result
            .severity(TextCategory::Violence)
            .ok_or(Error::MissingCategory(TextCategory::Violence))
    }

    /// True if the severity is strictly above the threshold. A failed
    /// analysis is logged and yields `false`.
    pub async fn is_violent(&self, text: &str) -> bool {
        match self.severity(text).await {
            Ok(severity) => severity > self.threshold,
            Err(e) => {
                warn!("error analyzing text for violence: {e}");
                false
            }
        }
    }
}

/// One-shot violence check.
///
/// Returns `Err` only for configuration problems, before any request is
/// made. Service failures are logged and give `Ok(false)`.
pub async fn is_violent(
    text: &str,
    threshold: f64,
    endpoint: Option<&str>,
    credential: Option<Arc<dyn TokenCredential>>,
) -> Result<bool> {
    let opts = ClassifierOptions {
        endpoint: endpoint.map(str::to_string),
        credential,
        threshold,
    };
    let classifier = ViolenceClassifier::from_options(opts)?;
    Ok(classifier.is_violent(text).await)
}
