//! Azure OpenAI client construction.

use std::sync::Arc;

use newsdesk_embed::{AzureAuth, AzureOpenAI, EmbedConfig};

use crate::credential::TokenCredential;
use crate::env;
use crate::error::{Error, Result};
use crate::keyvault::Secrets;
use crate::token_provider::{cognitive_services_token_provider, BearerTokenProvider};

pub use newsdesk_embed::azure::DEFAULT_API_VERSION;

/// Settings for [`create_azure_client`]. Unset fields are resolved from the
/// environment and the secret store.
#[derive(Default)]
pub struct AzureClientOptions {
    pub endpoint: Option<String>,
    pub api_version: Option<String>,
    pub api_key: Option<String>,
    pub token_provider: Option<Arc<BearerTokenProvider>>,
    pub embed: EmbedConfig,
}

impl AzureClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options authenticating with Entra ID through `credential`.
    pub fn entra_id(credential: Arc<dyn TokenCredential>) -> Self {
        Self {
            token_provider: Some(cognitive_services_token_provider(
                credential,
                &env::process_lookup(),
            )),
            ..Self::default()
        }
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn token_provider(mut self, provider: Arc<BearerTokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    pub fn embed_config(mut self, cfg: EmbedConfig) -> Self {
        self.embed = cfg;
        self
    }

    /// Resolves endpoint, API version and auth, then builds the client.
    ///
    /// Endpoint: explicit, then `AZURE_OPENAI_ENDPOINT`, then the secret of
    /// the same name. Auth: the token provider when set, otherwise an API
    /// key (explicit, then secret `AZURE_OPENAI_API_KEY`).
    pub async fn build(self, secrets: &Secrets) -> Result<AzureOpenAI> {
        let endpoint = match non_empty(self.endpoint) {
            Some(e) => e,
            None => match secrets.env_var(env::AZURE_OPENAI_ENDPOINT) {
                Some(e) => e,
                None => secrets
                    .get(env::AZURE_OPENAI_ENDPOINT, None)
                    .await
                    .ok_or_else(|| {
                        Error::Config("Azure OpenAI endpoint must be provided".to_string())
                    })?,
            },
        };

        let api_version = non_empty(self.api_version)
            .or_else(|| secrets.env_var(env::AZURE_OPENAI_API_VERSION))
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let auth = match self.token_provider {
            Some(provider) => AzureAuth::Token(provider),
            None => {
                let key = match non_empty(self.api_key) {
                    Some(k) => k,
                    None => secrets.get(env::AZURE_OPENAI_API_KEY, None).await.ok_or_else(|| {
                        Error::Config(
                            "API key must be provided when not using a token provider".to_string(),
                        )
                    })?,
                };
                AzureAuth::ApiKey(key)
            }
        };

        let cfg = self.embed.with_base_url(&endpoint);
        AzureOpenAI::with_config(&api_version, auth, cfg).map_err(|e| Error::Config(e.to_string()))
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

/// Azure OpenAI client using the default credential chain.
pub async fn create_azure_client(secrets: &Secrets) -> Result<AzureOpenAI> {
    AzureClientOptions::entra_id(crate::credential::default_credential())
        .build(secrets)
        .await
}
