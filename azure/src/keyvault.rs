//! Key Vault secrets with environment fallback.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::credential::TokenCredential;
use crate::env::{self, EnvLookup};
use crate::error::{Error, Result};
use crate::http;
use crate::token_provider::BearerTokenProvider;

/// Key Vault data-plane API version.
pub const KEYVAULT_API_VERSION: &str = "7.4";

/// Read access to named secrets.
#[async_trait::async_trait]
pub trait SecretStore: Send + Sync {
    async fn get_secret(&self, name: &str) -> Result<String>;
}

#[derive(Deserialize)]
struct SecretBundle {
    value: String,
}

/// Azure Key Vault secret client.
pub struct SecretClient {
    client: reqwest::Client,
    vault_url: String,
    tokens: BearerTokenProvider,
}

impl SecretClient {
    pub fn new(vault_url: &str, credential: Arc<dyn TokenCredential>) -> Result<Self> {
        if !vault_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "key vault url must start with https://, got {vault_url:?}"
            )));
        }
        Ok(Self {
            client: http::client(http::DEFAULT_TIMEOUT)?,
            vault_url: vault_url.trim_end_matches('/').to_string(),
            tokens: BearerTokenProvider::new(credential, env::KEYVAULT_SCOPE),
        })
    }

    /// Builds a client for the vault named by `AZURE_KEYVAULT_URL`.
    pub fn from_env(env: &EnvLookup, credential: Arc<dyn TokenCredential>) -> Result<Self> {
        let url = env(env::AZURE_KEYVAULT_URL).ok_or_else(|| {
            Error::Config("AZURE_KEYVAULT_URL environment variable must be set".to_string())
        })?;
        Self::new(&url, credential)
    }

    pub fn vault_url(&self) -> &str {
        &self.vault_url
    }

    pub(crate) fn secret_url(&self, name: &str) -> String {
        format!(
            "{}/secrets/{}?api-version={}",
            self.vault_url, name, KEYVAULT_API_VERSION
        )
    }
}

#[async_trait::async_trait]
impl SecretStore for SecretClient {
    async fn get_secret(&self, name: &str) -> Result<String> {
        let token = self.tokens.token().await?;
        let resp = self
            .client
            .get(self.secret_url(name))
            .bearer_auth(token)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: format!("get secret {name:?}: {body}"),
            });
        }

        let bundle: SecretBundle = resp.json().await?;
        Ok(bundle.value)
    }
}

/// Caller-owned secret resolver: Key Vault first, then the environment.
///
/// Create one at startup and pass it to whatever needs secrets.
#[derive(Clone)]
pub struct Secrets {
    store: Option<Arc<dyn SecretStore>>,
    env: EnvLookup,
}

impl Secrets {
    /// Resolver over the process environment only.
    pub fn env_only() -> Self {
        Self {
            store: None,
            env: env::process_lookup(),
        }
    }

    /// Resolver over `store` with process environment fallback.
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self {
            store: Some(store),
            env: env::process_lookup(),
        }
    }

    /// Key Vault from `AZURE_KEYVAULT_URL` when set, environment otherwise.
    pub fn from_env(credential: Arc<dyn TokenCredential>) -> Result<Self> {
        let lookup = env::process_lookup();
        if lookup(env::AZURE_KEYVAULT_URL).is_none() {
            debug!("AZURE_KEYVAULT_URL not set, resolving secrets from environment only");
            return Ok(Self::env_only());
        }
        let client = SecretClient::from_env(&lookup, credential)?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Replaces the environment lookup.
    pub fn with_env(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// Reads an environment variable through this resolver's lookup.
    pub fn env_var(&self, name: &str) -> Option<String> {
        (self.env)(name)
    }

    /// Returns the secret `name` from Key Vault, falling back to the
    /// environment variable of the same name and then to `default`.
    pub async fn get(&self, name: &str, default: Option<&str>) -> Option<String> {
        if let Some(store) = &self.store {
            match store.get_secret(name).await {
                Ok(value) => return Some(value),
                Err(e) => debug!(secret = name, "key vault lookup failed, using environment: {e}"),
            }
        }
        self.env_var(name).or_else(|| default.map(str::to_string))
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("has_store", &self.store.is_some())
            .finish()
    }
}
