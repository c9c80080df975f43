//! Token credentials for Microsoft Entra ID.
//!
//! [`DefaultAzureCredential`] tries, in order, a client-secret credential
//! configured through `AZURE_TENANT_ID` / `AZURE_CLIENT_ID` /
//! `AZURE_CLIENT_SECRET` and the signed-in Azure CLI.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::env::{self, EnvLookup};
use crate::error::{Error, Result};
use crate::http;

const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// A bearer token and its expiry.
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_on: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_on,
        }
    }

    /// True if the token expires within `margin` from now.
    pub fn expires_within(&self, margin: chrono::Duration) -> bool {
        self.expires_on - margin <= Utc::now()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"***")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Produces access tokens for the requested scopes.
#[async_trait::async_trait]
pub trait TokenCredential: Send + Sync {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken>;

    /// Short name used in diagnostics.
    fn name(&self) -> &str {
        "credential"
    }
}

/// A pre-issued token, returned for every scope.
pub struct StaticTokenCredential {
    token: AccessToken,
}

impl StaticTokenCredential {
    pub fn new(token: AccessToken) -> Self {
        Self { token }
    }
}

#[async_trait::async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _scopes: &[&str]) -> Result<AccessToken> {
        Ok(self.token.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// OAuth2 client-credentials grant for a service principal.
pub struct ClientSecretCredential {
    client: reqwest::Client,
    authority_host: String,
    tenant_id: String,
    client_id: String,
    client_secret: String,
}

impl ClientSecretCredential {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: http::client(http::DEFAULT_TIMEOUT)?,
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        })
    }

    /// Sets a non-default authority host (sovereign clouds).
    pub fn authority_host(mut self, host: impl Into<String>) -> Self {
        self.authority_host = host.into().trim_end_matches('/').to_string();
        self
    }

    /// Builds the credential from `AZURE_TENANT_ID`, `AZURE_CLIENT_ID`
    /// and `AZURE_CLIENT_SECRET`.
    pub fn from_env(env: &EnvLookup) -> Result<Self> {
        let get = |name: &str| {
            env(name)
                .ok_or_else(|| Error::Config(format!("{name} environment variable must be set")))
        };
        let mut cred = Self::new(
            get(env::AZURE_TENANT_ID)?,
            get(env::AZURE_CLIENT_ID)?,
            get(env::AZURE_CLIENT_SECRET)?,
        )?;
        if let Some(host) = env(env::AZURE_AUTHORITY_HOST) {
            cred = cred.authority_host(host);
        }
        Ok(cred)
    }

    pub(crate) fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host, self.tenant_id
        )
    }
}

#[async_trait::async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken> {
        let scope = scopes.join(" ");
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", scope.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let resp = self.client.post(self.token_url()).form(&form).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Credential(format!(
                "token request failed: HTTP {status}: {body}"
            )));
        }

        let body: TokenResponse = resp.json().await?;
        Ok(AccessToken::new(
            body.access_token,
            Utc::now() + chrono::Duration::seconds(body.expires_in),
        ))
    }

    fn name(&self) -> &str {
        "environment"
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliToken {
    access_token: String,
    #[serde(default)]
    expires_on: Option<String>,
    #[serde(default, rename = "expires_on")]
    expires_on_epoch: Option<i64>,
}

/// Uses the account signed in to the Azure CLI (`az login`).
pub struct AzureCliCredential {
    timeout: Duration,
}

impl Default for AzureCliCredential {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

impl AzureCliCredential {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TokenCredential for AzureCliCredential {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken> {
        let scope = scopes
            .first()
            .ok_or_else(|| Error::Credential("azure cli: no scope requested".to_string()))?;

        let run = tokio::process::Command::new("az")
            .args(["account", "get-access-token", "--output", "json", "--scope"])
            .arg(scope)
            .kill_on_drop(true)
            .output();
        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| Error::Credential("azure cli: timed out".to_string()))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Credential(format!("azure cli: {}", stderr.trim())));
        }
        parse_cli_token(&output.stdout)
    }

    fn name(&self) -> &str {
        "azure-cli"
    }
}

pub(crate) fn parse_cli_token(stdout: &[u8]) -> Result<AccessToken> {
    let t: CliToken = serde_json::from_slice(stdout)?;
    let expires_on = match (t.expires_on_epoch, t.expires_on.as_deref()) {
        (Some(epoch), _) => Utc.timestamp_opt(epoch, 0).single(),
        // Older CLI versions only report local wall-clock time.
        (None, Some(local)) => NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M:%S%.f")
            .ok()
            .and_then(|naive| Local.from_local_datetime(&naive).single())
            .map(|dt| dt.with_timezone(&Utc)),
        (None, None) => None,
    }
    .ok_or_else(|| Error::Credential("azure cli: token has no valid expiry".to_string()))?;

    Ok(AccessToken::new(t.access_token, expires_on))
}

/// Credential chain: environment service principal, then Azure CLI.
pub struct DefaultAzureCredential {
    sources: Vec<Arc<dyn TokenCredential>>,
}

impl DefaultAzureCredential {
    /// Builds the chain from the process environment.
    pub fn new() -> Self {
        Self::from_env(&env::process_lookup())
    }

    pub fn from_env(env: &EnvLookup) -> Self {
        let mut sources: Vec<Arc<dyn TokenCredential>> = Vec::new();
        match ClientSecretCredential::from_env(env) {
            Ok(cred) => sources.push(Arc::new(cred)),
            Err(e) => debug!("environment credential unavailable: {e}"),
        }
        sources.push(Arc::new(AzureCliCredential::new()));
        Self { sources }
    }

    /// A chain over explicit sources.
    pub fn with_sources(sources: Vec<Arc<dyn TokenCredential>>) -> Self {
        Self { sources }
    }
}

impl Default for DefaultAzureCredential {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TokenCredential for DefaultAzureCredential {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken> {
        let mut attempts = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            match source.get_token(scopes).await {
                Ok(token) => {
                    debug!(credential = source.name(), "acquired token");
                    return Ok(token);
                }
                Err(e) => attempts.push(format!("{}: {e}", source.name())),
            }
        }
        Err(Error::Credential(format!(
            "no credential in the chain produced a token [{}]",
            attempts.join("; ")
        )))
    }

    fn name(&self) -> &str {
        "default"
    }
}

/// Default credential as a shared trait object.
pub fn default_credential() -> Arc<dyn TokenCredential> {
    Arc::new(DefaultAzureCredential::new())
}
