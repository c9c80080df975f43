//! Cached bearer tokens for one scope.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use newsdesk_embed::{EmbedError, TokenSource};

use crate::credential::{AccessToken, TokenCredential};
use crate::env::{self, EnvLookup};
use crate::error::Result;

/// Refresh tokens this long before they expire.
const REFRESH_MARGIN_MINUTES: i64 = 5;

/// Hands out bearer tokens for a fixed scope, reusing a cached token
/// until it is about to expire.
pub struct BearerTokenProvider {
    credential: Arc<dyn TokenCredential>,
    scope: String,
    cached: Mutex<Option<AccessToken>>,
}

impl BearerTokenProvider {
    pub fn new(credential: Arc<dyn TokenCredential>, scope: impl Into<String>) -> Self {
        Self {
            credential,
            scope: scope.into(),
            cached: Mutex::new(None),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Returns a valid token, fetching a new one when needed.
    pub async fn token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(t) = cached.as_ref() {
            if !t.expires_within(chrono::Duration::minutes(REFRESH_MARGIN_MINUTES)) {
                return Ok(t.token.clone());
            }
        }

        let fresh = self.credential.get_token(&[self.scope.as_str()]).await?;
        debug!(
            scope = %self.scope,
            credential = self.credential.name(),
            expires_on = %fresh.expires_on,
            "refreshed bearer token"
        );
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

#[async_trait::async_trait]
impl TokenSource for BearerTokenProvider {
    async fn bearer_token(&self) -> std::result::Result<String, EmbedError> {
        self.token().await.map_err(|e| EmbedError::Auth(e.to_string()))
    }
}

/// Token provider for `scope` over `credential`.
pub fn get_bearer_token_provider(
    credential: Arc<dyn TokenCredential>,
    scope: &str,
) -> Arc<BearerTokenProvider> {
    Arc::new(BearerTokenProvider::new(credential, scope))
}

/// Token provider for Azure AI services. The scope comes from
/// `AZURE_COGNITIVE_SERVICES` when set.
pub fn cognitive_services_token_provider(
    credential: Arc<dyn TokenCredential>,
    env: &EnvLookup,
) -> Arc<BearerTokenProvider> {
    let scope = env(env::AZURE_COGNITIVE_SERVICES)
        .unwrap_or_else(|| env::COGNITIVE_SERVICES_SCOPE.to_string());
    get_bearer_token_provider(credential, &scope)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;

    use super::*;

    struct Counting {
        calls: AtomicUsize,
        lifetime: chrono::Duration,
        scopes: std::sync::Mutex<Vec<String>>,
    }

    impl Counting {
        fn new(lifetime: chrono::Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                lifetime,
                scopes: std::sync::Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl TokenCredential for Counting {
        async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.scopes
                .lock()
                .unwrap()
                .extend(scopes.iter().map(|s| s.to_string()));
            Ok(AccessToken::new(format!("token-{n}"), Utc::now() + self.lifetime))
        }
    }

    #[tokio::test]
    async fn reuses_token_until_near_expiry() {
        let cred = Counting::new(chrono::Duration::hours(1));
        let provider = BearerTokenProvider::new(cred.clone(), "scope-a");

        assert_eq!(provider.token().await.unwrap(), "token-1");
        assert_eq!(provider.token().await.unwrap(), "token-1");
        assert_eq!(cred.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*cred.scopes.lock().unwrap(), vec!["scope-a".to_string()]);
    }

    #[tokio::test]
    async fn refreshes_token_inside_margin() {
        let cred = Counting::new(chrono::Duration::minutes(2));
        let provider = BearerTokenProvider::new(cred.clone(), "scope-a");

        assert_eq!(provider.token().await.unwrap(), "token-1");
        assert_eq!(provider.token().await.unwrap(), "token-2");
    }

    #[tokio::test]
    async fn token_source_maps_errors_to_auth() {
        struct Broken;

        #[async_trait::async_trait]
        impl TokenCredential for Broken {
            async fn get_token(&self, _scopes: &[&str]) -> Result<AccessToken> {
                Err(crate::Error::Credential("expired refresh token".into()))
            }
        }

        let provider = BearerTokenProvider::new(Arc::new(Broken), "s");
        let err = provider.bearer_token().await.unwrap_err();
        assert!(matches!(err, EmbedError::Auth(_)));
    }

    #[test]
    fn cognitive_scope_from_env() {
        let cred = Counting::new(chrono::Duration::hours(1));
        let env = env::fixed_lookup([("AZURE_COGNITIVE_SERVICES", "https://custom/.default")]);
        let provider = cognitive_services_token_provider(cred.clone(), &env);
        assert_eq!(provider.scope(), "https://custom/.default");

        let provider = cognitive_services_token_provider(cred, &env::empty_lookup());
        assert_eq!(provider.scope(), env::COGNITIVE_SERVICES_SCOPE);
    }
}
