//! Recognized environment variables.

use std::sync::Arc;

pub const AZURE_OPENAI_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const AZURE_OPENAI_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";
pub const AZURE_OPENAI_API_KEY: &str = "AZURE_OPENAI_API_KEY";
pub const AZURE_KEYVAULT_URL: &str = "AZURE_KEYVAULT_URL";
pub const AZURE_COGNITIVE_SERVICES: &str = "AZURE_COGNITIVE_SERVICES";
pub const AZURE_CONTENT_SAFETY_ENDPOINT: &str = "AZURE_CONTENT_SAFETY_ENDPOINT";
pub const AZURE_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const AZURE_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const AZURE_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
pub const AZURE_AUTHORITY_HOST: &str = "AZURE_AUTHORITY_HOST";

/// Token scope for Azure AI services (OpenAI, Content Safety).
pub const COGNITIVE_SERVICES_SCOPE: &str = "https://cognitiveservices.azure.com/.default";

/// Token scope for Key Vault.
pub const KEYVAULT_SCOPE: &str = "https://vault.azure.net/.default";

/// Variable lookup. Swapped for a map in tests.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads a process environment variable, treating empty values as unset.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// The process environment as an [`EnvLookup`].
pub fn process_lookup() -> EnvLookup {
    Arc::new(process_env)
}

/// A lookup with no variables set.
pub fn empty_lookup() -> EnvLookup {
    Arc::new(|_: &str| None::<String>)
}

/// A fixed set of variables as an [`EnvLookup`].
pub fn fixed_lookup<I, K, V>(vars: I) -> EnvLookup
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let vars: std::collections::HashMap<String, String> = vars
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    Arc::new(move |name: &str| vars.get(name).filter(|v| !v.is_empty()).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_lookup_ignores_empty_values() {
        let env = fixed_lookup([("A", "1"), ("B", "")]);
        assert_eq!(env("A").as_deref(), Some("1"));
        assert_eq!(env("B"), None);
        assert_eq!(env("C"), None);
    }
}
