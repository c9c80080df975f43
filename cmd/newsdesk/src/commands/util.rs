//! Utility functions for CLI commands.

use std::sync::Arc;

use newsdesk_azure::{
    default_credential, AzureClientOptions, SecretClient, Secrets, TokenCredential,
};
use newsdesk_cli::config::{load_config, Config, Context};
use newsdesk_cli::{Output, OutputFormat};
use newsdesk_embed::{AzureOpenAI, EmbedConfig};
use newsdesk_safety::ClassifierOptions;

use crate::Cli;

const APP_NAME: &str = "newsdesk";

/// Gets the global configuration.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(APP_NAME, cli.config.as_deref())
}

/// Gets the context configuration to use.
///
/// With no `-c` flag and no current context an empty context is returned,
/// so every setting comes from the environment.
pub fn get_context(cli: &Cli) -> anyhow::Result<Context> {
    let cfg = get_config(cli)?;

    match (cfg.resolve_context(cli.context.as_deref()), cli.context.as_deref()) {
        (Some(ctx), _) => Ok(ctx.clone()),
        (None, Some(name)) if !name.is_empty() => anyhow::bail!("context '{}' not found", name),
        (None, _) => Ok(Context::default()),
    }
}

/// Requires input file to be provided.
pub fn require_input_file(cli: &Cli) -> anyhow::Result<&str> {
    cli.input
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("input file is required, use -f flag"))
}

/// Outputs result as JSON or YAML.
pub fn output_result<T: serde::Serialize>(cli: &Cli, result: &T) -> anyhow::Result<()> {
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Yaml
    };
    Output::new(format, cli.output.clone()).write(result)
}

/// Prints verbose output if enabled.
pub fn print_verbose(cli: &Cli, msg: &str) {
    if cli.verbose {
        eprintln!("[verbose] {}", msg);
    }
}

/// Prints success message.
pub fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}

/// Prints warning message.
pub fn print_warning(msg: &str) {
    eprintln!("\x1b[33m⚠\x1b[0m {}", msg);
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}

/// Creates the secret resolver: the context's Key Vault when set,
/// otherwise `AZURE_KEYVAULT_URL`, otherwise the environment alone.
pub fn create_secrets(
    ctx: &Context,
    credential: Arc<dyn TokenCredential>,
) -> anyhow::Result<Secrets> {
    match non_empty(&ctx.keyvault_url) {
        Some(url) => Ok(Secrets::new(Arc::new(SecretClient::new(url, credential)?))),
        None => Ok(Secrets::from_env(credential)?),
    }
}

/// Builds the Azure OpenAI client options from a context. A context API
/// key selects key auth; otherwise Entra ID through `credential`.
pub fn client_options(ctx: &Context, credential: Arc<dyn TokenCredential>) -> AzureClientOptions {
    let mut opts = match non_empty(&ctx.api_key) {
        Some(key) => AzureClientOptions::new().api_key(key),
        None => AzureClientOptions::entra_id(credential),
    };
    if let Some(endpoint) = non_empty(&ctx.endpoint) {
        opts = opts.endpoint(endpoint);
    }
    if let Some(version) = non_empty(&ctx.api_version) {
        opts = opts.api_version(version);
    }

    let mut embed = EmbedConfig::default()
        .with_dimension(ctx.dimensions)
        .with_timeout_secs(ctx.timeout as u64);
    if let Some(model) = non_empty(&ctx.embedding_model) {
        embed = embed.with_model(model);
    }
    opts.embed_config(embed)
}

/// Creates an Azure OpenAI embedder from context configuration.
pub async fn create_embedder(ctx: &Context) -> anyhow::Result<AzureOpenAI> {
    let credential = default_credential();
    let secrets = create_secrets(ctx, credential.clone())?;
    Ok(client_options(ctx, credential).build(&secrets).await?)
}

/// Classifier settings from a context; the endpoint falls back to the
/// environment when the context has none.
pub fn classifier_options(ctx: &Context, threshold: f64) -> ClassifierOptions {
    let opts = ClassifierOptions::default().threshold(threshold);
    match non_empty(&ctx.content_safety_endpoint) {
        Some(endpoint) => opts.endpoint(endpoint),
        None => opts,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use clap::Parser;
    use newsdesk_azure::{AccessToken, StaticTokenCredential};
    use newsdesk_embed::{AzureAuth, Embedder};

    use super::*;

    fn cli_with_config(path: &str, extra: &[&str]) -> Cli {
        let mut args = vec!["newsdesk", "--config", path];
        args.extend_from_slice(extra);
        args.extend_from_slice(&["schema", "news"]);
        Cli::parse_from(args)
    }

    fn credential() -> Arc<dyn TokenCredential> {
        Arc::new(StaticTokenCredential::new(AccessToken::new(
            "t",
            Utc::now() + chrono::Duration::hours(1),
        )))
    }

    #[test]
    fn missing_current_context_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let cli = cli_with_config(path.to_str().unwrap(), &[]);
        let ctx = get_context(&cli).unwrap();
        assert!(ctx.endpoint.is_empty());
    }

    #[test]
    fn unknown_named_context_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let cli = cli_with_config(path.to_str().unwrap(), &["-c", "prod"]);
        let err = get_context(&cli).unwrap_err();
        assert!(err.to_string().contains("prod"));
    }

    #[tokio::test]
    async fn context_settings_reach_the_client() {
        let ctx = Context {
            endpoint: "https://news.openai.azure.com".into(),
            api_version: "2024-10-21".into(),
            api_key: "key".into(),
            embedding_model: "embed-large".into(),
            dimensions: 256,
            ..Default::default()
        };
        let client = client_options(&ctx, credential())
            .build(&Secrets::env_only().with_env(newsdesk_azure::env::empty_lookup()))
            .await
            .unwrap();

        assert_eq!(client.endpoint(), "https://news.openai.azure.com");
        assert_eq!(client.api_version(), "2024-10-21");
        assert_eq!(client.model(), "embed-large");
        assert_eq!(client.dimension(), 256);
        assert!(matches!(client.auth(), AzureAuth::ApiKey(k) if k == "key"));
    }

    #[test]
    fn classifier_endpoint_from_context() {
        let ctx = Context {
            content_safety_endpoint: "https://cs.cognitiveservices.azure.com".into(),
            ..Default::default()
        };
        let opts = classifier_options(&ctx, 2.0);
        assert_eq!(
            opts.endpoint.as_deref(),
            Some("https://cs.cognitiveservices.azure.com")
        );
        assert_eq!(opts.threshold, 2.0);
        assert!(classifier_options(&Context::default(), 0.0).endpoint.is_none());
    }
}
