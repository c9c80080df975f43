//! Configuration management commands.

use clap::{Args, Subcommand};

use newsdesk_cli::config::{mask_api_key, Context as CliContext};

use super::{get_config, print_success};
use crate::Cli;

/// Manage CLI configuration.
///
/// Contexts allow you to manage multiple Azure environments,
/// similar to kubectl's context management.
///
/// Configuration is stored in ~/.newsdesk/newsdesk/config.yaml
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Add a new context
    #[command(name = "add-context")]
    AddContext {
        /// Context name
        name: String,
        /// Azure OpenAI endpoint
        #[arg(long)]
        endpoint: Option<String>,
        /// Azure OpenAI API version
        #[arg(long)]
        api_version: Option<String>,
        /// Azure OpenAI API key (Entra ID is used when omitted)
        #[arg(long)]
        api_key: Option<String>,
        /// Key Vault URL
        #[arg(long)]
        keyvault_url: Option<String>,
        /// Content Safety endpoint
        #[arg(long)]
        content_safety_endpoint: Option<String>,
        /// Embedding deployment name
        #[arg(long)]
        embedding_model: Option<String>,
        /// Embedding dimensions
        #[arg(long)]
        dimensions: Option<usize>,
        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<usize>,
    },
    /// Delete a context
    #[command(name = "delete-context")]
    DeleteContext {
        /// Context name
        name: String,
    },
    /// Set the current context
    #[command(name = "use-context")]
    UseContext {
        /// Context name
        name: String,
    },
    /// Display the current context
    #[command(name = "get-context")]
    GetContext,
    /// List all contexts
    #[command(name = "list-contexts", alias = "get-contexts")]
    ListContexts,
    /// View the current configuration
    View,
}

impl ConfigCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            ConfigSubcommand::AddContext {
                name,
                endpoint,
                api_version,
                api_key,
                keyvault_url,
                content_safety_endpoint,
                embedding_model,
                dimensions,
                timeout,
            } => {
                let mut cfg = get_config(cli)?;

                let ctx = CliContext {
                    endpoint: endpoint.clone().unwrap_or_default(),
                    api_version: api_version.clone().unwrap_or_default(),
                    api_key: api_key.clone().unwrap_or_default(),
                    keyvault_url: keyvault_url.clone().unwrap_or_default(),
                    content_safety_endpoint: content_safety_endpoint.clone().unwrap_or_default(),
                    embedding_model: embedding_model.clone().unwrap_or_default(),
                    dimensions: dimensions.unwrap_or(0),
                    timeout: timeout.unwrap_or(0),
                    ..Default::default()
                };

                cfg.add_context(name, ctx)?;
                print_success(&format!("Context \"{}\" added successfully", name));
                Ok(())
            }

            ConfigSubcommand::DeleteContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.delete_context(name)?;
                print_success(&format!("Context \"{}\" deleted", name));
                Ok(())
            }

            ConfigSubcommand::UseContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.use_context(name)?;
                print_success(&format!("Switched to context \"{}\"", name));
                Ok(())
            }

            ConfigSubcommand::GetContext => {
                let cfg = get_config(cli)?;
                if cfg.current_context.is_empty() {
                    println!("No current context set");
                } else {
                    println!("{}", cfg.current_context);
                }
                Ok(())
            }

            ConfigSubcommand::ListContexts => {
                let cfg = get_config(cli)?;

                if cfg.contexts.is_empty() {
                    println!("No contexts configured");
                    return Ok(());
                }

                println!("{:<8} {:<20} {:<40} {}", "CURRENT", "NAME", "ENDPOINT", "MODEL");

                for name in cfg.list_contexts() {
                    let Some(ctx) = cfg.get_context(name) else {
                        continue;
                    };
                    let current = if name == cfg.current_context { "*" } else { "" };
                    let endpoint = or_env(&ctx.endpoint);
                    let model = if ctx.embedding_model.is_empty() {
                        "(default)"
                    } else {
                        &ctx.embedding_model
                    };
                    println!("{:<8} {:<20} {:<40} {}", current, name, endpoint, model);
                }

                Ok(())
            }

            ConfigSubcommand::View => {
                let cfg = get_config(cli)?;

                println!("Config file: {}", cfg.path().display());
                println!("Current context: {}", cfg.current_context);
                println!("Contexts: {}", cfg.contexts.len());

                if !cfg.contexts.is_empty() {
                    println!("\nContext details:");

                    for name in cfg.list_contexts() {
                        let Some(ctx) = cfg.get_context(name) else {
                            continue;
                        };
                        println!("\n  {}:", name);
                        println!("    Endpoint: {}", or_env(&ctx.endpoint));
                        if ctx.api_key.is_empty() {
                            println!("    Auth: Entra ID");
                        } else {
                            println!("    API Key: {}", mask_api_key(&ctx.api_key));
                        }
                        if !ctx.api_version.is_empty() {
                            println!("    API Version: {}", ctx.api_version);
                        }
                        if !ctx.keyvault_url.is_empty() {
                            println!("    Key Vault: {}", ctx.keyvault_url);
                        }
                        if !ctx.content_safety_endpoint.is_empty() {
                            println!("    Content Safety: {}", ctx.content_safety_endpoint);
                        }
                        if !ctx.embedding_model.is_empty() {
                            println!("    Embedding Model: {}", ctx.embedding_model);
                        }
                        if ctx.dimensions > 0 {
                            println!("    Dimensions: {}", ctx.dimensions);
                        }
                        if ctx.timeout > 0 {
                            println!("    Timeout: {}s", ctx.timeout);
                        }
                    }
                }

                Ok(())
            }
        }
    }
}

fn or_env(value: &str) -> &str {
    if value.is_empty() { "(from environment)" } else { value }
}
