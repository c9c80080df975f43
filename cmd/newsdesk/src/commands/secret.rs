//! Secret lookup commands.

use clap::{Args, Subcommand};

use newsdesk_azure::default_credential;

use super::{create_secrets, get_context, print_verbose};
use crate::Cli;

/// Resolve secrets.
///
/// Lookups try Key Vault first (the context's vault or AZURE_KEYVAULT_URL),
/// then the environment variable of the same name, then the default.
#[derive(Args)]
pub struct SecretCommand {
    #[command(subcommand)]
    command: SecretSubcommand,
}

#[derive(Subcommand)]
enum SecretSubcommand {
    /// Print a secret value
    Get {
        /// Secret name
        name: String,
        /// Value to use when the secret is not found
        #[arg(long)]
        default: Option<String>,
    },
}

impl SecretCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            SecretSubcommand::Get { name, default } => {
                let ctx = get_context(cli)?;
                let secrets = create_secrets(&ctx, default_credential())?;
                print_verbose(cli, &format!("Key Vault configured: {}", secrets.has_store()));

                match secrets.get(name, default.as_deref()).await {
                    Some(value) => {
                        println!("{}", value);
                        Ok(())
                    }
                    None => anyhow::bail!("secret '{}' not found", name),
                }
            }
        }
    }
}
