//! newsdesk CLI - embedding, moderation and schema tools for the news
//! pipeline.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{
    ConfigCommand, EmbedCommand, SafetyCommand, SanitizeCommand, SchemaCommand, SecretCommand,
};

/// newsdesk CLI - embedding, moderation and schema tools for the news
/// pipeline.
///
/// This tool drives the pipeline's Azure services:
///   - Batch embeddings over Azure OpenAI
///   - Violence checks with Azure AI Content Safety
///   - Secret lookups through Key Vault
///   - Structured-output schemas and text cleanup
///
/// Configuration is stored in ~/.newsdesk/newsdesk/ and supports multiple
/// contexts, similar to kubectl's context management. Settings missing from
/// the context fall back to AZURE_* environment variables.
#[derive(Parser)]
#[command(name = "newsdesk")]
#[command(about = "News pipeline CLI tool")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.newsdesk/newsdesk/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Context name to use
    #[arg(short = 'c', long, global = true)]
    pub context: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Input file (JSON, YAML or JSON Lines)
    #[arg(short = 'f', long = "file", global = true)]
    pub input: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage CLI configuration
    Config(ConfigCommand),
    /// Generate embeddings in paced batches
    Embed(EmbedCommand),
    /// Content moderation
    Safety(SafetyCommand),
    /// Resolve secrets from Key Vault or the environment
    Secret(SecretCommand),
    /// Print structured-output response formats
    Schema(SchemaCommand),
    /// Strip soft hyphens from a JSON or YAML document
    Sanitize(SanitizeCommand),
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match &cli.command {
        Commands::Config(cmd) => cmd.run(&cli).await,
        Commands::Embed(cmd) => cmd.run(&cli).await,
        Commands::Safety(cmd) => cmd.run(&cli).await,
        Commands::Secret(cmd) => cmd.run(&cli).await,
        Commands::Schema(cmd) => cmd.run(&cli).await,
        Commands::Sanitize(cmd) => cmd.run(&cli).await,
    }
}
