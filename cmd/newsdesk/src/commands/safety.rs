//! Content moderation commands.

use clap::{Args, Subcommand};

use newsdesk_safety::{ViolenceClassifier, DEFAULT_THRESHOLD};

use super::{classifier_options, get_context, print_verbose};
use crate::Cli;

/// Content moderation with Azure AI Content Safety.
///
/// The endpoint comes from the context or AZURE_CONTENT_SAFETY_ENDPOINT.
#[derive(Args)]
pub struct SafetyCommand {
    #[command(subcommand)]
    command: SafetySubcommand,
}

#[derive(Subcommand)]
enum SafetySubcommand {
    /// Check whether a text is violent; prints true or false
    Violence {
        /// Text to analyze
        text: String,
        /// Severities strictly above this are flagged
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,
    },
}

impl SafetyCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            SafetySubcommand::Violence { text, threshold } => {
                let ctx = get_context(cli)?;
                let opts = classifier_options(&ctx, *threshold);

                print_verbose(cli, &format!("Using context: {}", ctx.name));
                print_verbose(cli, &format!("Threshold: {}", threshold));

                let classifier = ViolenceClassifier::from_options(opts)?;
                let violent = classifier.is_violent(text).await;
                println!("{}", violent);
                Ok(())
            }
        }
    }
}
