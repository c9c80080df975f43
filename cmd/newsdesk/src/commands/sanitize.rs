//! Text cleanup command.

use clap::Args;

use newsdesk_cli::load_request;
use newsdesk_news::strip_soft_hyphens;

use super::{output_result, print_verbose, require_input_file};
use crate::Cli;

/// Remove soft hyphens (U+00AD) from every string in a JSON or YAML
/// document given with -f.
#[derive(Args)]
pub struct SanitizeCommand {}

impl SanitizeCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let input_file = require_input_file(cli)?;
        let doc: serde_json::Value = load_request(input_file)?;
        print_verbose(cli, &format!("Sanitizing {}", input_file));
        output_result(cli, &strip_soft_hyphens(doc))
    }
}
