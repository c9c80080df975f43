//! Batch embedding command.

use std::collections::BTreeMap;
use std::time::Duration;

use clap::Args;

use newsdesk_cli::load_records;
use newsdesk_cli::Context;
use newsdesk_embed::{generate, BatchOptions};

use super::{
    create_embedder, get_context, output_result, print_success, print_verbose, print_warning,
    require_input_file,
};
use crate::Cli;

/// Generate embeddings for a record file.
///
/// The input (-f) is a JSON or YAML list of {index, text} records, or a
/// .jsonl file with one record per line. Records are sent in batches with
/// a pause between batches; failed batches are reported and skipped.
#[derive(Args)]
pub struct EmbedCommand {
    /// Records per request
    #[arg(long)]
    batch_size: Option<usize>,
    /// Embedding dimensions
    #[arg(long)]
    dimensions: Option<usize>,
    /// Embedding model (deployment name)
    #[arg(long)]
    model: Option<String>,
    /// Seconds to wait between batches
    #[arg(long)]
    delay_secs: Option<u64>,
}

impl EmbedCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let input_file = require_input_file(cli)?;
        let ctx = get_context(cli)?;

        let records = load_records(input_file)?;
        let opts = self.options(&ctx);

        print_verbose(cli, &format!("Using context: {}", ctx.name));
        print_verbose(cli, &format!("Records: {}", records.len()));
        print_verbose(
            cli,
            &format!(
                "Model: {}, dimensions: {}, batch size: {}",
                opts.model, opts.dimensions, opts.batch_size
            ),
        );

        let embedder = create_embedder(&ctx).await?;
        let pairs: Vec<(u64, &str)> = records.iter().map(|r| (r.index, r.text.as_str())).collect();
        let result = generate(&embedder, &pairs, &opts).await?;

        for failure in result.failures() {
            print_warning(&format!(
                "batch {} (items {} to {}) failed: {}",
                failure.batch, failure.items.start, failure.items.end, failure.error
            ));
        }

        if result.is_empty() && result.total() > 0 {
            anyhow::bail!("no embeddings were generated");
        }

        let embeddings: BTreeMap<u64, &Vec<f32>> = result.iter().map(|(k, v)| (*k, v)).collect();
        output_result(cli, &embeddings)?;

        print_success(&format!(
            "Embedded {} of {} records",
            result.len(),
            result.total()
        ));
        Ok(())
    }

    /// Defaults, then context settings, then flags.
    fn options(&self, ctx: &Context) -> BatchOptions {
        let mut opts = BatchOptions::default();
        if !ctx.embedding_model.is_empty() {
            opts = opts.with_model(&ctx.embedding_model);
        }
        if ctx.dimensions > 0 {
            opts = opts.with_dimensions(ctx.dimensions);
        }
        if let Some(model) = &self.model {
            opts = opts.with_model(model);
        }
        if let Some(dim) = self.dimensions {
            opts = opts.with_dimensions(dim);
        }
        if let Some(n) = self.batch_size {
            opts = opts.with_batch_size(n);
        }
        if let Some(secs) = self.delay_secs {
            opts = opts.with_delay(Duration::from_secs(secs));
        }
        opts
    }
}
