//! Structured-output schema commands.

use clap::{Args, ValueEnum};

use newsdesk_news::{response_format, ClusterInfo, NewsItem};

use super::output_result;
use crate::Cli;

/// Print the response format requesting a schema from the model.
#[derive(Args)]
pub struct SchemaCommand {
    /// Which schema to print
    kind: SchemaKind,
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaKind {
    /// Classification of one news article
    News,
    /// Title and summary for a cluster of articles
    Cluster,
}

impl SchemaCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let format = match self.kind {
            SchemaKind::News => response_format::<NewsItem>("news_item"),
            SchemaKind::Cluster => response_format::<ClusterInfo>("cluster_info"),
        };
        output_result(cli, &format)
    }
}
