//! CLI command implementations

use anyhow::Result;
use clap::Subcommand;

pub mod analyze;
pub mod metrics;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute precision, recall and F1 of a prediction file against a label file
    Metrics(metrics::MetricsArgs),

    /// Categorize the error records dumped by the metrics command
    Analyze(analyze::AnalyzeArgs),
}

impl Commands {
    pub fn execute(&self) -> Result<()> {
        match self {
            Self::Metrics(args) => args.execute(),
            Self::Analyze(args) => args.execute(),
        }
    }
}
