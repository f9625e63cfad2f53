//! Analyze command implementation

use anyhow::{Context, Result};
use aste_eval::{
    load_and_deduplicate, output_dir_of, save_error_details, write_html, ErrorAnalysis,
    DEFAULT_ERROR_PREFIX, DEFAULT_HTML_FILENAME,
};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the analyze command
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// JSON array of error records, as written by the metrics command
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Prefix of the per category JSON files
    #[arg(long, default_value = DEFAULT_ERROR_PREFIX)]
    pub prefix: String,

    /// File name of the HTML visualization, relative to the directory of the input
    #[arg(long, value_name = "FILE", default_value = DEFAULT_HTML_FILENAME)]
    pub html: PathBuf,
}

impl AnalyzeArgs {
    /// Execute the analyze command
    pub fn execute(&self) -> Result<()> {
        let records =
            load_and_deduplicate(&self.input).context("Failed to load the error records")?;
        let analysis = ErrorAnalysis::from_records(records);
        if analysis.n_correct() > 0 {
            log::info!(
                "{} records have predictions matching their labels",
                analysis.n_correct()
            );
        }

        println!("Error categories:");
        for (i, (category, count)) in analysis.stats().into_iter().enumerate() {
            println!("{}. {}: {}", i + 1, category.description(), count);
        }

        let output_dir = output_dir_of(&self.input);
        for path in save_error_details(&analysis, &output_dir, &self.prefix)
            .context("Failed to save the error categories")?
        {
            println!("Saved {}", path.display());
        }

        let html_path = output_dir.join(&self.html);
        write_html(&analysis, &html_path).context("Failed to write the HTML visualization")?;
        println!("HTML visualization saved to {}", html_path.display());
        Ok(())
    }
}
