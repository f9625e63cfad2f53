//! Metrics command implementation

use anyhow::{Context, Result};
use aste_eval::{
    append_results_log, evaluate_predictions_conf, read_label_file, read_predictions,
    write_error_predictions, DivByZeroStrat, EvalConfigBuilder, Reporter,
};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the metrics command
#[derive(Debug, Args)]
pub struct MetricsArgs {
    /// Gold label file, one `sentence####[...]` line per sentence
    #[arg(long, value_name = "FILE")]
    pub label_path: PathBuf,

    /// JSONL file of predictions, one `{"predict": "..."}` object per line
    #[arg(long, value_name = "FILE")]
    pub predict_path: PathBuf,

    /// Where to write the records of the unmatched predictions
    #[arg(long, value_name = "FILE")]
    pub output_error_path: PathBuf,

    /// Checkpoint identifier written in the results log
    #[arg(long)]
    pub checkpoint: u64,

    /// Results log the metrics of the run are appended to
    #[arg(long, value_name = "FILE")]
    pub results_file: PathBuf,

    /// Character separating two triplets in a prediction
    #[arg(long, default_value_t = '|')]
    pub delimiter: char,

    /// What to do when a denominator is 0 (`zero` or `error`)
    #[arg(long, default_value = "zero")]
    pub zero_division: DivByZeroStrat,
}

impl MetricsArgs {
    /// Execute the metrics command
    pub fn execute(&self) -> Result<()> {
        let labelled = read_label_file(&self.label_path).context("Failed to load the labels")?;
        let raw_predictions =
            read_predictions(&self.predict_path).context("Failed to load the predictions")?;
        log::info!(
            "Evaluating {} predictions against {} labelled sentences",
            raw_predictions.len(),
            labelled.len()
        );

        let config = EvalConfigBuilder::new()
            .delimiter(self.delimiter)
            .division_by_zero(self.zero_division)
            .build();
        let evaluation = evaluate_predictions_conf(&labelled, &raw_predictions, config)
            .with_context(|| {
                format!(
                    "Failed to evaluate {} against {}",
                    self.predict_path.display(),
                    self.label_path.display()
                )
            })?;

        let reporter = Reporter::from(&evaluation);
        print!("{}", reporter);

        write_error_predictions(&self.output_error_path, &evaluation.error_predictions)
            .context("Failed to write the error records")?;
        println!(
            "{} error records saved to {}",
            evaluation.error_predictions.len(),
            self.output_error_path.display()
        );

        append_results_log(&self.results_file, self.checkpoint, &reporter)
            .context("Failed to append to the results log")?;
        Ok(())
    }
}
