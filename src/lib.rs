/*!
This library evaluates Aspect Sentiment Triplet Extraction (ASTE) models. A triplet is made of an
aspect term, an opinion term and a sentiment (positive, negative or neutral). A run is evaluated
in two passes:
* The metrics pass compares the triplets generated by a model to the gold triplets, computes the
    precision, recall and F1 of the run and collects one error record per unmatched prediction.
* The error analysis reads the error records back, deduplicates them and sorts every sentence into
    an error category. The categories can be saved as JSON files and visualized as an HTML page.

# Inputs
* Gold label files: one sentence per line, `sentence####[([1, 2], [4], 'POS'), ...]`. The indices
    point into the whitespace-separated tokens of the sentence.
* Prediction files: one JSON object per line, `{"predict": "aspect: ..., opinion: ...,
    sentiment: ... | aspect: ..."}`. The i-th prediction belongs to the i-th labelled sentence.

# Terminology
* A triplet is *normalized* when its three elements are trimmed and lowercased. Triplets are only
    ever compared once normalized.
* A *common* triplet is a predicted triplet matched with a gold triplet of the same sentence. A
    gold triplet can match at most one predicted triplet.
* An *error record* is a sentence along with its full gold list and its full predicted list.
*/

mod analysis;
mod config;
mod loader;
mod metrics;
mod record;
mod reporter;

// The public api starts here
pub use triplet_parsing;
pub use triplet_parsing::{LabelledSentence, PredictionExtractor, Sentiment, Triplet};

pub use metrics::{
    evaluate_triplets, match_sentence, ComputationError, DivByZeroStrat, DivisionByZeroError,
    InconsistentLengthError, MatchCounts, Scores, SentenceMatch, TripletEvaluation,
};

pub use analysis::{classify_sentence, ErrorAnalysis, ErrorCategory, ErrorCategoryParsingError};

pub use record::ErrorRecord;

pub use loader::{deduplicate, load_and_deduplicate, read_label_file, read_predictions, LoadError};

pub use reporter::{
    append_results_log, escape_html, output_dir_of, render_html, save_error_details, write_html,
    write_error_predictions, ReportError, Reporter, DEFAULT_ERROR_PREFIX, DEFAULT_HTML_FILENAME,
};

pub use config::{EvalConfig, EvalConfigBuilder};

/// Main entrypoint of the metrics pass. This function extracts the triplets out of the raw model
/// outputs, matches them against the gold triplets and computes the precision, recall and F1 of
/// the run. A raw output of `None` (an undecodable prediction) counts as an empty prediction.
/// Instead of taking in the raw parameters, this function takes an `EvalConfig` struct and uses
/// sensible defaults.
///
/// * `labelled`: Sentences and their gold triplets
/// * `raw_predictions`: Raw output of the model for each sentence
/// * `config`: Parameters used to extract the triplets and compute the metrics.
///
/// #Example
/// ```rust
/// use aste_eval::{evaluate_predictions_conf, EvalConfig, MatchCounts};
/// use aste_eval::triplet_parsing::parse_label_file;
///
/// let labelled = parse_label_file("The battery is great####[([1], [3], 'POS')]").unwrap();
/// let raw_predictions = vec![Some(
///     "aspect: battery, opinion: great, sentiment: positive | aspect: screen, opinion: dim, sentiment: negative",
/// )];
///
/// let evaluation = evaluate_predictions_conf(&labelled, &raw_predictions, EvalConfig::default());
/// let evaluation = evaluation.unwrap();
/// assert_eq!(evaluation.counts, MatchCounts::new(2, 1, 1));
/// assert_eq!(evaluation.error_predictions.len(), 1);
/// ```
pub fn evaluate_predictions_conf<S: AsRef<str>>(
    labelled: &[LabelledSentence],
    raw_predictions: &[Option<S>],
    config: EvalConfig,
) -> Result<TripletEvaluation, ComputationError> {
    evaluate_predictions(
        labelled,
        raw_predictions,
        config.delimiter(),
        config.zero_division(),
    )
}

/// Same as `evaluate_predictions_conf`, with the raw parameters.
///
/// * `labelled`: Sentences and their gold triplets
/// * `raw_predictions`: Raw output of the model for each sentence
/// * `delimiter`: Character separating two triplets in a raw output
/// * `zero_division`: What to do when a denominator is 0
pub fn evaluate_predictions<S: AsRef<str>>(
    labelled: &[LabelledSentence],
    raw_predictions: &[Option<S>],
    delimiter: char,
    zero_division: DivByZeroStrat,
) -> Result<TripletEvaluation, ComputationError> {
    metrics::check_consistent_length(labelled, raw_predictions)?;
    let extractor = PredictionExtractor::new(delimiter)?;
    let predict_all = extractor.extract_all(raw_predictions);
    evaluate_triplets(labelled, &predict_all, zero_division)
}
