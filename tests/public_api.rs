use aste_eval::{
    evaluate_predictions_conf, load_and_deduplicate, read_label_file, read_predictions,
    save_error_details, write_error_predictions, write_html, DivByZeroStrat, EvalConfig,
    EvalConfigBuilder, ErrorAnalysis, ErrorCategory, MatchCounts, Triplet,
};
use serde::Serialize;
use serde_jsonlines::write_json_lines;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[derive(Serialize)]
struct PredictionLine<'a> {
    predict: &'a str,
}

const LABELS: &str = "\
The battery life is great####[([1, 2], [4], 'POS')]
The screen is dim but the price is fair####[([1], [3], 'NEG'), ([6], [8], 'POS')]
Nice keyboard####[([1], [0], 'POS')]
Service was ok####[([0], [2], 'NEU')]
";

const PREDICTIONS: [&str; 4] = [
    "aspect: battery life, opinion: great, sentiment: positive",
    "aspect: screen, opinion: dim, sentiment: negative | aspect: price, opinion: fair, sentiment: positive | aspect: screen, opinion: dark, sentiment: negative",
    "aspect: keyboard, opinion: nice, sentiment: negative",
    "aspect: service, opinion: ok, sentiment: neutral",
];

fn write_inputs(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let label_path = dir.join("test.txt");
    fs::write(&label_path, LABELS).unwrap();
    let predict_path = dir.join("generated_predictions.jsonl");
    write_json_lines(
        &predict_path,
        PREDICTIONS.iter().map(|p| PredictionLine { predict: p }),
    )
    .unwrap();
    (label_path, predict_path)
}

#[test]
fn test_full_evaluation_run() {
    let dir = TempDir::new().unwrap();
    let (label_path, predict_path) = write_inputs(dir.path());

    let labelled = read_label_file(&label_path).unwrap();
    assert_eq!(labelled.len(), 4);
    assert_eq!(
        labelled[1].label,
        vec![
            Triplet::new("screen", "dim", "negative"),
            Triplet::new("price", "fair", "positive")
        ]
    );
    let raw_predictions = read_predictions(&predict_path).unwrap();

    let evaluation =
        evaluate_predictions_conf(&labelled, &raw_predictions, EvalConfig::default()).unwrap();
    assert_eq!(evaluation.counts, MatchCounts::new(6, 5, 4));
    assert!((evaluation.scores.precision - 4. / 6.).abs() < 1e-6);
    assert!((evaluation.scores.recall - 0.8).abs() < 1e-6);
    // One record for the extra "dark" triplet, one for the wrong keyboard sentiment.
    assert_eq!(evaluation.error_predictions.len(), 2);

    let errors_path = dir.path().join("error_predictions.json");
    write_error_predictions(&errors_path, &evaluation.error_predictions).unwrap();

    let records = load_and_deduplicate(&errors_path).unwrap();
    let analysis = ErrorAnalysis::from_records(records);
    assert_eq!(analysis.count(ErrorCategory::ExtraTriplet), 1);
    assert_eq!(analysis.count(ErrorCategory::SentimentError), 1);
    assert_eq!(analysis.count(ErrorCategory::TermError), 0);

    let written = save_error_details(&analysis, dir.path(), "errors").unwrap();
    assert_eq!(
        written,
        vec![
            dir.path().join("errors_extra_triplet.json"),
            dir.path().join("errors_sentiment_error.json"),
        ]
    );
    assert!(!dir.path().join("errors_term_error.json").exists());

    let html_path = dir.path().join("error_visualization.html");
    write_html(&analysis, &html_path).unwrap();
    let html = fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("❌ (screen, dark, negative)"));
    assert!(html.contains("❌ (keyboard, nice, negative)"));
}

#[test]
fn test_zero_division_strategies() {
    let dir = TempDir::new().unwrap();
    let label_path = dir.path().join("test.txt");
    fs::write(&label_path, "Nothing to see####[]\n").unwrap();
    let labelled = read_label_file(&label_path).unwrap();
    let raw_predictions = vec![Some("")];

    let evaluation =
        evaluate_predictions_conf(&labelled, &raw_predictions, EvalConfig::default()).unwrap();
    assert_eq!(evaluation.counts, MatchCounts::new(0, 0, 0));
    assert_eq!(evaluation.scores.f1, 0.);

    let config = EvalConfigBuilder::new()
        .division_by_zero(DivByZeroStrat::ReturnError)
        .build();
    assert!(evaluate_predictions_conf(&labelled, &raw_predictions, config).is_err());
}
