//! Integration tests for the aste_eval CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const LABELS: &str = "\
Great battery####[([1], [0], 'POS')]
Dim screen , high price####[([1], [0], 'NEG'), ([4], [3], 'NEG')]
";

const PREDICTIONS: &str = r#"{"predict": "aspect: battery, opinion: great, sentiment: positive"}
{"predict": "aspect: screen, opinion: dim, sentiment: positive | aspect: price, opinion: high, sentiment: negative"}
"#;

fn metrics_cmd(dir: &TempDir) -> Command {
    fs::write(dir.path().join("test.txt"), LABELS).unwrap();
    fs::write(dir.path().join("pred.jsonl"), PREDICTIONS).unwrap();
    let mut cmd = Command::cargo_bin("aste_eval").unwrap();
    cmd.arg("metrics")
        .arg("--label-path")
        .arg(dir.path().join("test.txt"))
        .arg("--predict-path")
        .arg(dir.path().join("pred.jsonl"))
        .arg("--output-error-path")
        .arg(dir.path().join("errors.json"))
        .arg("--checkpoint")
        .arg("1200")
        .arg("--results-file")
        .arg(dir.path().join("results.txt"));
    cmd
}

#[test]
fn test_metrics_command() {
    let dir = TempDir::new().unwrap();
    metrics_cmd(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "n_labels, n_preds, n_common, Precision, Recall, F1",
        ))
        .stdout(predicate::str::contains("3, 3, 2, 0.6667, 0.6667, 0.6667"));

    let results = fs::read_to_string(dir.path().join("results.txt")).unwrap();
    assert!(results.starts_with("Result of checkpoint 1200:\nn_labels=3,\nn_preds=3,\nn_common=2,"));
    assert!(results.ends_with("F1=0.6667\n\n"));

    let errors = fs::read_to_string(dir.path().join("errors.json")).unwrap();
    assert!(errors.contains("\"sentence\": \"Dim screen , high price\""));
}

#[test]
fn test_metrics_appends_to_results_log() {
    let dir = TempDir::new().unwrap();
    metrics_cmd(&dir).assert().success();
    metrics_cmd(&dir).assert().success();
    let results = fs::read_to_string(dir.path().join("results.txt")).unwrap();
    assert_eq!(results.matches("Result of checkpoint 1200:").count(), 2);
}

#[test]
fn test_analyze_command() {
    let dir = TempDir::new().unwrap();
    metrics_cmd(&dir).assert().success();

    let mut cmd = Command::cargo_bin("aste_eval").unwrap();
    cmd.arg("analyze")
        .arg("--input")
        .arg(dir.path().join("errors.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "3. Sentiment polarity predicted incorrectly: 1",
        ))
        .stdout(predicate::str::contains("error_visualization.html"));

    assert!(dir.path().join("errors_sentiment_error.json").exists());
    assert!(!dir.path().join("errors_term_error.json").exists());
    let html = fs::read_to_string(dir.path().join("error_visualization.html")).unwrap();
    assert!(html.contains("❌ (screen, dim, positive)"));
}

#[test]
fn test_missing_label_file() {
    let dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("aste_eval").unwrap();
    cmd.arg("metrics")
        .arg("--label-path")
        .arg(dir.path().join("missing.txt"))
        .arg("--predict-path")
        .arg(dir.path().join("pred.jsonl"))
        .arg("--output-error-path")
        .arg(dir.path().join("errors.json"))
        .arg("--checkpoint")
        .arg("1")
        .arg("--results-file")
        .arg(dir.path().join("results.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load the labels"));
}

#[test]
fn test_invalid_label_line() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.txt"), "Great battery####[([1], [0], 'MEH')]\n").unwrap();
    let mut cmd = Command::cargo_bin("aste_eval").unwrap();
    cmd.arg("metrics")
        .arg("--label-path")
        .arg(dir.path().join("bad.txt"))
        .arg("--predict-path")
        .arg(dir.path().join("pred.jsonl"))
        .arg("--output-error-path")
        .arg(dir.path().join("errors.json"))
        .arg("--checkpoint")
        .arg("1")
        .arg("--results-file")
        .arg(dir.path().join("results.txt"))
        .assert()
        .failure();
}
