/**
This modules gives a few tools to print the metrics of a run and to persist its outputs: the dump
of the unmatched predictions, the results log, one JSON file per error category and an HTML
visualization of the categorized errors.
*/
use crate::analysis::{ErrorAnalysis, ErrorCategory};
use crate::metrics::{MatchCounts, Scores, TripletEvaluation};
use crate::record::ErrorRecord;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::error::Error;
use std::fmt::Display;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use triplet_parsing::Triplet;

/// Default prefix of the per category JSON files.
pub const DEFAULT_ERROR_PREFIX: &str = "errors";
/// Default file name of the HTML visualization.
pub const DEFAULT_HTML_FILENAME: &str = "error_visualization.html";

#[derive(Debug)]
pub enum ReportError {
    Io(PathBuf, io::Error),
    Json(PathBuf, serde_json::Error),
}

impl Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(path, err) => write!(f, "Could not write {}: {}", path.display(), err),
            Self::Json(path, err) => {
                write!(f, "Could not serialize into {}: {}", path.display(), err)
            }
        }
    }
}

impl Error for ReportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(_, err) => Some(err),
            Self::Json(_, err) => Some(err),
        }
    }
}

/// The reporter holds the counts and the metrics of a run. It can be used to display the results
/// (i.e. prettyprint them) as if they were collected into a dataframe, and to produce the entry
/// appended to the results log.
///
/// # Example
///
/// ```rust
/// use aste_eval::{MatchCounts, Reporter, DivByZeroStrat};
///
/// let counts = MatchCounts::new(10, 8, 6);
/// let reporter = Reporter::new(counts, counts.scores(DivByZeroStrat::ReplaceBy0).unwrap());
/// let expected_report = "n_labels, n_preds, n_common, Precision, Recall, F1
/// 8, 10, 6, 0.6000, 0.7500, 0.6667\n";
/// assert_eq!(expected_report, reporter.to_string());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Reporter {
    pub counts: MatchCounts,
    pub scores: Scores,
}

impl Reporter {
    pub fn new(counts: MatchCounts, scores: Scores) -> Self {
        Reporter { counts, scores }
    }

    /// The entry appended to the results log after each run.
    pub fn results_log_entry(&self, checkpoint: u64) -> String {
        format!(
            "Result of checkpoint {}:\nn_labels={},\nn_preds={},\nn_common={},\nPrecision={:.4},\nRecall={:.4},\nF1={:.4}\n\n",
            checkpoint,
            self.counts.n_labels,
            self.counts.n_preds,
            self.counts.n_common,
            self.scores.precision,
            self.scores.recall,
            self.scores.f1
        )
    }
}

impl From<&TripletEvaluation> for Reporter {
    fn from(value: &TripletEvaluation) -> Self {
        Reporter::new(value.counts, value.scores)
    }
}

/// The Reporter struct acts as a dataframe when displayed.
impl Display for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "n_labels, n_preds, n_common, Precision, Recall, F1")?;
        writeln!(
            f,
            "{}, {}, {}, {:.4}, {:.4}, {:.4}",
            self.counts.n_labels,
            self.counts.n_preds,
            self.counts.n_common,
            self.scores.precision,
            self.scores.recall,
            self.scores.f1
        )
    }
}

/// Appends the entry of a run to the results log, creating the log if needed.
pub fn append_results_log<P: AsRef<Path>>(
    path: P,
    checkpoint: u64,
    reporter: &Reporter,
) -> Result<(), ReportError> {
    let path = path.as_ref();
    let to_report_error = |e: io::Error| ReportError::Io(path.to_path_buf(), e);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_report_error)?;
    file.write_all(reporter.results_log_entry(checkpoint).as_bytes())
        .map_err(to_report_error)?;
    log::debug!("Appended the results of checkpoint {} to {}", checkpoint, path.display());
    Ok(())
}

fn write_json<P: AsRef<Path>, T: Serialize + ?Sized>(
    path: P,
    value: &T,
    indent: &[u8],
) -> Result<(), ReportError> {
    let path = path.as_ref();
    let to_report_error = |e: io::Error| ReportError::Io(path.to_path_buf(), e);
    let mut writer = BufWriter::new(File::create(path).map_err(to_report_error)?);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(indent));
    value
        .serialize(&mut serializer)
        .map_err(|e| ReportError::Json(path.to_path_buf(), e))?;
    writer.flush().map_err(to_report_error)?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

/// Writes the records of the unmatched predictions as a JSON array, indented with 4 spaces.
pub fn write_error_predictions<P: AsRef<Path>>(
    path: P,
    records: &[ErrorRecord],
) -> Result<(), ReportError> {
    write_json(path, records, b"    ")
}

/// The directory of the (absolute) input path, where the analysis outputs are written.
pub fn output_dir_of<P: AsRef<Path>>(input_path: P) -> PathBuf {
    let input_path = input_path.as_ref();
    std::path::absolute(input_path)
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Writes one `{prefix}_{category}.json` file per non-empty category into `output_dir`, indented
/// with 2 spaces. Returns the paths of the written files.
pub fn save_error_details<P: AsRef<Path>>(
    analysis: &ErrorAnalysis,
    output_dir: P,
    prefix: &str,
) -> Result<Vec<PathBuf>, ReportError> {
    let mut written = Vec::new();
    for (category, records) in analysis.iter() {
        let path = output_dir
            .as_ref()
            .join(format!("{}_{}.json", prefix, category));
        write_json(&path, records, b"  ")?;
        written.push(path);
    }
    Ok(written)
}

fn category_color(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::ExtraTriplet => "orange",
        ErrorCategory::TermError => "red",
        ErrorCategory::SentimentError => "blue",
    }
}

/// Escapes the characters with a special meaning in HTML, quotes included.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn color_span(text: &str, color: &str) -> String {
    format!(
        "<span style=\"color:{}; font-weight:bold\">{}</span>",
        color,
        escape_html(text)
    )
}

fn write_record(
    f: &mut std::fmt::Formatter<'_>,
    category: ErrorCategory,
    record: &ErrorRecord,
) -> std::fmt::Result {
    let label_set: Vec<&Triplet> = record.label.iter().unique().collect();
    writeln!(
        f,
        "<li><strong>Sentence:</strong> {}<br>",
        escape_html(&record.sentence)
    )?;
    writeln!(f, "<strong>Label:</strong><br>")?;
    for triplet in label_set.iter() {
        writeln!(f, "{}<br>", color_span(&format!("✔ {}", triplet), "green"))?;
    }
    writeln!(f, "<strong>Prediction:</strong><br>")?;
    for triplet in record.error_predict.iter().unique() {
        let line = match label_set.contains(&triplet) {
            true => color_span(&format!("✔ {}", triplet), "green"),
            false => color_span(&format!("❌ {}", triplet), category_color(category)),
        };
        writeln!(f, "{}<br>", line)?;
    }
    writeln!(f, "<hr></li>")
}

/// The HTML visualization of an analysis, rendered through `Display`.
struct HtmlPage<'a>(&'a ErrorAnalysis);

impl Display for HtmlPage<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "<html><head><meta charset='utf-8'><style>body{{font-family:Arial}}</style></head><body>"
        )?;
        writeln!(f, "<h2>Visualization of the prediction errors</h2>")?;
        for (category, records) in self.0.iter() {
            writeln!(
                f,
                "<h3>Error type: {} ({} sentences)</h3><ul>",
                escape_html(category.description()),
                records.len()
            )?;
            for record in records {
                write_record(f, category, record)?;
            }
            writeln!(f, "</ul>")?;
        }
        write!(f, "</body></html>")
    }
}

/// Renders a self-contained HTML page with one section per non-empty category. Gold triplets are
/// green, correct predictions are green and wrong ones use the color of the category.
pub fn render_html(analysis: &ErrorAnalysis) -> String {
    HtmlPage(analysis).to_string()
}

/// Renders the analysis and writes it to `path`.
pub fn write_html<P: AsRef<Path>>(analysis: &ErrorAnalysis, path: P) -> Result<(), ReportError> {
    let path = path.as_ref();
    std::fs::write(path, render_html(analysis))
        .map_err(|e| ReportError::Io(path.to_path_buf(), e))?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::DivByZeroStrat;
    use std::fs::read_to_string;
    use tempfile::TempDir;

    fn t(a: &str, o: &str, s: &str) -> Triplet {
        Triplet::new(a, o, s)
    }

    fn sample_analysis() -> ErrorAnalysis {
        ErrorAnalysis::from_records(vec![
            ErrorRecord::new(
                "The battery <really> lasts",
                vec![t("battery", "lasts", "positive")],
                vec![t("battery", "lasts", "negative")],
            ),
            ErrorRecord::new(
                "Bright screen, high price",
                vec![t("screen", "bright", "positive")],
                vec![
                    t("screen", "bright", "positive"),
                    t("price", "high", "negative"),
                    t("price", "high", "negative"),
                ],
            ),
        ])
    }

    #[test]
    fn test_reporter_display() {
        let counts = MatchCounts::new(10, 8, 6);
        let reporter = Reporter::new(counts, counts.scores(DivByZeroStrat::ReplaceBy0).unwrap());
        // NOTE: Do not change the indentation
        let expected = "n_labels, n_preds, n_common, Precision, Recall, F1
8, 10, 6, 0.6000, 0.7500, 0.6667\n";
        assert_eq!(reporter.to_string(), expected);
    }

    #[test]
    fn test_append_results_log() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.txt");
        let counts = MatchCounts::new(10, 8, 6);
        let reporter = Reporter::new(counts, counts.scores(DivByZeroStrat::ReplaceBy0).unwrap());
        append_results_log(&path, 85, &reporter).unwrap();
        append_results_log(&path, 90, &reporter).unwrap();
        let content = read_to_string(&path).unwrap();
        let entry = "Result of checkpoint 85:
n_labels=8,
n_preds=10,
n_common=6,
Precision=0.6000,
Recall=0.7500,
F1=0.6667\n\n";
        assert!(content.starts_with(entry));
        assert!(content.contains("Result of checkpoint 90:"));
        assert_eq!(content.matches("Result of checkpoint").count(), 2);
    }

    #[test]
    fn test_write_error_predictions_uses_4_spaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("errors.json");
        let records = vec![ErrorRecord::new("é", vec![], vec![t("a", "b", "positive")])];
        write_error_predictions(&path, &records).unwrap();
        let content = read_to_string(&path).unwrap();
        assert!(content.starts_with("[\n    {\n        \"sentence\": \"é\""));
        let back: Vec<ErrorRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn test_save_error_details() {
        let dir = TempDir::new().unwrap();
        let written = save_error_details(&sample_analysis(), dir.path(), "errors").unwrap();
        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["errors_extra_triplet.json", "errors_sentiment_error.json"]
        );
        let content = read_to_string(&written[0]).unwrap();
        assert!(content.starts_with("[\n  {\n    \"sentence\""));
        let records: Vec<ErrorRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(records[0].sentence, "Bright screen, high price");
    }

    #[test]
    fn test_render_html() {
        let html = render_html(&sample_analysis());
        assert!(html.starts_with("<html>"));
        assert!(html.ends_with("</body></html>"));
        assert!(html.contains("The battery &lt;really&gt; lasts"));
        assert!(html.contains("(1 sentences)"));
        assert!(html.contains(
            "<span style=\"color:blue; font-weight:bold\">❌ (battery, lasts, negative)</span>"
        ));
        assert!(html.contains(
            "<span style=\"color:green; font-weight:bold\">✔ (screen, bright, positive)</span>"
        ));
        // Duplicated predictions are rendered once.
        assert_eq!(html.matches("❌ (price, high, negative)").count(), 1);
        assert!(!html.contains(ErrorCategory::TermError.description()));
    }

    #[test]
    fn test_render_html_empty_analysis() {
        let html = render_html(&ErrorAnalysis::default());
        assert_eq!(
            html,
            "<html><head><meta charset='utf-8'><style>body{font-family:Arial}</style></head><body>\n<h2>Visualization of the prediction errors</h2>\n</body></html>"
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">'&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_output_dir_of() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("errors.json");
        assert_eq!(output_dir_of(&input), dir.path());
    }
}
