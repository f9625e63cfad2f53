use serde::{Deserialize, Serialize};
use triplet_parsing::Triplet;

/// A sentence along with its full gold list and its full predicted list. This is the record
/// dumped by the metrics pass and the one read back (and categorized) by the error analysis.
///
/// The field names are the ones of the persisted JSON files: `{"sentence": ..., "label": [[a,
/// o, s], ...], "error_predict": [[a, o, s], ...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub sentence: String,
    pub label: Vec<Triplet>,
    pub error_predict: Vec<Triplet>,
}

impl ErrorRecord {
    pub fn new<S: Into<String>>(
        sentence: S,
        label: Vec<Triplet>,
        error_predict: Vec<Triplet>,
    ) -> Self {
        ErrorRecord {
            sentence: sentence.into(),
            label,
            error_predict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_layout() {
        let record = ErrorRecord::new(
            "The screen is bright",
            vec![Triplet::new("screen", "bright", "positive")],
            vec![Triplet::new("screen", "bright", "negative")],
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "sentence": "The screen is bright",
                "label": [["screen", "bright", "positive"]],
                "error_predict": [["screen", "bright", "negative"]],
            })
        );
    }

    #[test]
    fn test_reads_unnormalized_records() {
        let raw = r#"{"sentence": "s", "label": [["Screen ", "bright", "POSITIVE"]], "error_predict": []}"#;
        let record: ErrorRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.label, vec![Triplet::new("screen", "bright", "positive")]);
        assert!(record.error_predict.is_empty());
    }
}
