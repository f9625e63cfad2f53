/**
This module categorizes the sentences whose predicted triplets differ from the gold triplets. The
comparison is done on *sets*: duplicated triplets are ignored. Every mismatched sentence lands in
exactly one `ErrorCategory`, decided by the first rule that applies:
1. the sets are equal: the sentence is correct;
2. a shared (aspect, opinion) pair carries a swapped polarity: `SentimentError`;
3. every gold triplet was predicted, along with extra ones: `ExtraTriplet`;
4. anything else: `TermError`.
*/
use crate::record::ErrorRecord;
use ahash::AHashSet;
use enum_iterator::{all, Sequence};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;
use triplet_parsing::{Sentiment, Triplet};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Sequence, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// All the gold triplets were predicted, but so were some wrong ones.
    ExtraTriplet,
    /// An aspect or an opinion term is wrong or missing.
    TermError,
    /// The polarity of an (aspect, opinion) pair is wrong.
    SentimentError,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::ExtraTriplet => "extra_triplet",
            ErrorCategory::TermError => "term_error",
            ErrorCategory::SentimentError => "sentiment_error",
        }
    }

    /// Human readable description, used in the console summary and in the HTML report.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::ExtraTriplet => {
                "Triplets of the sentence correctly predicted, but extra triplets were predicted"
            }
            ErrorCategory::TermError => "Aspect or opinion term predicted incorrectly",
            ErrorCategory::SentimentError => "Sentiment polarity predicted incorrectly",
        }
    }
}

impl Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ErrorCategory {
    type Err = ErrorCategoryParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all::<ErrorCategory>()
            .find(|c| c.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| ErrorCategoryParsingError(String::from(s)))
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ErrorCategoryParsingError(String);

impl Display for ErrorCategoryParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Impossible to parse the string ({}) into an ErrorCategory",
            self.0
        )
    }
}

impl Error for ErrorCategoryParsingError {}

/// (predicted, gold) polarities counted as a sentiment error. A positive or negative prediction
/// against a neutral gold triplet is not part of the list.
const SENTIMENT_SWAPS: [(Sentiment, Sentiment); 4] = [
    (Sentiment::Positive, Sentiment::Negative),
    (Sentiment::Negative, Sentiment::Positive),
    (Sentiment::Neutral, Sentiment::Positive),
    (Sentiment::Neutral, Sentiment::Negative),
];

fn term_pairs(set: &AHashSet<&Triplet>) -> AHashSet<(String, String)> {
    set.iter()
        .map(|t| {
            let (aspect, opinion) = t.terms();
            (String::from(aspect), String::from(opinion))
        })
        .collect()
}

fn has_sentiment_swap(label_set: &AHashSet<&Triplet>, pred_set: &AHashSet<&Triplet>) -> bool {
    let label_ap = term_pairs(label_set);
    let pred_ap = term_pairs(pred_set);
    label_ap.intersection(&pred_ap).any(|(aspect, opinion)| {
        SENTIMENT_SWAPS.iter().any(|(predicted, gold)| {
            pred_set.contains(&Triplet::new(aspect, opinion, predicted.as_str()))
                && label_set.contains(&Triplet::new(aspect, opinion, gold.as_str()))
        })
    })
}

/// Categorizes a single sentence. Returns `None` if the predicted set equals the gold set.
pub fn classify_sentence(label: &[Triplet], predicted: &[Triplet]) -> Option<ErrorCategory> {
    let label_set: AHashSet<&Triplet> = label.iter().collect();
    let pred_set: AHashSet<&Triplet> = predicted.iter().collect();
    if pred_set == label_set {
        None
    } else if has_sentiment_swap(&label_set, &pred_set) {
        Some(ErrorCategory::SentimentError)
    } else if label_set.is_subset(&pred_set) {
        Some(ErrorCategory::ExtraTriplet)
    } else {
        Some(ErrorCategory::TermError)
    }
}

/// The mismatched records of a run, bucketed by category. Within a bucket, records keep the
/// order in which they were classified.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorAnalysis {
    buckets: BTreeMap<ErrorCategory, Vec<ErrorRecord>>,
    n_correct: usize,
}

impl ErrorAnalysis {
    /// Classifies each record and stores it in the bucket of its category. Exact matches are only
    /// counted.
    pub fn from_records<I: IntoIterator<Item = ErrorRecord>>(records: I) -> Self {
        let mut analysis = ErrorAnalysis::default();
        for record in records {
            analysis.insert(record);
        }
        analysis
    }

    /// Classifies a record. Returns its category, or `None` if the prediction is correct.
    pub fn insert(&mut self, record: ErrorRecord) -> Option<ErrorCategory> {
        match classify_sentence(&record.label, &record.error_predict) {
            Some(category) => {
                self.buckets.entry(category).or_default().push(record);
                Some(category)
            }
            None => {
                self.n_correct += 1;
                None
            }
        }
    }

    pub fn records(&self, category: ErrorCategory) -> &[ErrorRecord] {
        self.buckets
            .get(&category)
            .map(|v| v.as_slice())
            .unwrap_or_default()
    }

    pub fn count(&self, category: ErrorCategory) -> usize {
        self.records(category).len()
    }

    /// Number of records whose predicted set equals the gold set.
    pub fn n_correct(&self) -> usize {
        self.n_correct
    }

    /// Number of records in all the buckets.
    pub fn n_errors(&self) -> usize {
        self.buckets.values().map(|v| v.len()).sum()
    }

    /// Per category counts, in the order of `ErrorCategory`. Empty categories are included.
    pub fn stats(&self) -> Vec<(ErrorCategory, usize)> {
        all::<ErrorCategory>().map(|c| (c, self.count(c))).collect()
    }

    /// The non-empty buckets, in the order of `ErrorCategory`.
    pub fn iter(&self) -> impl Iterator<Item = (ErrorCategory, &[ErrorRecord])> {
        self.buckets
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(c, v)| (*c, v.as_slice()))
    }
}
