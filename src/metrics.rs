/**
This module computes the metrics (precision, recall, f-score) of predicted triplets against the
gold triplets. The matching is a multiset matching: a gold triplet can satisfy at most one
predicted occurrence, even if the model predicted it many times.
*/
use crate::record::ErrorRecord;
use ahash::AHashMap;
use core::fmt;
use itertools::multizip;
use serde::{Deserialize, Serialize};
use std::{
    error::Error,
    fmt::{Debug, Display},
    ops::Add,
    str::FromStr,
};
use triplet_parsing::{ExtractorError, LabelledSentence, Triplet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// How do we handle cases with a division by zero? A run without any prediction has an
/// undefined precision, a run without any gold triplet has an undefined recall. The default is
/// to replace the result of the division by 0. `ReturnError` stops the computation, which can be
/// useful if you believe there should be no 0 in the denominator.
pub enum DivByZeroStrat {
    /// Returns 0 when the denominator is 0
    #[default]
    ReplaceBy0,
    /// Returns an error
    ReturnError,
}

#[derive(Debug)]
pub struct ParsingDivisionByZeroStrategyError<S: Debug + Display>(S);

impl<S: Debug + Display> Display for ParsingDivisionByZeroStrategyError<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Could not parse the {} into a `DivByZeroStrat`",
            self.0
        )
    }
}
impl<S: Debug + Display> Error for ParsingDivisionByZeroStrategyError<S> {}

impl FromStr for DivByZeroStrat {
    type Err = ParsingDivisionByZeroStrategyError<String>;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "replaceby0" | "replacebyzero" | "zero" => Ok(DivByZeroStrat::ReplaceBy0),
            "returnerror" | "error" => Ok(DivByZeroStrat::ReturnError),
            _ => Err(ParsingDivisionByZeroStrategyError(String::from(s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DivisionByZeroError(&'static str);

impl Display for DivisionByZeroError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Encountered division by zero when computing the {}", self.0)
    }
}

impl Error for DivisionByZeroError {}

fn divide(
    numerator: f64,
    denominator: f64,
    zero_division: DivByZeroStrat,
    metric: &'static str,
) -> Result<f64, DivisionByZeroError> {
    if denominator > 0. {
        Ok(numerator / denominator)
    } else {
        match zero_division {
            DivByZeroStrat::ReplaceBy0 => Ok(0.),
            DivByZeroStrat::ReturnError => Err(DivisionByZeroError(metric)),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Error type to represent when the labels and the predictions are not of the same length (when
/// they should be).
pub struct InconsistentLengthError(pub(crate) usize, pub(crate) usize);

impl Display for InconsistentLengthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Inconsistent length between two lists. `label_all` is length {}, `predict_all` is length {}",
            self.0, self.1
        )
    }
}
impl Error for InconsistentLengthError {}

pub(crate) fn check_consistent_length<T, U>(
    label_all: &[T],
    predict_all: &[U],
) -> Result<(), InconsistentLengthError> {
    match label_all.len() == predict_all.len() {
        true => Ok(()),
        false => Err(InconsistentLengthError(label_all.len(), predict_all.len())),
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Enum error encompassing the failures that could happen when computing the precison, recall
/// and f-score.
pub enum ComputationError {
    InconsistentLength(InconsistentLengthError),
    DivisionByZero(DivisionByZeroError),
    Extractor(ExtractorError),
}

impl Display for ComputationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InconsistentLength(length_err) => std::fmt::Display::fmt(length_err, f),
            Self::DivisionByZero(div_err) => std::fmt::Display::fmt(div_err, f),
            Self::Extractor(extractor_err) => std::fmt::Display::fmt(extractor_err, f),
        }
    }
}

impl Error for ComputationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InconsistentLength(e) => Some(e),
            Self::DivisionByZero(e) => Some(e),
            Self::Extractor(e) => Some(e),
        }
    }
}

impl From<InconsistentLengthError> for ComputationError {
    fn from(value: InconsistentLengthError) -> Self {
        Self::InconsistentLength(value)
    }
}

impl From<ExtractorError> for ComputationError {
    fn from(value: ExtractorError) -> Self {
        Self::Extractor(value)
    }
}

impl From<DivisionByZeroError> for ComputationError {
    fn from(value: DivisionByZeroError) -> Self {
        Self::DivisionByZero(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Counts accumulated over the sentences of a run: the number of predicted triplets, the number
/// of gold triplets and the number of predicted triplets matched to a gold one.
pub struct MatchCounts {
    pub n_preds: usize,
    pub n_labels: usize,
    pub n_common: usize,
}

impl Add for MatchCounts {
    type Output = MatchCounts;
    fn add(self, rhs: Self) -> Self::Output {
        MatchCounts {
            n_preds: self.n_preds + rhs.n_preds,
            n_labels: self.n_labels + rhs.n_labels,
            n_common: self.n_common + rhs.n_common,
        }
    }
}

impl MatchCounts {
    pub fn new(n_preds: usize, n_labels: usize, n_common: usize) -> Self {
        MatchCounts {
            n_preds,
            n_labels,
            n_common,
        }
    }

    /// Derives the precision, recall and f-score from the counts. The computation is done in
    /// `f64`, the f-score from the unrounded precision and recall; only the results are narrowed
    /// to `f32`.
    pub fn scores(&self, zero_division: DivByZeroStrat) -> Result<Scores, DivisionByZeroError> {
        let n_common = self.n_common as f64;
        let precision = divide(n_common, self.n_preds as f64, zero_division, "precision")?;
        let recall = divide(n_common, self.n_labels as f64, zero_division, "recall")?;
        let f1 = divide(
            2. * precision * recall,
            precision + recall,
            zero_division,
            "f-score",
        )?;
        Ok(Scores {
            precision: precision as f32,
            recall: recall as f32,
            f1: f1 as f32,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Scores {
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
}

/// Outcome of the matching of a single sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceMatch<'a> {
    pub counts: MatchCounts,
    /// The predictions that found no gold triplet left to match, in prediction order.
    pub unmatched: Vec<&'a Triplet>,
}

/// Greedily matches the predictions of a sentence against its gold triplets. Each prediction,
/// in order, consumes one remaining occurrence of an equal gold triplet.
pub fn match_sentence<'a>(label: &[Triplet], pred: &'a [Triplet]) -> SentenceMatch<'a> {
    let mut label_dup: AHashMap<&Triplet, usize> = AHashMap::with_capacity(label.len());
    for triplet in label {
        *label_dup.entry(triplet).or_default() += 1;
    }
    let mut n_common = 0;
    let mut unmatched = Vec::new();
    for p in pred {
        match label_dup.get_mut(p) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                n_common += 1;
            }
            _ => unmatched.push(p),
        }
    }
    SentenceMatch {
        counts: MatchCounts::new(pred.len(), label.len(), n_common),
        unmatched,
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Result of the metrics pass over a whole run.
pub struct TripletEvaluation {
    pub counts: MatchCounts,
    pub scores: Scores,
    /// One record per unmatched prediction. A sentence with `k` unmatched predictions appears `k`
    /// times, always with its full gold and predicted lists.
    pub error_predictions: Vec<ErrorRecord>,
}

/// Main entrypoint of the metrics pass. `labelled` and `predict_all` are parallel: the i-th list
/// of predictions belongs to the i-th labelled sentence. A length mismatch is reported before any
/// computation.
///
/// * `labelled`: Sentences and their gold triplets
/// * `predict_all`: Predicted triplets of each sentence
/// * `zero_division`: What to do when a denominator is 0
pub fn evaluate_triplets(
    labelled: &[LabelledSentence],
    predict_all: &[Vec<Triplet>],
    zero_division: DivByZeroStrat,
) -> Result<TripletEvaluation, ComputationError> {
    check_consistent_length(labelled, predict_all)?;
    let (counts, error_predictions) = multizip((labelled.iter(), predict_all.iter())).fold(
        (MatchCounts::default(), Vec::new()),
        |(counts, mut errors), (sentence, pred)| {
            let matched = match_sentence(&sentence.label, pred);
            errors.extend(matched.unmatched.iter().map(|_| {
                ErrorRecord::new(sentence.sentence.as_str(), sentence.label.clone(), pred.clone())
            }));
            (counts + matched.counts, errors)
        },
    );
    let scores = counts.scores(zero_division)?;
    log::info!(
        "Matched {} of {} predicted triplets against {} gold triplets",
        counts.n_common,
        counts.n_preds,
        counts.n_labels
    );
    Ok(TripletEvaluation {
        counts,
        scores,
        error_predictions,
    })
}
