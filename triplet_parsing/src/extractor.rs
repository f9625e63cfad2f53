/**
This module extracts triplets out of the raw text generated by a model. The expected output looks
like:

```text
aspect: battery life, opinion: long, sentiment: positive | aspect: screen, opinion: dim, sentiment: negative
```

The grammar is tolerant: each field is searched independently of the others, case-insensitively,
so the fields can come in any order and be surrounded by noise.
*/
use crate::triplet::Triplet;
use regex::Regex;
use std::error::Error;
use std::fmt::Display;

/// Default separator between two triplets in a model output.
pub const DEFAULT_DELIMITER: char = '|';

const ASPECT_PATTERN: &str = r"(?i)aspect:\s*(.*?),";
const OPINION_PATTERN: &str = r"(?i)opinion:\s*(.*?),";
const SENTIMENT_PATTERN: &str = r"(?i)sentiment:\s*(\w+)";

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorError(regex::Error);

impl Display for ExtractorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Could not build the field patterns of the extractor: {}", self.0)
    }
}

impl Error for ExtractorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl From<regex::Error> for ExtractorError {
    fn from(value: regex::Error) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// The fields found in a single segment. Every field is looked up independently.
pub struct SegmentFields<'a> {
    pub aspect: Option<&'a str>,
    pub opinion: Option<&'a str>,
    pub sentiment: Option<&'a str>,
}

impl<'a> SegmentFields<'a> {
    /// Returns the normalized triplet if all three fields were found.
    pub fn into_triplet(self) -> Option<Triplet> {
        match (self.aspect, self.opinion, self.sentiment) {
            (Some(aspect), Some(opinion), Some(sentiment)) => {
                Some(Triplet::new(aspect, opinion, sentiment))
            }
            _ => None,
        }
    }
}

/// Extracts triplets from raw model outputs. The field patterns are compiled once, when the
/// extractor is built.
#[derive(Debug, Clone)]
pub struct PredictionExtractor {
    delimiter: char,
    aspect: Regex,
    opinion: Regex,
    sentiment: Regex,
}

impl PredictionExtractor {
    pub fn new(delimiter: char) -> Result<Self, ExtractorError> {
        Ok(PredictionExtractor {
            delimiter,
            aspect: Regex::new(ASPECT_PATTERN)?,
            opinion: Regex::new(OPINION_PATTERN)?,
            sentiment: Regex::new(SENTIMENT_PATTERN)?,
        })
    }

    /// Looks for the three fields in a single, already split, segment.
    pub fn fields<'a>(&self, segment: &'a str) -> SegmentFields<'a> {
        let capture = |re: &Regex| {
            re.captures(segment)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
        };
        SegmentFields {
            aspect: capture(&self.aspect),
            opinion: capture(&self.opinion),
            sentiment: capture(&self.sentiment),
        }
    }

    /// Extracts the triplets of a raw output string, in the order in which they appear.
    /// Segments missing a field are skipped with a warning. `index` is only used to locate the
    /// record in the diagnostics.
    pub fn extract(&self, index: usize, raw: &str) -> Vec<Triplet> {
        let mut triplets = Vec::new();
        for segment in raw.split(self.delimiter).map(str::trim) {
            match self.fields(segment).into_triplet() {
                Some(triplet) => triplets.push(triplet),
                None => log::warn!(
                    "Missing field or malformed segment at index {}: {:?}",
                    index,
                    segment
                ),
            }
        }
        triplets
    }

    /// Extracts the triplets of every record. A record whose raw output could not be read
    /// (`None`) yields no triplet, and the batch carries on.
    pub fn extract_all<S: AsRef<str>>(&self, raw_outputs: &[Option<S>]) -> Vec<Vec<Triplet>> {
        raw_outputs
            .iter()
            .enumerate()
            .map(|(i, raw)| match raw {
                Some(raw) => self.extract(i, raw.as_ref()),
                None => {
                    log::warn!("Could not parse the prediction at index {}", i);
                    Vec::new()
                }
            })
            .collect()
    }
}
