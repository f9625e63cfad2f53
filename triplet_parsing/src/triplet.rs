/**
This module holds the triplet itself and the normalization applied to every triplet before it is
compared to another one.
*/
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

/// Lower-cases and strips the surrounding whitespace of every element of the triple. The
/// sentiment is normalized like the two terms.
pub fn normalize_triplet<A, O, S>(aspect: A, opinion: O, sentiment: S) -> (String, String, String)
where
    A: AsRef<str>,
    O: AsRef<str>,
    S: AsRef<str>,
{
    (
        aspect.as_ref().trim().to_lowercase(),
        opinion.as_ref().trim().to_lowercase(),
        sentiment.as_ref().trim().to_lowercase(),
    )
}

/// An aspect-sentiment-opinion triplet. A `Triplet` can only be built through its normalizing
/// constructor, so two triplets are equal iff they are equal after normalization.
///
/// The sentiment is kept as text: a model can output a polarity outside of the three known
/// ones, and such a triplet must still be counted (it simply never matches a gold triplet). Use
/// [`Triplet::polarity`] to get the closed `Sentiment`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(
    from = "(String, String, String)",
    into = "(String, String, String)"
)]
pub struct Triplet {
    aspect: String,
    opinion: String,
    sentiment: String,
}

impl Triplet {
    pub fn new<A, O, S>(aspect: A, opinion: O, sentiment: S) -> Self
    where
        A: AsRef<str>,
        O: AsRef<str>,
        S: AsRef<str>,
    {
        let (aspect, opinion, sentiment) = normalize_triplet(aspect, opinion, sentiment);
        Triplet {
            aspect,
            opinion,
            sentiment,
        }
    }

    pub fn aspect(&self) -> &str {
        &self.aspect
    }

    pub fn opinion(&self) -> &str {
        &self.opinion
    }

    pub fn sentiment(&self) -> &str {
        &self.sentiment
    }

    /// The (aspect, opinion) pair, without the sentiment.
    pub fn terms(&self) -> (&str, &str) {
        (&self.aspect, &self.opinion)
    }

    /// Returns the known polarity of this triplet, or `None` if the sentiment is not one of
    /// `positive`, `negative` or `neutral`.
    pub fn polarity(&self) -> Option<Sentiment> {
        self.sentiment.parse().ok()
    }
}

impl From<(String, String, String)> for Triplet {
    fn from(value: (String, String, String)) -> Self {
        Triplet::new(value.0, value.1, value.2)
    }
}

impl From<(&str, &str, &str)> for Triplet {
    fn from(value: (&str, &str, &str)) -> Self {
        Triplet::new(value.0, value.1, value.2)
    }
}

impl From<Triplet> for (String, String, String) {
    fn from(value: Triplet) -> Self {
        (value.aspect, value.opinion, value.sentiment)
    }
}

/// Triplets are displayed as tuples: `(battery life, long, positive)`.
impl Display for Triplet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.aspect, self.opinion, self.sentiment)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Sequence)]
/// The three polarities a gold triplet can carry.
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    /// Resolves the sentiment codes used in the gold label files.
    pub fn from_code(code: &str) -> Result<Self, SentimentParsingError> {
        match code {
            "POS" => Ok(Sentiment::Positive),
            "NEG" => Ok(Sentiment::Negative),
            "NEU" => Ok(Sentiment::Neutral),
            _ => Err(SentimentParsingError(String::from(code))),
        }
    }
}

impl Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = SentimentParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            _ => Err(SentimentParsingError(String::from(s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentimentParsingError(pub(crate) String);

impl Display for SentimentParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Impossible to parse the string ({}) into a Sentiment", self.0)
    }
}

impl Error for SentimentParsingError {}
