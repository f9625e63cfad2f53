/*!
Parsing layer of `aste_eval`. It turns the two kinds of inputs of an evaluation run into
normalized triplets:
* gold label lines (`sentence####[([aspect indices], [opinion indices], 'POS')]`), see
  [`parse_label_line`] and [`parse_label_file`];
* raw model outputs (`aspect: ..., opinion: ..., sentiment: ... | ...`), see
  [`PredictionExtractor`].
*/

mod extractor;
mod label;
mod triplet;

pub use extractor::{ExtractorError, PredictionExtractor, SegmentFields, DEFAULT_DELIMITER};
pub use label::{
    parse_label_file, parse_label_line, parse_span_triplets, LabelError, LabelFileError,
    LabelledSentence, SpanTriplet, LABEL_SEPARATOR,
};
pub use triplet::{normalize_triplet, Sentiment, SentimentParsingError, Triplet};
