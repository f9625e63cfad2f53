/**
This module parses the gold label files. Each line of such a file looks like:

```text
The battery life is great####[([1, 2], [4], 'POS')]
```

The left part is the sentence, the right part is a literal list of `(aspect_indices,
opinion_indices, sentiment_code)` tuples. The indices point into the whitespace-tokenized
sentence.
*/
use crate::triplet::{Sentiment, SentimentParsingError, Triplet};
use itertools::Itertools;
use std::error::Error;
use std::fmt::Display;
use std::iter::Peekable;
use std::str::CharIndices;

/// Separator between the sentence and its triplets.
pub const LABEL_SEPARATOR: &str = "####";

#[derive(Debug, Clone, PartialEq, Eq)]
/// A sentence along with its gold triplets, in the order of the label file.
pub struct LabelledSentence {
    pub sentence: String,
    pub label: Vec<Triplet>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A gold triplet before its token indices are resolved against the sentence.
pub struct SpanTriplet {
    pub aspect: Vec<usize>,
    pub opinion: Vec<usize>,
    pub sentiment: Sentiment,
}

impl SpanTriplet {
    /// Resolves the spans against the tokens of the sentence. The terms are lower-cased by the
    /// `Triplet` constructor.
    pub fn resolve(&self, tokens: &[&str]) -> Result<Triplet, LabelError> {
        let aspect = join_span(&self.aspect, tokens)?;
        let opinion = join_span(&self.opinion, tokens)?;
        Ok(Triplet::new(aspect, opinion, self.sentiment.as_str()))
    }
}

fn join_span(span: &[usize], tokens: &[&str]) -> Result<String, LabelError> {
    span.iter()
        .map(|&i| {
            tokens.get(i).copied().ok_or(LabelError::TokenOutOfRange {
                index: i,
                n_tokens: tokens.len(),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|v| v.into_iter().join(" "))
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Failures that can happen when parsing a gold label line.
pub enum LabelError {
    /// The triplet literal is not valid. Contains the byte offset and a description.
    Syntax(usize, String),
    /// The literal is valid but is not a list of `(list, list, str)` tuples.
    Shape(String),
    UnknownSentiment(SentimentParsingError),
    TokenOutOfRange { index: usize, n_tokens: usize },
}

impl Display for LabelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax(offset, msg) => {
                write!(f, "Invalid triplet literal at offset {}: {}", offset, msg)
            }
            Self::Shape(found) => write!(
                f,
                "Expected a list of (aspect_indices, opinion_indices, sentiment) tuples, found {}",
                found
            ),
            Self::UnknownSentiment(err) => Display::fmt(err, f),
            Self::TokenOutOfRange { index, n_tokens } => write!(
                f,
                "Token index {} is out of range for a sentence of {} tokens",
                index, n_tokens
            ),
        }
    }
}

impl Error for LabelError {}

impl From<SentimentParsingError> for LabelError {
    fn from(value: SentimentParsingError) -> Self {
        Self::UnknownSentiment(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A `LabelError` located in a label file. `line` is 1-based.
pub struct LabelFileError {
    pub line: usize,
    pub error: LabelError,
}

impl Display for LabelFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Line {}: {}", self.line, self.error)
    }
}

impl Error for LabelFileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

/// Parses a single line of a label file. Returns `Ok(None)` if the line does not contain the
/// `####` separator; such lines are ignored.
pub fn parse_label_line(line: &str) -> Result<Option<LabelledSentence>, LabelError> {
    let line = line.trim();
    let (sentence, raw_triplets) = match line.split_once(LABEL_SEPARATOR) {
        Some(parts) => parts,
        None => return Ok(None),
    };
    let tokens: Vec<&str> = sentence.split_whitespace().collect();
    let label = parse_span_triplets(raw_triplets.trim())?
        .iter()
        .map(|span| span.resolve(&tokens))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(LabelledSentence {
        sentence: String::from(sentence),
        label,
    }))
}

/// Parses the content of a whole label file, skipping the lines without separator.
pub fn parse_label_file(content: &str) -> Result<Vec<LabelledSentence>, LabelFileError> {
    let mut sentences = Vec::new();
    for (i, line) in content.lines().enumerate() {
        match parse_label_line(line) {
            Ok(Some(labelled)) => sentences.push(labelled),
            Ok(None) => continue,
            Err(error) => return Err(LabelFileError { line: i + 1, error }),
        }
    }
    Ok(sentences)
}

/// Parses the literal list of `(aspect_indices, opinion_indices, sentiment_code)` tuples.
pub fn parse_span_triplets(raw: &str) -> Result<Vec<SpanTriplet>, LabelError> {
    let literal = LiteralParser::new(raw).parse_all()?;
    let items = match literal {
        Literal::Seq(items) => items,
        other => return Err(LabelError::Shape(other.kind().to_string())),
    };
    items.into_iter().map(span_triplet_from_literal).collect()
}

fn span_triplet_from_literal(literal: Literal) -> Result<SpanTriplet, LabelError> {
    match literal {
        Literal::Seq(fields) => match <[Literal; 3]>::try_from(fields) {
            Ok([aspect, opinion, Literal::Str(code)]) => Ok(SpanTriplet {
                aspect: indices_from_literal(aspect)?,
                opinion: indices_from_literal(opinion)?,
                sentiment: Sentiment::from_code(&code)?,
            }),
            Ok(_) => Err(LabelError::Shape(String::from(
                "a tuple whose third element is not a string",
            ))),
            Err(fields) => Err(LabelError::Shape(format!(
                "a tuple of {} elements",
                fields.len()
            ))),
        },
        other => Err(LabelError::Shape(other.kind().to_string())),
    }
}

fn indices_from_literal(literal: Literal) -> Result<Vec<usize>, LabelError> {
    match literal {
        Literal::Seq(items) => items
            .into_iter()
            .map(|item| match item {
                Literal::Int(i) => Ok(i),
                other => Err(LabelError::Shape(format!("{} in an index list", other.kind()))),
            })
            .collect(),
        other => Err(LabelError::Shape(format!("{} instead of an index list", other.kind()))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The subset of literals found in label files. Lists and tuples are not distinguished.
enum Literal {
    Int(usize),
    Str(String),
    Seq(Vec<Literal>),
}

impl Literal {
    fn kind(&self) -> &'static str {
        match self {
            Literal::Int(_) => "an integer",
            Literal::Str(_) => "a string",
            Literal::Seq(_) => "a sequence",
        }
    }
}

struct LiteralParser<'a> {
    chars: Peekable<CharIndices<'a>>,
    len: usize,
}

impl<'a> LiteralParser<'a> {
    fn new(src: &'a str) -> Self {
        LiteralParser {
            chars: src.char_indices().peekable(),
            len: src.len(),
        }
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map(|(i, _)| *i).unwrap_or(self.len)
    }

    fn error<T>(&mut self, msg: &str) -> Result<T, LabelError> {
        Err(LabelError::Syntax(self.offset(), String::from(msg)))
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    /// Parses one literal and makes sure nothing but whitespace follows it.
    fn parse_all(mut self) -> Result<Literal, LabelError> {
        let literal = self.parse_value()?;
        self.skip_whitespace();
        match self.chars.peek() {
            None => Ok(literal),
            Some(_) => self.error("trailing characters after the literal"),
        }
    }

    fn parse_value(&mut self) -> Result<Literal, LabelError> {
        self.skip_whitespace();
        match self.chars.peek().map(|(_, c)| *c) {
            Some('[') => self.parse_seq(']'),
            Some('(') => self.parse_seq(')'),
            Some(q @ ('\'' | '"')) => self.parse_str(q),
            Some(c) if c.is_ascii_digit() => self.parse_int(),
            Some(_) => self.error("unexpected character"),
            None => self.error("unexpected end of input"),
        }
    }

    fn parse_seq(&mut self, close: char) -> Result<Literal, LabelError> {
        self.chars.next();
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.chars.next_if(|(_, c)| *c == close).is_some() {
                return Ok(Literal::Seq(items));
            }
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.chars.next() {
                Some((_, ',')) => continue,
                Some((_, c)) if c == close => return Ok(Literal::Seq(items)),
                Some((i, _)) => {
                    return Err(LabelError::Syntax(i, format!("expected ',' or '{}'", close)))
                }
                None => return self.error("unclosed sequence"),
            }
        }
    }

    fn parse_str(&mut self, quote: char) -> Result<Literal, LabelError> {
        self.chars.next();
        let mut content = String::new();
        loop {
            match self.chars.next() {
                Some((_, c)) if c == quote => return Ok(Literal::Str(content)),
                Some((_, '\\')) => match self.chars.next() {
                    Some((_, c)) => content.push(c),
                    None => return self.error("unterminated string"),
                },
                Some((_, c)) => content.push(c),
                None => return self.error("unterminated string"),
            }
        }
    }

    fn parse_int(&mut self) -> Result<Literal, LabelError> {
        let start = self.offset();
        let mut value: usize = 0;
        while let Some((_, c)) = self.chars.next_if(|(_, c)| c.is_ascii_digit()) {
            let digit = c.to_digit(10).unwrap_or_default() as usize;
            value = match value.checked_mul(10).and_then(|v| v.checked_add(digit)) {
                Some(v) => v,
                None => return Err(LabelError::Syntax(start, String::from("integer overflow"))),
            };
        }
        Ok(Literal::Int(value))
    }
}
