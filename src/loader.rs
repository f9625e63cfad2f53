/**
This module reads the three kinds of input files of an evaluation run: the gold label files, the
JSONL files of model predictions and the JSON dumps of error records.
*/
use crate::record::ErrorRecord;
use ahash::AHashSet;
use serde::Deserialize;
use std::error::Error;
use std::fmt::Display;
use std::fs::{read_to_string, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use triplet_parsing::{parse_label_file, LabelFileError, LabelledSentence};

#[derive(Debug)]
/// Failures that can happen when loading an input file. All of them are fatal.
pub enum LoadError {
    Io(PathBuf, io::Error),
    Label(PathBuf, LabelFileError),
    Json(PathBuf, serde_json::Error),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(path, err) => write!(f, "Could not read {}: {}", path.display(), err),
            Self::Label(path, err) => {
                write!(f, "Invalid label file {}: {}", path.display(), err)
            }
            Self::Json(path, err) => write!(f, "Invalid JSON in {}: {}", path.display(), err),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(_, err) => Some(err),
            Self::Label(_, err) => Some(err),
            Self::Json(_, err) => Some(err),
        }
    }
}

/// Reads a gold label file (`sentence####[(...), ...]` lines). Lines without the separator are
/// skipped, any other malformed line is an error.
pub fn read_label_file<P: AsRef<Path>>(path: P) -> Result<Vec<LabelledSentence>, LoadError> {
    let path = path.as_ref();
    let content = read_to_string(path).map_err(|e| LoadError::Io(path.to_path_buf(), e))?;
    let sentences =
        parse_label_file(&content).map_err(|e| LoadError::Label(path.to_path_buf(), e))?;
    log::debug!("Read {} labelled sentences from {}", sentences.len(), path.display());
    Ok(sentences)
}

#[derive(Deserialize)]
struct PredictionLine {
    predict: String,
}

/// Reads a JSONL file of predictions, one `{"predict": "..."}` object per line. Blank lines are
/// skipped. A line that cannot be decoded (invalid JSON, missing field, invalid UTF-8) keeps its
/// slot as `None`, so that the predictions stay aligned with the labels; the extractor turns it
/// into an empty prediction. Only a failure of the underlying read is an error.
pub fn read_predictions<P: AsRef<Path>>(path: P) -> Result<Vec<Option<String>>, LoadError> {
    let path = path.as_ref();
    let to_load_error = |e: io::Error| LoadError::Io(path.to_path_buf(), e);
    let reader = BufReader::new(File::open(path).map_err(to_load_error)?);
    let mut predictions = Vec::new();
    for (i, line) in reader.split(b'\n').enumerate() {
        let line = line.map_err(to_load_error)?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match serde_json::from_slice::<PredictionLine>(&line) {
            Ok(prediction) => predictions.push(Some(prediction.predict)),
            Err(e) => {
                log::warn!("Could not decode line {} of {}: {}", i + 1, path.display(), e);
                predictions.push(None)
            }
        }
    }
    Ok(predictions)
}

/// Keeps the first record of every sentence, in order. Sentences are compared as raw strings.
pub fn deduplicate(records: Vec<ErrorRecord>) -> Vec<ErrorRecord> {
    let mut seen = AHashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| seen.insert(r.sentence.clone()))
        .collect()
}

/// Reads a JSON array of error records and deduplicates it by sentence.
pub fn load_and_deduplicate<P: AsRef<Path>>(path: P) -> Result<Vec<ErrorRecord>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| LoadError::Io(path.to_path_buf(), e))?;
    let records: Vec<ErrorRecord> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| LoadError::Json(path.to_path_buf(), e))?;
    let n_records = records.len();
    let deduplicated = deduplicate(records);
    log::debug!(
        "Kept {} of {} records from {} after deduplication",
        deduplicated.len(),
        n_records,
        path.display()
    );
    Ok(deduplicated)
}
