//! Pronunciation dictionary.
//!
//! Comma-separated file: one word per line followed by the phoneme
//! labels of its expected (phonological) pronunciation, e.g.
//! `tile,t,aI,l`. Words missing from the dictionary simply get
//! word-level instead of phoneme-level first guesses.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{CastError, Result};

pub type PronunciationDict = HashMap<String, Vec<String>>;

/// Read the pronunciation dictionary from `path`.
pub fn read_pronunciation_dict(path: &Path) -> Result<PronunciationDict> {
    if !path.is_file() {
        return Err(CastError::ConfigFileNotFound {
            path: path.display().to_string(),
        });
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut dict = PronunciationDict::new();
    for row in reader.records() {
        let row = row?;
        let mut fields = row.iter().map(str::trim).filter(|f| !f.is_empty());
        if let Some(word) = fields.next() {
            dict.insert(word.to_string(), fields.map(str::to_string).collect());
        }
    }
    Ok(dict)
}
