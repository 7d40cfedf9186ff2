//! JSON rendering of the annotation tiers.
//!
//! Mirrors the TextGrid content in a form that pandas and friends read
//! without a Praat parser.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::tiers::Tier;

#[derive(Debug, Serialize)]
struct Document<'a> {
    duration: f64,
    tiers: &'a [Tier],
}

/// Write the tiers as pretty-printed JSON.
pub fn write_json(path: &Path, tiers: &[Tier], duration: f64) -> Result<()> {
    let file = File::create(path)?;
    let document = Document { duration, tiers };
    serde_json::to_writer_pretty(BufWriter::new(file), &document)
        .map_err(std::io::Error::other)?;
    Ok(())
}
