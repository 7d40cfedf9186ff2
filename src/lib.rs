//! cast - Concatenation and segmentation tools for phonetic recordings
//!
//! Takes a directory of per-trial recordings, concatenates them into one
//! timeline-exact audio stream, locates the synchronization tone in each
//! trial, and synthesizes first-guess annotation tiers for manual
//! correction in Praat.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod cli;
pub mod concatenate;
pub mod config;
pub mod defaults;
pub mod error;
pub mod exclusion;
pub mod extract;
pub mod meta;
pub mod output;
pub mod pronounce;
pub mod signal;
pub mod tiers;
pub mod trial;

pub use concatenate::{concatenate_trials, ConcatenationResult};
pub use config::Config;
pub use error::{CastError, Result};
pub use exclusion::ExclusionList;
pub use extract::{extract_textgrids, remove_empty_intervals_from_textgrids};
pub use meta::{load_trials, LoadReport, TrialList};
pub use pronounce::{read_pronunciation_dict, PronunciationDict};
pub use tiers::{Interval, SynthesisOutcome, Tier, TierSynthesizer};
pub use trial::TrialRecord;
