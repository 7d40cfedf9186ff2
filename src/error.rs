//! Error types for cast.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CastError {
    // Configuration errors are fatal before any trial is processed
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("No trials found: {message}")]
    NoTrials { message: String },

    // Filter design errors
    #[error("Invalid filter parameters: {message}")]
    InvalidFilterParameters { message: String },

    // A format mismatch aborts the whole run, since incompatible PCM
    // streams cannot be concatenated
    #[error("Audio format mismatch in {trial}: {actual} is not the common format {expected}")]
    FormatMismatch {
        trial: String,
        expected: String,
        actual: String,
    },

    // Detection failures are recoverable by excluding the trial
    #[error("No synchronization tone detected in {trial}")]
    NoToneDetected { trial: String },

    // Tier synthesis errors are fatal for one trial's annotation
    #[error("Segmentation invariant violated for {trial}: {message}")]
    SegmentationInvariant { trial: String, message: String },

    #[error("TextGrid parse error in {path} at line {line}: {message}")]
    TextGridParse {
        path: String,
        line: usize,
        message: String,
    },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, CastError>;

impl CastError {
    /// True for errors that are handled by excluding a single trial
    /// rather than aborting the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CastError::NoToneDetected { .. })
    }
}
