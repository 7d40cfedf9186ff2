use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::defaults;
use crate::error::{CastError, Result};

/// Root configuration structure for a concatenation run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Speaker id stamped on every trial of the run
    pub speaker_id: String,
    /// Stem of the output files (.wav, .csv, .TextGrid, .json are appended)
    pub output_file: PathBuf,
    /// Optional exclusion list (plain text or TOML)
    pub exclusion_list: Option<PathBuf>,
    /// Optional pronunciation dictionary for phoneme-level first guesses
    pub pronunciation_dictionary: Option<PathBuf>,
    pub flags: Flags,
    pub tiers: TierSelection,
    pub tier_names: TierNames,
    pub word_guess: WordGuess,
    pub detector: DetectorConfig,
}

/// Run behavior flags
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Flags {
    /// Detect the synchronization tone in each trial
    pub detect_beep: bool,
    /// Process only the first few trials for a dry run
    pub test: bool,
    /// Exclude trials that have no auxiliary sensor file
    pub require_sensor: bool,
}

/// Which annotation tiers to emit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TierSelection {
    pub file: bool,
    pub utterance: bool,
    pub word: bool,
    pub phoneme: bool,
    pub phone: bool,
}

/// Display names of the emitted tiers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TierNames {
    pub file: String,
    pub utterance: String,
    pub word: String,
    pub phoneme: String,
    pub phone: String,
}

/// Fractional coefficients of the first-guess word span within the
/// speech region
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WordGuess {
    pub begin: f64,
    pub end: f64,
}

/// Onset detector frequency constants
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    /// Mains hum cutoff in Hz for the high-pass filter
    pub mains_hum_hz: f64,
    /// Lower edge of the tone band in Hz
    pub tone_band_low_hz: f64,
    /// Upper edge of the tone band in Hz
    pub tone_band_high_hz: f64,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            detect_beep: true,
            test: false,
            require_sensor: false,
        }
    }
}

impl Default for TierSelection {
    fn default() -> Self {
        Self {
            file: true,
            utterance: true,
            word: true,
            phoneme: true,
            phone: false,
        }
    }
}

impl Default for TierNames {
    fn default() -> Self {
        Self {
            file: "File".to_string(),
            utterance: "Utterance".to_string(),
            word: "Word".to_string(),
            phoneme: "Phoneme".to_string(),
            phone: "Phone".to_string(),
        }
    }
}

impl Default for WordGuess {
    fn default() -> Self {
        Self {
            begin: defaults::WORD_GUESS_BEGIN,
            end: defaults::WORD_GUESS_END,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            mains_hum_hz: defaults::MAINS_HUM_HZ,
            tone_band_low_hz: defaults::TONE_BAND_LOW_HZ,
            tone_band_high_hz: defaults::TONE_BAND_HIGH_HZ,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields use default values.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CastError::ConfigFileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or return validated defaults if
    /// the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.is_file() {
            Self::load(path)
        } else {
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Serialize the configuration as TOML, e.g. for `cast init`.
    pub fn to_toml(&self) -> String {
        // Config is a plain data struct, serialization cannot fail.
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Check value-level constraints that the TOML parse cannot express.
    pub fn validate(&self) -> Result<()> {
        let guess = &self.word_guess;
        if !(0.0..=1.0).contains(&guess.begin) || !(0.0..=1.0).contains(&guess.end) {
            return Err(CastError::ConfigInvalidValue {
                key: "word_guess".to_string(),
                message: format!(
                    "coefficients must lie in [0, 1], got begin={} end={}",
                    guess.begin, guess.end
                ),
            });
        }
        if guess.begin >= guess.end {
            return Err(CastError::ConfigInvalidValue {
                key: "word_guess".to_string(),
                message: format!(
                    "begin coefficient {} must be smaller than end coefficient {}",
                    guess.begin, guess.end
                ),
            });
        }
        let detector = &self.detector;
        if detector.mains_hum_hz <= 0.0 {
            return Err(CastError::ConfigInvalidValue {
                key: "detector.mains_hum_hz".to_string(),
                message: format!("cutoff must be positive, got {}", detector.mains_hum_hz),
            });
        }
        if detector.tone_band_low_hz <= 0.0 || detector.tone_band_low_hz >= detector.tone_band_high_hz
        {
            return Err(CastError::ConfigInvalidValue {
                key: "detector.tone_band".to_string(),
                message: format!(
                    "band edges must be positive and ordered, got {}..{}",
                    detector.tone_band_low_hz, detector.tone_band_high_hz
                ),
            });
        }
        Ok(())
    }
}
