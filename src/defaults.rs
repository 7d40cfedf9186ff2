//! Default constants for cast.
//!
//! Most of these are calibration values carried over from the original
//! laboratory setup. They are collected here so that every stage of the
//! pipeline agrees on them.

/// Mains hum frequency in Hz. Everything at and below this is removed by
/// the high-pass filter before onset detection.
pub const MAINS_HUM_HZ: f64 = 60.0;

/// Lower edge of the synchronization tone band in Hz.
pub const TONE_BAND_LOW_HZ: f64 = 950.0;

/// Upper edge of the synchronization tone band in Hz.
///
/// Together with the lower edge this isolates the 1 kHz go-signal tone.
pub const TONE_BAND_HIGH_HZ: f64 = 1050.0;

/// Order of the mains-hum high-pass filter.
pub const HIGH_PASS_ORDER: usize = 10;

/// Duration of the synchronization tone in seconds.
///
/// Downstream segmentation assumes a 50 ms tone and starts looking for
/// speech material after `onset_time + TONE_DURATION_SECS`.
pub const TONE_DURATION_SECS: f64 = 0.05;

/// Calibration offset in seconds added to the start of the speech region
/// before computing the segmentation window.
///
/// Reproduced from the original setup as-is, not derived.
pub const ALIGNMENT_OFFSET_SECS: f64 = 0.058;

/// Default fraction of the speech region at which the word-guess span begins.
pub const WORD_GUESS_BEGIN: f64 = 1.0 / 12.0;

/// Default fraction of the speech region at which the word-guess span ends.
///
/// The defaults place the first-guess word in the middle portion of the
/// speech region, leaving silence buffers before and after for manual
/// correction.
pub const WORD_GUESS_END: f64 = 2.0 / 3.0;

/// Length of the intensity-envelope analysis window in seconds.
pub const ENVELOPE_WINDOW_SECS: f64 = 0.001;

/// Kaiser window beta for the intensity envelope. Copied from Praat.
pub const KAISER_BETA: f64 = 20.0;

/// Floor value of the log-intensity envelope.
///
/// The first [`ARTIFACT_SUPPRESSION_SECS`] of the high-pass envelope are
/// forced to this value to suppress a recording-start instrumentation
/// artifact.
pub const ENVELOPE_FLOOR: f64 = -80.0;

/// Length of the recording-start artifact region in seconds.
pub const ARTIFACT_SUPPRESSION_SECS: f64 = 1.0;

/// Half-width in seconds of the refinement window around the coarse
/// tone-onset estimate.
pub const REFINE_WINDOW_SECS: f64 = 0.025;

/// Gap in seconds between the detected onset and the start of the region
/// used for the speech-presence check.
pub const SPEECH_CHECK_OFFSET_SECS: f64 = 0.075;

/// Number of trials processed when the `test` flag is set.
pub const TEST_RUN_LIMIT: usize = 10;

/// Default name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "cast_config.toml";
