//! Timeline cursor and concatenation engine.
//!
//! Trials are processed strictly sequentially: each trial's position on
//! the global timeline depends on the durations of all prior accepted
//! trials. The cursor and the output buffer are owned here exclusively.

use std::path::Path;

use crate::config::DetectorConfig;
use crate::defaults;
use crate::error::{CastError, Result};
use crate::meta::LoadReport;
use crate::signal::filters::FilterSpec;
use crate::signal::onset::detect_beep_and_speech;
use crate::signal::{band_pass, high_pass};
use crate::trial::{AudioSegment, TrialRecord};

/// The concatenated audio stream and the run's bookkeeping.
#[derive(Debug, Clone)]
pub struct ConcatenationResult {
    /// Interleaved PCM of all accepted trials, in processing order.
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
    /// Final cursor value; equals the sum of accepted trial durations
    /// (to millisecond rounding).
    pub total_duration: f64,
    /// Trials excluded during concatenation because their tone could
    /// not be detected, for the caller to report.
    pub detection_failures: Vec<LoadReport>,
    /// Trials that stay in the output but whose energy profile after
    /// the tone does not look like speech, for the caller to report.
    pub speech_warnings: Vec<LoadReport>,
}

/// Round a cursor value to millisecond precision.
///
/// The rounded value is carried forward so that consecutive trials
/// share their boundary exactly.
fn round_ms(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

fn format_label(sample_rate: u32, channels: u16) -> String {
    format!("{sample_rate} Hz, {channels} channel(s)")
}

fn read_wav(path: &Path) -> Result<(Vec<i16>, u32, u16)> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let samples = reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((samples, spec.sample_rate, spec.channels))
}

/// Merge all accepted trials' audio into one stream, stamping each
/// trial's global timestamps in place.
///
/// With `detector` set, the synchronization tone is located in every
/// trial; a trial whose tone cannot be found is converted to excluded
/// (it contributes no samples and no timeline advance) and reported in
/// the result. A format mismatch between trials aborts the whole run.
pub fn concatenate_trials(
    records: &mut [TrialRecord],
    detector: Option<&DetectorConfig>,
) -> Result<ConcatenationResult> {
    let mut cursor = 0.0f64;
    let mut output: Vec<i16> = Vec::new();
    let mut reference: Option<(u32, u16)> = None;
    let mut filters: Option<(FilterSpec, FilterSpec)> = None;
    let mut detection_failures = Vec::new();
    let mut speech_warnings = Vec::new();

    for record in records.iter_mut() {
        if record.excluded {
            continue;
        }

        let (samples, sample_rate, channels) = read_wav(&record.wav_path)?;

        // The first accepted trial establishes the reference format;
        // everything after it must match exactly.
        match reference {
            None => {
                reference = Some((sample_rate, channels));
                if let Some(config) = detector {
                    filters = Some((
                        high_pass(sample_rate as f64, config.mains_hum_hz)?,
                        band_pass(
                            sample_rate as f64,
                            config.tone_band_low_hz,
                            config.tone_band_high_hz,
                        )?,
                    ));
                }
            }
            Some((ref_rate, ref_channels)) => {
                if sample_rate != ref_rate || channels != ref_channels {
                    return Err(CastError::FormatMismatch {
                        trial: record.filename.clone(),
                        expected: format_label(ref_rate, ref_channels),
                        actual: format_label(sample_rate, channels),
                    });
                }
            }
        }

        let segment = AudioSegment {
            samples: &samples,
            sample_rate,
            channels,
        };

        if let Some((ref hp, ref bp)) = filters {
            let mono = segment.first_channel_f64();
            match detect_beep_and_speech(&mono, sample_rate as f64, hp, bp, &record.filename) {
                Ok(onset) => {
                    record.onset_time = Some(cursor + onset.onset_secs);
                    record.has_speech = Some(onset.has_speech);
                    if !onset.has_speech {
                        // The trial stays in the output; the warning
                        // lets the annotator double-check it by hand.
                        speech_warnings.push(LoadReport {
                            filename: record.filename.clone(),
                            reason: "recording does not appear to contain speech".to_string(),
                        });
                    }
                    // Segmentation starts once the tone has died down.
                    record.segmentation_start =
                        Some(cursor + onset.onset_secs + defaults::TONE_DURATION_SECS);
                }
                Err(error) if error.is_recoverable() => {
                    record.exclude();
                    detection_failures.push(LoadReport {
                        filename: record.filename.clone(),
                        reason: error.to_string(),
                    });
                    continue;
                }
                Err(error) => return Err(error),
            }
        } else {
            record.segmentation_start = Some(cursor);
        }

        record.slice_begin = Some(cursor);
        cursor = round_ms(cursor + segment.duration());
        record.slice_end = Some(cursor);

        output.extend_from_slice(segment.samples);
    }

    let Some((sample_rate, channels)) = reference else {
        return Err(CastError::NoTrials {
            message: "all trials were excluded before concatenation".to_string(),
        });
    };
    if output.is_empty() {
        return Err(CastError::NoTrials {
            message: "all trials were excluded during concatenation".to_string(),
        });
    }

    Ok(ConcatenationResult {
        samples: output,
        sample_rate,
        channels,
        total_duration: cursor,
        detection_failures,
        speech_warnings,
    })
}
