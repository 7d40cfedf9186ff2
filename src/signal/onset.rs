//! Synchronization-tone onset detection.
//!
//! Locates the short "go" tone inside one trial's audio and judges
//! whether usable speech follows it. The search is two-stage: band-pass
//! energy gives a coarse position, then the raw waveform is searched
//! around it, because band-pass energy lags the true tone edge by a
//! window-dependent amount.
//!
//! This module performs no I/O and holds no state.

use crate::defaults;
use crate::error::{CastError, Result};
use crate::signal::filters::FilterSpec;

/// Result of onset detection for one trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Onset {
    /// Tone onset in seconds from the start of the trial's audio.
    pub onset_secs: f64,
    /// Whether the energy profile after the tone looks like speech.
    pub has_speech: bool,
}

/// Detect the synchronization tone in `samples` (normalized mono floats).
///
/// `trial` only labels the error when detection fails; a failed
/// detection is recoverable at the trial-processing boundary by
/// excluding the trial.
pub fn detect_beep_and_speech(
    samples: &[f64],
    sample_rate: f64,
    high_pass: &FilterSpec,
    band_pass: &FilterSpec,
    trial: &str,
) -> Result<Onset> {
    let n = samples.len();
    if n == 0 {
        return Err(CastError::NoToneDetected {
            trial: trial.to_string(),
        });
    }

    let hp_signal = high_pass.filtfilt(samples);
    let bp_signal = band_pass.filtfilt(samples);

    let window = kaiser_window(
        (defaults::ENVELOPE_WINDOW_SECS * sample_rate) as usize,
        defaults::KAISER_BETA,
    );
    let mut hp_env = log_intensity_envelope(&hp_signal, &window);
    let bp_env = log_intensity_envelope(&bp_signal, &window);

    // The recording rig leaves an artifact at the start of every file;
    // blank the first second of the envelope so it cannot win the search
    // or skew the speech-presence averages.
    let artifact_len = ((defaults::ARTIFACT_SUPPRESSION_SECS * sample_rate) as usize).min(n);
    for value in hp_env.iter_mut().take(artifact_len) {
        *value = defaults::ENVELOPE_FLOOR;
    }

    // Coarse localization: first band-pass envelope sample above 90% of
    // its range over its minimum.
    let (bp_min, bp_max) = min_max(&bp_env);
    let coarse_threshold = 0.9 * bp_max + 0.1 * bp_min;
    let coarse_index = bp_env
        .iter()
        .position(|&e| e > coarse_threshold)
        .ok_or_else(|| CastError::NoToneDetected {
            trial: trial.to_string(),
        })?;

    // Refine in a ±25 ms window around the coarse index: find the first
    // strong negative excursion of the raw waveform, then the first zero
    // crossing after it, and back up by one envelope window.
    let refine_len = (defaults::REFINE_WINDOW_SECS * sample_rate) as usize;
    let roi_begin = coarse_index.saturating_sub(refine_len);
    let roi_end = (coarse_index + refine_len).min(n);

    let pre_roi_min = samples[..roi_end].iter().cloned().fold(f64::INFINITY, f64::min);
    let excursion_threshold = 0.1 * pre_roi_min;
    let approx_index = samples[roi_begin..roi_end]
        .iter()
        .position(|&x| x < excursion_threshold)
        .map(|offset| roi_begin + offset)
        .ok_or_else(|| CastError::NoToneDetected {
            trial: trial.to_string(),
        })?;

    let crossing = samples[approx_index..roi_end]
        .windows(2)
        .position(|pair| pair[0].is_sign_negative() != pair[1].is_sign_negative())
        .ok_or_else(|| CastError::NoToneDetected {
            trial: trial.to_string(),
        })?;

    let backup = (defaults::ENVELOPE_WINDOW_SECS * sample_rate) as usize;
    let onset_index = (approx_index + crossing + 1).saturating_sub(backup);
    let onset_secs = onset_index as f64 / sample_rate;

    // Speech-presence check over the high-pass envelope, with a 75 ms
    // guard after the onset for the tone decay.
    let split_index = onset_index + (defaults::SPEECH_CHECK_OFFSET_SECS * sample_rate) as usize;
    let has_speech = if split_index < n && onset_index > 0 {
        speech_present(&hp_env[..onset_index], &hp_env[split_index..])
    } else {
        false
    };

    Ok(Onset {
        onset_secs,
        has_speech,
    })
}

/// Short-time log-RMS intensity envelope.
///
/// Each output sample is `10 * ln(rms)` of the window-weighted squared
/// signal centered on the input sample, zero-padded at the ends.
fn log_intensity_envelope(signal: &[f64], window: &[f64]) -> Vec<f64> {
    let n = signal.len();
    let len = window.len().max(1);
    let half = len / 2;

    let squared: Vec<f64> = signal.iter().map(|x| x * x).collect();
    (0..n)
        .map(|i| {
            let mut acc = 0.0;
            for (j, &w) in window.iter().enumerate() {
                let index = i + j;
                if index >= half && index - half < n {
                    acc += w * squared[index - half];
                }
            }
            let rms = (acc / len as f64).sqrt();
            10.0 * rms.max(1e-30).ln()
        })
        .collect()
}

/// Kaiser window of the given length, as used by Praat for intensity.
fn kaiser_window(length: usize, beta: f64) -> Vec<f64> {
    let len = length.max(1);
    if len == 1 {
        return vec![1.0];
    }
    let denominator = bessel_i0(beta);
    (0..len)
        .map(|i| {
            let x = 2.0 * i as f64 / (len - 1) as f64 - 1.0;
            bessel_i0(beta * (1.0 - x * x).max(0.0).sqrt()) / denominator
        })
        .collect()
}

/// Modified Bessel function of the first kind, order zero (power series).
fn bessel_i0(x: f64) -> f64 {
    let half = x / 2.0;
    let mut term = 1.0;
    let mut sum = 1.0;
    for k in 1..64 {
        term *= (half / k as f64) * (half / k as f64);
        sum += term;
        if term < sum * 1e-16 {
            break;
        }
    }
    sum
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    })
}

/// The recording counts as having speech only when the mean envelope
/// before the tone is strictly below the mean envelope after it.
fn speech_present(pre_tone: &[f64], post_tone: &[f64]) -> bool {
    mean(pre_tone) < mean(post_tone)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NEG_INFINITY;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
