//! Butterworth filter design.
//!
//! Both filters are built as cascades of second-order sections. The
//! band-pass in particular must not be expressed as direct transfer
//! function coefficients: at audio sample rates with a 100 Hz wide band
//! that form is numerically unstable.

use crate::defaults;
use crate::error::{CastError, Result};

/// One normalized biquad section (`a0 == 1`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Section {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

/// Immutable filter coefficients for one named filter, derived once per
/// run from the common sample rate and reused for every trial.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    name: &'static str,
    sections: Vec<Section>,
}

impl FilterSpec {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Single forward pass through the cascade (transposed direct form II).
    pub fn filter(&self, signal: &[f64]) -> Vec<f64> {
        let mut output = signal.to_vec();
        for section in &self.sections {
            let mut s1 = 0.0;
            let mut s2 = 0.0;
            for sample in output.iter_mut() {
                let x = *sample;
                let y = section.b0 * x + s1;
                s1 = section.b1 * x - section.a1 * y + s2;
                s2 = section.b2 * x - section.a2 * y;
                *sample = y;
            }
        }
        output
    }

    /// Zero-phase (forward-backward) application of the cascade.
    ///
    /// The onset detector depends on this: a causal pass would delay the
    /// detected tone edge by the filter's group delay.
    pub fn filtfilt(&self, signal: &[f64]) -> Vec<f64> {
        let mut forward = self.filter(signal);
        forward.reverse();
        let mut backward = self.filter(&forward);
        backward.reverse();
        backward
    }
}

fn check_cutoff(name: &str, cutoff_hz: f64, sample_rate: f64) -> Result<()> {
    if cutoff_hz <= 0.0 {
        return Err(CastError::InvalidFilterParameters {
            message: format!("{name} cutoff must be positive, got {cutoff_hz} Hz"),
        });
    }
    if cutoff_hz >= sample_rate / 2.0 {
        return Err(CastError::InvalidFilterParameters {
            message: format!(
                "{name} cutoff {cutoff_hz} Hz is at or above the Nyquist limit {} Hz",
                sample_rate / 2.0
            ),
        });
    }
    Ok(())
}

/// Design the mains-hum high-pass: a steep Butterworth cascade that
/// rejects everything at and below `cutoff_hz` while leaving the tone
/// band untouched.
pub fn high_pass(sample_rate: f64, cutoff_hz: f64) -> Result<FilterSpec> {
    check_cutoff("high-pass", cutoff_hz, sample_rate)?;

    let order = defaults::HIGH_PASS_ORDER;
    // Prewarped cutoff for the bilinear transform.
    let k = (std::f64::consts::PI * cutoff_hz / sample_rate).tan();
    let k2 = k * k;

    // Butterworth pole pairs of the analog prototype: pair i has
    // denominator s^2 + c*s + 1 with c = 2*sin(theta).
    let sections = (0..order / 2)
        .map(|i| {
            let theta = (2 * i + 1) as f64 * std::f64::consts::PI / (2.0 * order as f64);
            let c = 2.0 * theta.sin();
            let a0 = 1.0 + c * k + k2;
            Section {
                b0: 1.0 / a0,
                b1: -2.0 / a0,
                b2: 1.0 / a0,
                a1: 2.0 * (k2 - 1.0) / a0,
                a2: (1.0 - c * k + k2) / a0,
            }
        })
        .collect();

    Ok(FilterSpec {
        name: "mains-hum high-pass",
        sections,
    })
}

/// Design the tone band-pass: a first-order Butterworth band-pass
/// (one second-order section) isolating the synchronization tone.
pub fn band_pass(sample_rate: f64, low_hz: f64, high_hz: f64) -> Result<FilterSpec> {
    check_cutoff("band-pass low", low_hz, sample_rate)?;
    check_cutoff("band-pass high", high_hz, sample_rate)?;
    if low_hz >= high_hz {
        return Err(CastError::InvalidFilterParameters {
            message: format!("band edges must be ordered, got {low_hz}..{high_hz} Hz"),
        });
    }

    // Prewarped band edges; the analog prototype is
    // H(s) = B*s / (s^2 + B*s + w0^2).
    let w1 = (std::f64::consts::PI * low_hz / sample_rate).tan();
    let w2 = (std::f64::consts::PI * high_hz / sample_rate).tan();
    let bandwidth = w2 - w1;
    let w0_sq = w1 * w2;

    let a0 = 1.0 + bandwidth + w0_sq;
    let section = Section {
        b0: bandwidth / a0,
        b1: 0.0,
        b2: -bandwidth / a0,
        a1: (2.0 * w0_sq - 2.0) / a0,
        a2: (1.0 - bandwidth + w0_sq) / a0,
    };

    Ok(FilterSpec {
        name: "tone band-pass",
        sections: vec![section],
    })
}
