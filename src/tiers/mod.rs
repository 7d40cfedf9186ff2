//! Annotation tiers.
//!
//! A tier is a named, ordered sequence of labeled time intervals that
//! covers its whole time span with no gaps and no overlaps: adjacent
//! intervals share exactly one boundary time.

pub mod synthesize;

pub use synthesize::{SynthesisOutcome, TierSynthesizer};

use serde::Serialize;

use crate::error::{CastError, Result};

/// One labeled time interval. Times are in seconds on the global
/// timeline; an empty label marks silence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interval {
    pub label: String,
    pub begin: f64,
    pub end: f64,
}

impl Interval {
    pub fn new(label: impl Into<String>, begin: f64, end: f64) -> Self {
        Self {
            label: label.into(),
            begin,
            end,
        }
    }
}

/// A named annotation track covering `[start, end]` of the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tier {
    pub name: String,
    pub intervals: Vec<Interval>,
}

impl Tier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            intervals: Vec::new(),
        }
    }
}

/// Check the gap-free/no-overlap invariant for an interval run that
/// should cover exactly `[start, end]`.
///
/// Boundaries are compared exactly: shared boundaries are constructed
/// from the same value, so any difference is a segmentation bug, not
/// floating point noise. `scope` names the trial or tier for the error.
pub fn validate_intervals(
    scope: &str,
    intervals: &[Interval],
    start: f64,
    end: f64,
) -> Result<()> {
    let violation = |message: String| CastError::SegmentationInvariant {
        trial: scope.to_string(),
        message,
    };

    let Some(first) = intervals.first() else {
        return Err(violation("no intervals were generated".to_string()));
    };
    if first.begin != start {
        return Err(violation(format!(
            "first interval begins at {} instead of the declared start {start}",
            first.begin
        )));
    }
    for interval in intervals {
        if interval.begin > interval.end {
            return Err(violation(format!(
                "interval '{}' has begin {} after end {}",
                interval.label, interval.begin, interval.end
            )));
        }
    }
    for pair in intervals.windows(2) {
        if pair[0].end != pair[1].begin {
            return Err(violation(format!(
                "intervals '{}' and '{}' do not share a boundary ({} vs {})",
                pair[0].label, pair[1].label, pair[0].end, pair[1].begin
            )));
        }
    }
    if let Some(last) = intervals.last() {
        if last.end != end {
            return Err(violation(format!(
                "last interval ends at {} instead of the declared end {end}",
                last.end
            )));
        }
    }
    Ok(())
}
