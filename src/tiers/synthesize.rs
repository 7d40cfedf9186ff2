//! First-guess tier synthesis.
//!
//! Turns each trial's resolved timestamps into gap-free interval runs:
//! a provisional word span is placed in the middle portion of the
//! speech region (the word-guess coefficients control where), and a
//! pronunciation dictionary entry subdivides it into equal-duration
//! phoneme intervals. The result is a linear first guess meant for
//! manual correction, not a forced alignment.

use crate::config::{TierNames, TierSelection, WordGuess};
use crate::defaults;
use crate::error::{CastError, Result};
use crate::meta::LoadReport;
use crate::pronounce::PronunciationDict;
use crate::tiers::{validate_intervals, Interval, Tier};
use crate::trial::TrialRecord;

/// Label of the synchronization-tone interval.
pub const BEEP_LABEL: &str = "BEEP";

/// The synthesized tiers plus per-trial annotation failures.
///
/// A failed trial keeps its audio in the concatenated stream; its span
/// appears in every tier as a single unlabeled interval so the tier
/// still covers the full timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisOutcome {
    pub tiers: Vec<Tier>,
    pub failures: Vec<LoadReport>,
}

/// Synthesizes annotation tiers from stamped trial records.
pub struct TierSynthesizer<'a> {
    selection: &'a TierSelection,
    names: &'a TierNames,
    word_guess: WordGuess,
    dictionary: Option<&'a PronunciationDict>,
}

impl<'a> TierSynthesizer<'a> {
    pub fn new(
        selection: &'a TierSelection,
        names: &'a TierNames,
        word_guess: WordGuess,
        dictionary: Option<&'a PronunciationDict>,
    ) -> Self {
        Self {
            selection,
            names,
            word_guess,
            dictionary,
        }
    }

    /// Build all requested tiers over the accepted records.
    ///
    /// Records must already be stamped by the concatenator; excluded
    /// records are filtered out here. The outer validation (per whole
    /// tier) failing is a bug and aborts; per-trial violations are
    /// recoverable and reported in the outcome.
    pub fn synthesize(&self, records: &mut [TrialRecord]) -> Result<SynthesisOutcome> {
        let accepted: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.excluded)
            .map(|(i, _)| i)
            .collect();
        let Some((&first, &last)) = accepted.first().zip(accepted.last()) else {
            return Err(CastError::NoTrials {
                message: "no accepted trials to annotate".to_string(),
            });
        };
        let tier_start = records[first].slice_begin.unwrap_or(0.0);
        let tier_end = records[last].slice_end.unwrap_or(tier_start);

        let mut failures = Vec::new();
        let mut utterance = Vec::new();
        let mut word = Vec::new();
        let mut phoneme = Vec::new();
        let mut file = Vec::new();

        for &index in &accepted {
            let record = &mut records[index];
            match self.trial_intervals(record) {
                Ok(intervals) => {
                    utterance.extend(intervals.utterance);
                    word.extend(intervals.word);
                    phoneme.extend(intervals.phoneme);
                }
                Err(error) => {
                    // Annotation for this trial is unusable; keep the
                    // timeline covered with an unlabeled span.
                    let begin = record.slice_begin.unwrap_or(tier_start);
                    let end = record.slice_end.unwrap_or(begin);
                    let filler = Interval::new("", begin, end);
                    utterance.push(filler.clone());
                    word.push(filler.clone());
                    phoneme.push(filler);
                    failures.push(LoadReport {
                        filename: record.filename.clone(),
                        reason: error.to_string(),
                    });
                }
            }
            let begin = record.slice_begin.unwrap_or(tier_start);
            let end = record.slice_end.unwrap_or(begin);
            file.push(Interval::new(record.filename.clone(), begin, end));
        }

        let mut tiers = Vec::new();
        if self.selection.file {
            tiers.push(Tier {
                name: self.names.file.clone(),
                intervals: file,
            });
        }
        if self.selection.utterance {
            tiers.push(Tier {
                name: self.names.utterance.clone(),
                intervals: utterance.clone(),
            });
        }
        if self.selection.word {
            tiers.push(Tier {
                name: self.names.word.clone(),
                intervals: word,
            });
        }
        if self.selection.phoneme {
            tiers.push(Tier {
                name: self.names.phoneme.clone(),
                intervals: phoneme.clone(),
            });
        }
        if self.selection.phone {
            tiers.push(Tier {
                name: self.names.phone.clone(),
                intervals: phoneme,
            });
        }

        for tier in &tiers {
            validate_intervals(&tier.name, &tier.intervals, tier_start, tier_end)?;
        }

        Ok(SynthesisOutcome { tiers, failures })
    }

    /// Generate and check one trial's interval runs for every content
    /// tier. Also fills in the record's transcription and segment
    /// boundaries; the computation has no hidden state, so repeating it
    /// yields identical results.
    fn trial_intervals(&self, record: &mut TrialRecord) -> Result<TrialIntervals> {
        self.compute_boundaries(record)?;

        let slice_begin = stamped(record, record.slice_begin, "slice_begin")?;
        let slice_end = stamped(record, record.slice_end, "slice_end")?;
        let boundaries = &record.segment_boundaries;
        let first_boundary = boundaries[0];
        let last_boundary = boundaries[boundaries.len() - 1];

        // Shared pre/post silence buffers; a detected tone splits the
        // pre-silence at the tone boundaries.
        let mut beginning = Vec::new();
        if let Some(onset) = record.onset_time {
            beginning.push(Interval::new("", slice_begin, onset));
            beginning.push(Interval::new(
                BEEP_LABEL,
                onset,
                onset + defaults::TONE_DURATION_SECS,
            ));
            beginning.push(Interval::new(
                "",
                onset + defaults::TONE_DURATION_SECS,
                first_boundary,
            ));
        } else {
            beginning.push(Interval::new("", slice_begin, first_boundary));
        }
        let ending = Interval::new("", last_boundary, slice_end);

        let mut utterance = beginning.clone();
        utterance.push(Interval::new(record.prompt.clone(), first_boundary, last_boundary));
        utterance.push(ending.clone());

        // The word tier carries the whole prompt as one span; per-word
        // subdivision is left to manual correction.
        let word = utterance.clone();

        let mut phoneme = beginning;
        match &record.transcription {
            Some(labels) => {
                for (i, label) in labels.iter().enumerate() {
                    phoneme.push(Interval::new(
                        label.clone(),
                        boundaries[i],
                        boundaries[i + 1],
                    ));
                }
            }
            None => {
                phoneme.push(Interval::new(
                    record.prompt.clone(),
                    first_boundary,
                    last_boundary,
                ));
            }
        }
        phoneme.push(ending);

        for intervals in [&utterance, &word, &phoneme] {
            validate_intervals(&record.filename, intervals, slice_begin, slice_end)?;
        }

        Ok(TrialIntervals {
            utterance,
            word,
            phoneme,
        })
    }

    /// Compute the segmentation window and boundary times for one trial.
    fn compute_boundaries(&self, record: &mut TrialRecord) -> Result<()> {
        let segmentation_start = stamped(record, record.segmentation_start, "segmentation_start")?;
        let slice_end = stamped(record, record.slice_end, "slice_end")?;

        // Fixed calibration offset between the nominal segmentation
        // start and the earliest plausible speech.
        let earliest_speech = segmentation_start + defaults::ALIGNMENT_OFFSET_SECS;
        let region = slice_end - earliest_speech;
        let seg_begin = earliest_speech + region * self.word_guess.begin;
        let seg_end = earliest_speech + region * self.word_guess.end;
        if seg_begin >= seg_end {
            return Err(CastError::SegmentationInvariant {
                trial: record.filename.clone(),
                message: format!(
                    "segmentation window is empty ({seg_begin}..{seg_end}); \
                     the trial is too short for the word-guess coefficients"
                ),
            });
        }

        record.transcription = self
            .dictionary
            .and_then(|dict| dict.get(&record.prompt).cloned());

        record.segment_boundaries = match &record.transcription {
            Some(labels) => {
                // Evenly spaced guess over the window, dropping the two
                // extremes: n+1 boundaries bracketing n phoneme spans.
                let points = linspace(seg_begin, seg_end, labels.len() + 3);
                points[1..points.len() - 1].to_vec()
            }
            None => vec![seg_begin, seg_end],
        };
        Ok(())
    }
}

struct TrialIntervals {
    utterance: Vec<Interval>,
    word: Vec<Interval>,
    phoneme: Vec<Interval>,
}

fn stamped(record: &TrialRecord, value: Option<f64>, field: &str) -> Result<f64> {
    value.ok_or_else(|| CastError::SegmentationInvariant {
        trial: record.filename.clone(),
        message: format!("{field} was never stamped"),
    })
}

/// `count` evenly spaced points from `begin` to `end`, endpoint exact.
fn linspace(begin: f64, end: f64, count: usize) -> Vec<f64> {
    debug_assert!(count >= 2);
    let step = (end - begin) / (count - 1) as f64;
    (0..count)
        .map(|i| {
            if i == count - 1 {
                end
            } else {
                begin + i as f64 * step
            }
        })
        .collect()
}
