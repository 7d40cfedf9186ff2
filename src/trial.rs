//! Per-trial records and audio views.

use std::path::PathBuf;

/// One experimental trial: a recording, its prompt, and the global
/// timeline fields filled in progressively by the concatenator and the
/// tier synthesizer.
///
/// All timestamps are in seconds on the global (concatenated) timeline
/// and are explicit options rather than sentinel values: `None` means
/// the field has not been produced for this trial.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRecord {
    /// Stable identifier: the wav file's stem.
    pub filename: String,
    pub speaker: String,
    pub wav_path: PathBuf,
    pub prompt_path: PathBuf,
    /// Auxiliary sensor recording (e.g. ultrasound), if the setup has one.
    pub sensor_path: Option<PathBuf>,
    /// Once set, never un-set.
    pub excluded: bool,
    /// The word or utterance spoken in this trial.
    pub prompt: String,
    /// Global time where this trial's audio starts.
    pub slice_begin: Option<f64>,
    /// Global time of the detected synchronization tone.
    pub onset_time: Option<f64>,
    /// Global time after which word-internal segmentation begins.
    pub segmentation_start: Option<f64>,
    /// Global time where this trial's audio ends, exclusive of the next
    /// trial's `slice_begin`.
    pub slice_end: Option<f64>,
    /// Verdict of the speech-presence check, when detection ran.
    pub has_speech: Option<bool>,
    /// Phoneme labels from the pronunciation dictionary, when available.
    pub transcription: Option<Vec<String>>,
    /// Ordered boundary times bracketing the first-guess segmentation.
    pub segment_boundaries: Vec<f64>,
}

impl TrialRecord {
    /// Create a fresh record with no timeline data.
    pub fn new(
        filename: impl Into<String>,
        speaker: impl Into<String>,
        wav_path: PathBuf,
        prompt_path: PathBuf,
        sensor_path: Option<PathBuf>,
    ) -> Self {
        Self {
            filename: filename.into(),
            speaker: speaker.into(),
            wav_path,
            prompt_path,
            sensor_path,
            excluded: false,
            prompt: String::new(),
            slice_begin: None,
            onset_time: None,
            segmentation_start: None,
            slice_end: None,
            has_speech: None,
            transcription: None,
            segment_boundaries: Vec::new(),
        }
    }

    /// Mark the trial excluded. Exclusion is one-way.
    pub fn exclude(&mut self) {
        self.excluded = true;
    }
}

/// A borrowed view over one trial's raw interleaved PCM samples.
///
/// Segments are transient: read once, appended to the output buffer,
/// and discarded. All segments in a run must share `sample_rate` and
/// `channels`; the concatenator validates this and never resamples.
#[derive(Debug, Clone, Copy)]
pub struct AudioSegment<'a> {
    pub samples: &'a [i16],
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioSegment<'_> {
    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// First channel as normalized floats, for the onset detector.
    pub fn first_channel_f64(&self) -> Vec<f64> {
        let step = self.channels.max(1) as usize;
        self.samples
            .iter()
            .step_by(step)
            .map(|&s| s as f64 / i16::MAX as f64)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(samples: &[i16], channels: u16) -> AudioSegment<'_> {
        AudioSegment {
            samples,
            sample_rate: 16_000,
            channels,
        }
    }

    #[test]
    fn test_stereo_duration_counts_frames_not_samples() {
        let samples = vec![0i16; 32_000];
        let stereo = segment(&samples, 2);
        assert_eq!(stereo.frames(), 16_000);
        assert!((stereo.duration() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_first_channel_picks_every_other_sample() {
        let samples = [100i16, -100, 200, -200];
        let stereo = segment(&samples, 2);
        let mono = stereo.first_channel_f64();
        assert_eq!(mono.len(), 2);
        assert!(mono[0] > 0.0 && mono[1] > 0.0);
    }

    #[test]
    fn test_exclusion_is_one_way() {
        let mut record = TrialRecord::new(
            "rec_001",
            "speaker1",
            PathBuf::from("rec_001.wav"),
            PathBuf::from("rec_001.txt"),
            None,
        );
        assert!(!record.excluded);
        record.exclude();
        record.exclude();
        assert!(record.excluded);
    }
}
