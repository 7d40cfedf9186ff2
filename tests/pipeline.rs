//! End-to-end pipeline tests: a synthetic session directory goes
//! through loading, exclusion, concatenation, tier synthesis and all
//! four writers.

use std::f64::consts::PI;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use cast::concatenate::concatenate_trials;
use cast::config::Config;
use cast::exclusion::ExclusionList;
use cast::meta::load_trials;
use cast::output::{json, results, textgrid, wav};
use cast::tiers::TierSynthesizer;

const SAMPLE_RATE: u32 = 16_000;
const TRIAL_SECS: f64 = 2.05;

struct Noise(u64);

impl Noise {
    fn next(&mut self, amplitude: f64) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        amplitude * ((self.0 >> 33) as f64 / (1u64 << 30) as f64 - 1.0)
    }
}

/// 1 s of quiet noise, a 50 ms full-scale 1 kHz tone, 1 s of
/// speech-level noise.
fn trial_samples(seed: u64) -> Vec<i16> {
    let mut noise = Noise(seed);
    let fs = SAMPLE_RATE as f64;
    (0..(TRIAL_SECS * fs) as usize)
        .map(|i| {
            let t = i as f64 / fs;
            let value = if t < 1.0 {
                noise.next(0.01)
            } else if t < 1.05 {
                (2.0 * PI * 1_000.0 * (t - 1.0)).sin()
            } else {
                noise.next(0.3)
            };
            (value * i16::MAX as f64 * 0.9) as i16
        })
        .collect()
}

fn write_wav_file(path: &Path, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
    for &sample in samples {
        writer.write_sample(sample).expect("write sample");
    }
    writer.finalize().expect("finalize");
}

fn write_trial(dir: &Path, name: &str, prompt: &str, samples: &[i16]) -> PathBuf {
    let wav = dir.join(format!("{name}.wav"));
    write_wav_file(&wav, samples);
    let mut file = fs::File::create(wav.with_extension("txt")).expect("prompt");
    writeln!(file, "{prompt}").expect("write prompt");
    wav
}

fn session_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    write_trial(dir.path(), "rec_001", "ash", &trial_samples(1));
    write_trial(dir.path(), "rec_002", "tap test", &trial_samples(2));
    write_trial(dir.path(), "rec_003", "oak", &trial_samples(3));
    dir
}

#[test]
fn full_run_with_detection_produces_all_outputs() {
    let dir = session_dir();
    let config = Config::default();

    let mut trials = load_trials(dir.path(), "P1", false, false).expect("load");
    assert_eq!(trials.records.len(), 3);

    let exclusions = ExclusionList {
        prompts: vec!["tap test".to_string()],
        ..ExclusionList::default()
    };
    let reports = exclusions.apply(&mut trials.records);
    assert_eq!(reports.len(), 1);

    let audio =
        concatenate_trials(&mut trials.records, Some(&config.detector)).expect("concatenate");
    assert!(audio.detection_failures.is_empty());
    assert!((audio.total_duration - 2.0 * TRIAL_SECS).abs() < 1e-9);

    // Accepted trials form a chain; the onset sits near 1 s into each.
    let accepted: Vec<_> = trials.records.iter().filter(|r| !r.excluded).collect();
    assert_eq!(accepted.len(), 2);
    assert_eq!(accepted[0].slice_end, accepted[1].slice_begin);
    for record in &accepted {
        let onset = record.onset_time.expect("onset");
        let local = onset - record.slice_begin.expect("slice begin");
        assert!((local - 1.0).abs() <= 0.002, "onset at {local}");
        assert_eq!(record.has_speech, Some(true));
    }

    let synthesizer = TierSynthesizer::new(
        &config.tiers,
        &config.tier_names,
        config.word_guess,
        None,
    );
    let outcome = synthesizer.synthesize(&mut trials.records).expect("tiers");
    assert!(outcome.failures.is_empty());

    // Default selection: File, Utterance, Word, Phoneme.
    assert_eq!(outcome.tiers.len(), 4);
    for tier in &outcome.tiers {
        assert_eq!(tier.intervals.first().expect("intervals").begin, 0.0);
        assert_eq!(
            tier.intervals.last().expect("intervals").end,
            audio.total_duration
        );
        for pair in tier.intervals.windows(2) {
            assert_eq!(pair[0].end, pair[1].begin);
        }
    }
    let word = outcome
        .tiers
        .iter()
        .find(|t| t.name == "Word")
        .expect("word tier");
    assert!(word.intervals.iter().any(|i| i.label == "ash"));
    assert!(word.intervals.iter().any(|i| i.label == "BEEP"));
    assert!(!word.intervals.iter().any(|i| i.label == "tap test"));

    let stem = dir.path().join("concatenated");
    wav::write_wav(&stem.with_extension("wav"), &audio).expect("wav");
    results::write_results(&stem.with_extension("csv"), &trials.records, true).expect("csv");
    textgrid::write_textgrid(
        &stem.with_extension("TextGrid"),
        &outcome.tiers,
        audio.total_duration,
    )
    .expect("textgrid");
    json::write_json(
        &stem.with_extension("json"),
        &outcome.tiers,
        audio.total_duration,
    )
    .expect("json");

    let csv_text = fs::read_to_string(stem.with_extension("csv")).expect("read csv");
    assert_eq!(csv_text.lines().count(), 3); // header + 2 accepted trials
    assert!(csv_text.starts_with("id,speaker,sliceBegin,beep,begin,sliceEnd,prompt"));

    let grid_text = fs::read_to_string(stem.with_extension("TextGrid")).expect("read grid");
    assert!(grid_text.contains("Object class = \"TextGrid\""));
    assert!(grid_text.contains("name = \"Phoneme\""));

    let reader = hound::WavReader::open(stem.with_extension("wav")).expect("open wav");
    assert_eq!(
        reader.len() as usize,
        (2.0 * TRIAL_SECS * SAMPLE_RATE as f64) as usize
    );
}

#[test]
fn run_without_detection_segments_from_the_slice_start() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_trial(
        dir.path(),
        "rec_001",
        "ash",
        &vec![0i16; SAMPLE_RATE as usize],
    );
    write_trial(
        dir.path(),
        "rec_002",
        "oak",
        &vec![0i16; SAMPLE_RATE as usize],
    );
    let config = Config::default();

    let mut trials = load_trials(dir.path(), "P1", false, false).expect("load");
    let audio = concatenate_trials(&mut trials.records, None).expect("concatenate");
    assert!((audio.total_duration - 2.0).abs() < 1e-12);
    assert_eq!(trials.records[0].onset_time, None);
    assert_eq!(trials.records[0].segmentation_start, Some(0.0));

    let synthesizer = TierSynthesizer::new(
        &config.tiers,
        &config.tier_names,
        config.word_guess,
        None,
    );
    let outcome = synthesizer.synthesize(&mut trials.records).expect("tiers");
    let word = outcome
        .tiers
        .iter()
        .find(|t| t.name == "Word")
        .expect("word tier");
    // No tone: each trial is silence, word, silence.
    assert_eq!(word.intervals.len(), 6);
    assert!(!word.intervals.iter().any(|i| i.label == "BEEP"));
}

#[test]
fn dictionary_drives_phoneme_subdivision_through_the_whole_run() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_trial(dir.path(), "rec_001", "tile", &trial_samples(7));
    let config = Config::default();

    let mut dict_file = tempfile::NamedTempFile::new().expect("dict file");
    writeln!(dict_file, "tile,t,aI,l").expect("write dict");
    let dictionary =
        cast::pronounce::read_pronunciation_dict(dict_file.path()).expect("read dict");

    let mut trials = load_trials(dir.path(), "P1", false, false).expect("load");
    concatenate_trials(&mut trials.records, Some(&config.detector)).expect("concatenate");

    let synthesizer = TierSynthesizer::new(
        &config.tiers,
        &config.tier_names,
        config.word_guess,
        Some(&dictionary),
    );
    let outcome = synthesizer.synthesize(&mut trials.records).expect("tiers");
    let phoneme = outcome
        .tiers
        .iter()
        .find(|t| t.name == "Phoneme")
        .expect("phoneme tier");
    let labels: Vec<&str> = phoneme
        .intervals
        .iter()
        .map(|i| i.label.as_str())
        .filter(|l| !l.is_empty() && *l != "BEEP")
        .collect();
    assert_eq!(labels, vec!["t", "aI", "l"]);
}
