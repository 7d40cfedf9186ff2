//! Trial metadata loading.
//!
//! Audio annotation is driven by the wav files: they determine the name
//! list for all other per-trial files. Each wav's stem names its prompt
//! file and optional auxiliary sensor file.

use std::fs;
use std::path::Path;

use crate::defaults;
use crate::error::{CastError, Result};
use crate::trial::TrialRecord;

/// A trial excluded during loading, with the reason, for the caller to
/// report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub filename: String,
    pub reason: String,
}

/// Outcome of scanning a recording directory.
#[derive(Debug, Clone)]
pub struct TrialList {
    /// Ordered by filename; excluded trials are kept in place so that
    /// later stages can report them.
    pub records: Vec<TrialRecord>,
    pub reports: Vec<LoadReport>,
}

/// Scan `directory` for trials and load their prompts.
///
/// Trials without a prompt file are excluded (not an error). With
/// `require_sensor`, trials without the sensor file are excluded too.
/// The `test` flag truncates the list for dry runs.
pub fn load_trials(
    directory: &Path,
    speaker_id: &str,
    test: bool,
    require_sensor: bool,
) -> Result<TrialList> {
    let mut wav_files: Vec<_> = fs::read_dir(directory)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
        })
        .collect();
    wav_files.sort();

    if wav_files.is_empty() {
        return Err(CastError::NoTrials {
            message: format!(
                "didn't find any sound files to concatenate in {}",
                directory.display()
            ),
        });
    }

    if test && wav_files.len() > defaults::TEST_RUN_LIMIT {
        wav_files.truncate(defaults::TEST_RUN_LIMIT);
    }

    let mut records = Vec::with_capacity(wav_files.len());
    let mut reports = Vec::new();

    for wav_path in wav_files {
        let stem = wav_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let prompt_path = wav_path.with_extension("txt");
        let sensor_path = wav_path.with_extension("ult");
        let mut record = TrialRecord::new(
            stem.clone(),
            speaker_id,
            wav_path,
            prompt_path.clone(),
            sensor_path.is_file().then_some(sensor_path),
        );

        if require_sensor && record.sensor_path.is_none() {
            record.exclude();
            reports.push(LoadReport {
                filename: stem.clone(),
                reason: "recording has no sensor file".to_string(),
            });
        }

        if prompt_path.is_file() {
            let contents = fs::read_to_string(&prompt_path)?;
            record.prompt = contents.lines().next().unwrap_or("").trim().to_string();
        } else {
            record.exclude();
            reports.push(LoadReport {
                filename: stem,
                reason: "recording has no prompt file".to_string(),
            });
        }

        records.push(record);
    }

    Ok(TrialList { records, reports })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn write_wav(path: &Path) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
        for _ in 0..160 {
            writer.write_sample(0i16).expect("write sample");
        }
        writer.finalize().expect("finalize");
    }

    fn fixture_dir(count: usize, with_prompts: bool) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("temp dir");
        for i in 0..count {
            let wav = dir.path().join(format!("rec_{i:03}.wav"));
            write_wav(&wav);
            if with_prompts {
                let mut prompt = File::create(wav.with_extension("txt")).expect("prompt");
                writeln!(prompt, "word{i}").expect("write prompt");
            }
        }
        dir
    }

    #[test]
    fn test_loads_sorted_trials_with_prompts() {
        let dir = fixture_dir(3, true);
        let list = load_trials(dir.path(), "speaker1", false, false).expect("load");
        assert_eq!(list.records.len(), 3);
        assert_eq!(list.records[0].filename, "rec_000");
        assert_eq!(list.records[2].prompt, "word2");
        assert!(list.records.iter().all(|r| !r.excluded));
    }

    #[test]
    fn test_missing_prompt_excludes_trial() {
        let dir = fixture_dir(1, false);
        let list = load_trials(dir.path(), "speaker1", false, false).expect("load");
        assert!(list.records[0].excluded);
        assert_eq!(list.reports.len(), 1);
        assert!(list.reports[0].reason.contains("prompt"));
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(matches!(
            load_trials(dir.path(), "speaker1", false, false),
            Err(CastError::NoTrials { .. })
        ));
    }

    #[test]
    fn test_test_flag_truncates_to_ten() {
        let dir = fixture_dir(12, true);
        let list = load_trials(dir.path(), "speaker1", true, false).expect("load");
        assert_eq!(list.records.len(), 10);
    }

    #[test]
    fn test_require_sensor_excludes_trials_without_one() {
        let dir = fixture_dir(2, true);
        let list = load_trials(dir.path(), "speaker1", false, true).expect("load");
        assert!(list.records.iter().all(|r| r.excluded));
    }
}
