//! Tabular results output for R/Python analysis.
//!
//! One row per accepted trial with its global timestamps. The `beep`
//! column is only present when onset detection ran; analysis scripts
//! key on the header, not on column positions.

use std::path::Path;

use crate::error::Result;
use crate::trial::TrialRecord;

fn seconds(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write accepted trials as CSV. Excluded records are skipped.
pub fn write_results(path: &Path, records: &[TrialRecord], detect_beep: bool) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    if detect_beep {
        writer.write_record(["id", "speaker", "sliceBegin", "beep", "begin", "sliceEnd", "prompt"])?;
    } else {
        writer.write_record(["id", "speaker", "sliceBegin", "begin", "sliceEnd", "prompt"])?;
    }

    for record in records.iter().filter(|r| !r.excluded) {
        let mut row = vec![
            record.filename.clone(),
            record.speaker.clone(),
            seconds(record.slice_begin),
        ];
        if detect_beep {
            row.push(seconds(record.onset_time));
        }
        row.push(seconds(record.segmentation_start));
        row.push(seconds(record.slice_end));
        row.push(record.prompt.clone());
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn record(filename: &str) -> TrialRecord {
        let mut record = TrialRecord::new(
            filename,
            "speaker1",
            PathBuf::from(format!("{filename}.wav")),
            PathBuf::from(format!("{filename}.txt")),
            None,
        );
        record.prompt = "ash".to_string();
        record.slice_begin = Some(0.0);
        record.onset_time = Some(0.2);
        record.segmentation_start = Some(0.25);
        record.slice_end = Some(1.0);
        record
    }

    #[test]
    fn test_beep_column_present_when_detecting() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("results.csv");
        write_results(&path, &[record("rec_001")], true).expect("write");
        let contents = fs::read_to_string(&path).expect("read");
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("id,speaker,sliceBegin,beep,begin,sliceEnd,prompt")
        );
        assert_eq!(lines.next(), Some("rec_001,speaker1,0,0.2,0.25,1,ash"));
    }

    #[test]
    fn test_beep_column_absent_without_detection() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("results.csv");
        write_results(&path, &[record("rec_001")], false).expect("write");
        let contents = fs::read_to_string(&path).expect("read");
        assert!(contents.starts_with("id,speaker,sliceBegin,begin,sliceEnd,prompt"));
        assert!(!contents.contains("beep"));
    }

    #[test]
    fn test_excluded_records_are_not_written() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("results.csv");
        let mut excluded = record("rec_002");
        excluded.exclude();
        write_results(&path, &[record("rec_001"), excluded], true).expect("write");
        let contents = fs::read_to_string(&path).expect("read");
        assert!(contents.contains("rec_001"));
        assert!(!contents.contains("rec_002"));
    }
}
