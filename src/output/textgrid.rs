//! Praat TextGrid serialization and parsing (long text format).
//!
//! The serializer is deliberately small: interval tiers only, times
//! printed with enough digits to round-trip `f64`, labels quoted with
//! Praat's doubled-quote escaping. The parser reads the same format
//! back, which is also what Praat's default text save produces, so
//! hand-corrected session grids can be split into per-trial grids.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{CastError, Result};
use crate::tiers::{Interval, Tier};

fn praat_number(value: f64) -> String {
    // Shortest representation that round-trips; Praat accepts both
    // integers and decimals here.
    let mut text = format!("{value}");
    if !text.contains('.') && !text.contains('e') {
        text.push_str(".0");
    }
    text
}

fn praat_string(label: &str) -> String {
    format!("\"{}\"", label.replace('"', "\"\""))
}

struct Document<'a> {
    tiers: &'a [Tier],
    duration: f64,
}

impl fmt::Display for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File type = \"ooTextFile\"")?;
        writeln!(f, "Object class = \"TextGrid\"")?;
        writeln!(f)?;
        writeln!(f, "xmin = {}", praat_number(0.0))?;
        writeln!(f, "xmax = {}", praat_number(self.duration))?;
        writeln!(f, "tiers? <exists>")?;
        writeln!(f, "size = {}", self.tiers.len())?;
        writeln!(f, "item []:")?;
        for (tier_index, tier) in self.tiers.iter().enumerate() {
            writeln!(f, "    item [{}]:", tier_index + 1)?;
            writeln!(f, "        class = \"IntervalTier\"")?;
            writeln!(f, "        name = {}", praat_string(&tier.name))?;
            writeln!(f, "        xmin = {}", praat_number(0.0))?;
            writeln!(f, "        xmax = {}", praat_number(self.duration))?;
            writeln!(f, "        intervals: size = {}", tier.intervals.len())?;
            for (index, interval) in tier.intervals.iter().enumerate() {
                writeln!(f, "        intervals [{}]:", index + 1)?;
                writeln!(f, "            xmin = {}", praat_number(interval.begin))?;
                writeln!(f, "            xmax = {}", praat_number(interval.end))?;
                writeln!(f, "            text = {}", praat_string(&interval.label))?;
            }
        }
        Ok(())
    }
}

/// Serialize tiers covering `[0, duration]` to the long TextGrid format.
pub fn to_textgrid_string(tiers: &[Tier], duration: f64) -> String {
    Document { tiers, duration }.to_string()
}

/// Write the tiers to `path` as a TextGrid file.
pub fn write_textgrid(path: &Path, tiers: &[Tier], duration: f64) -> Result<()> {
    fs::write(path, to_textgrid_string(tiers, duration))?;
    Ok(())
}

/// A TextGrid read back from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTextGrid {
    pub tiers: Vec<Tier>,
    /// The file-level `xmax`.
    pub duration: f64,
}

fn unquote(value: &str) -> Option<String> {
    let inner = value.strip_prefix('"')?.strip_suffix('"')?;
    Some(inner.replace("\"\"", "\""))
}

/// Parse the long TextGrid text format.
///
/// Point tiers are skipped; only interval tiers carry segmentation
/// data in this pipeline. `source` labels parse errors, usually with
/// the file path.
pub fn parse_textgrid(text: &str, source: &str) -> Result<ParsedTextGrid> {
    let fail = |line: usize, message: String| CastError::TextGridParse {
        path: source.to_string(),
        line,
        message,
    };

    let mut duration = 0.0;
    let mut tiers: Vec<Tier> = Vec::new();
    let mut current: Option<Tier> = None;
    let mut interval_tier = false;
    let mut seen_item = false;
    let mut in_interval = false;
    let mut begin: Option<f64> = None;
    let mut end: Option<f64> = None;

    for (index, raw) in text.lines().enumerate() {
        let number = index + 1;
        let line = raw.trim();
        if line.starts_with("item [") {
            if let Some(tier) = current.take() {
                tiers.push(tier);
            }
            seen_item = true;
            interval_tier = false;
            in_interval = false;
        } else if line.starts_with("intervals [") {
            in_interval = true;
        } else if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim();
            match key {
                "class" => {
                    interval_tier = value == "\"IntervalTier\"";
                }
                "name" if seen_item && interval_tier => {
                    let name = unquote(value)
                        .ok_or_else(|| fail(number, format!("malformed tier name {value}")))?;
                    current = Some(Tier::new(name));
                }
                "xmin" if in_interval => {
                    let parsed = value
                        .parse::<f64>()
                        .map_err(|_| fail(number, format!("malformed time {value}")))?;
                    begin = Some(parsed);
                }
                "xmax" => {
                    let parsed = value
                        .parse::<f64>()
                        .map_err(|_| fail(number, format!("malformed time {value}")))?;
                    if in_interval {
                        end = Some(parsed);
                    } else if !seen_item {
                        duration = parsed;
                    }
                }
                "text" if in_interval => {
                    let label = unquote(value)
                        .ok_or_else(|| fail(number, format!("malformed label {value}")))?;
                    let (Some(begin), Some(end)) = (begin.take(), end.take()) else {
                        return Err(fail(number, "interval label before its times".to_string()));
                    };
                    let Some(tier) = current.as_mut() else {
                        return Err(fail(number, "interval outside of a tier".to_string()));
                    };
                    tier.intervals.push(Interval::new(label, begin, end));
                }
                _ => {}
            }
        }
    }
    if let Some(tier) = current.take() {
        tiers.push(tier);
    }
    Ok(ParsedTextGrid { tiers, duration })
}

/// Read and parse a TextGrid file.
pub fn read_textgrid(path: &Path) -> Result<ParsedTextGrid> {
    let text = fs::read_to_string(path)?;
    parse_textgrid(&text, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiers::Interval;

    fn word_tier() -> Tier {
        Tier {
            name: "Word".to_string(),
            intervals: vec![
                Interval::new("", 0.0, 0.2),
                Interval::new("ash", 0.2, 0.8),
                Interval::new("", 0.8, 1.0),
            ],
        }
    }

    #[test]
    fn test_header_declares_span_and_size() {
        let text = to_textgrid_string(&[word_tier()], 1.0);
        assert!(text.starts_with("File type = \"ooTextFile\""));
        assert!(text.contains("xmax = 1.0"));
        assert!(text.contains("size = 1"));
        assert!(text.contains("class = \"IntervalTier\""));
        assert!(text.contains("name = \"Word\""));
    }

    #[test]
    fn test_intervals_are_numbered_from_one() {
        let text = to_textgrid_string(&[word_tier()], 1.0);
        assert!(text.contains("intervals: size = 3"));
        assert!(text.contains("intervals [1]:"));
        assert!(text.contains("intervals [3]:"));
        assert!(text.contains("text = \"ash\""));
    }

    #[test]
    fn test_quotes_in_labels_are_doubled() {
        let tier = Tier {
            name: "Word".to_string(),
            intervals: vec![Interval::new("say \"ash\"", 0.0, 1.0)],
        };
        let text = to_textgrid_string(&[tier], 1.0);
        assert!(text.contains("text = \"say \"\"ash\"\"\""));
    }

    #[test]
    fn test_times_round_trip() {
        let tier = Tier {
            name: "Word".to_string(),
            intervals: vec![Interval::new("x", 0.0, 0.30000000000000004)],
        };
        let text = to_textgrid_string(&[tier], 0.30000000000000004);
        assert!(text.contains("xmax = 0.30000000000000004"));
    }

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("out.TextGrid");
        write_textgrid(&path, &[word_tier()], 1.0).expect("write");
        assert!(path.is_file());
    }

    #[test]
    fn test_parser_reads_back_what_the_writer_wrote() {
        let tiers = vec![word_tier()];
        let text = to_textgrid_string(&tiers, 1.0);
        let parsed = parse_textgrid(&text, "round-trip").expect("parse");
        assert_eq!(parsed.duration, 1.0);
        assert_eq!(parsed.tiers, tiers);
    }

    #[test]
    fn test_parser_unescapes_doubled_quotes() {
        let tier = Tier {
            name: "Word".to_string(),
            intervals: vec![Interval::new("say \"ash\"", 0.0, 1.0)],
        };
        let text = to_textgrid_string(std::slice::from_ref(&tier), 1.0);
        let parsed = parse_textgrid(&text, "quotes").expect("parse");
        assert_eq!(parsed.tiers[0].intervals[0].label, "say \"ash\"");
    }

    #[test]
    fn test_parser_skips_point_tiers() {
        let text = "File type = \"ooTextFile\"\n\
                    Object class = \"TextGrid\"\n\
                    \n\
                    xmin = 0.0\n\
                    xmax = 1.0\n\
                    tiers? <exists>\n\
                    size = 2\n\
                    item []:\n\
                        item [1]:\n\
                            class = \"TextTier\"\n\
                            name = \"Clicks\"\n\
                            xmin = 0.0\n\
                            xmax = 1.0\n\
                            points: size = 0\n\
                        item [2]:\n\
                            class = \"IntervalTier\"\n\
                            name = \"Word\"\n\
                            xmin = 0.0\n\
                            xmax = 1.0\n\
                            intervals: size = 1\n\
                            intervals [1]:\n\
                                xmin = 0.0\n\
                                xmax = 1.0\n\
                                text = \"ash\"\n";
        let parsed = parse_textgrid(text, "mixed").expect("parse");
        assert_eq!(parsed.tiers.len(), 1);
        assert_eq!(parsed.tiers[0].name, "Word");
    }

    #[test]
    fn test_parser_rejects_malformed_times() {
        let text = to_textgrid_string(&[word_tier()], 1.0).replace("xmax = 0.2", "xmax = zero");
        let result = parse_textgrid(&text, "broken.TextGrid");
        match result {
            Err(crate::error::CastError::TextGridParse { path, .. }) => {
                assert_eq!(path, "broken.TextGrid");
            }
            other => panic!("expected TextGridParse, got {other:?}"),
        }
    }
}
