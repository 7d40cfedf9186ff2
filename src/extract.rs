//! TextGrid round-trip operations.
//!
//! Annotation is a cycle: the concatenated session grid is corrected by
//! hand in Praat, then split back into per-trial TextGrids. `extract`
//! does the splitting, driven by the timing columns of the results CSV.
//! Hand correction also tends to leave stray empty intervals where a
//! boundary was moved twice; `remove_empty_intervals` merges those into
//! their predecessors.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::output::textgrid::{read_textgrid, write_textgrid};
use crate::tiers::{Interval, Tier};

/// Timing columns of one results-CSV row. Other columns are ignored, so
/// the reader works with and without the `beep` column.
#[derive(Debug, Clone, Deserialize)]
struct ResultRow {
    id: String,
    #[serde(rename = "sliceBegin")]
    slice_begin: f64,
    #[serde(rename = "sliceEnd")]
    slice_end: f64,
}

fn read_result_rows(path: &Path) -> Result<Vec<ResultRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Split a corrected session TextGrid back into per-trial TextGrids.
///
/// `csv_path` is the results file written by the concatenation run; its
/// slice columns say where each trial lies on the session timeline.
/// Intervals lying fully inside a trial's slice are copied and shifted
/// so the per-trial grid starts at 0. Existing TextGrids in `out_dir`
/// are overwritten. Returns the number of grids written.
pub fn extract_textgrids(csv_path: &Path, grid_path: &Path, out_dir: &Path) -> Result<usize> {
    let rows = read_result_rows(csv_path)?;
    let session = read_textgrid(grid_path)?;
    if !out_dir.is_dir() {
        fs::create_dir_all(out_dir)?;
    }

    for row in &rows {
        let tiers: Vec<Tier> = session
            .tiers
            .iter()
            .map(|tier| Tier {
                name: tier.name.clone(),
                intervals: tier
                    .intervals
                    .iter()
                    .filter(|i| i.begin >= row.slice_begin && i.end <= row.slice_end)
                    .map(|i| {
                        Interval::new(
                            i.label.clone(),
                            i.begin - row.slice_begin,
                            i.end - row.slice_begin,
                        )
                    })
                    .collect(),
            })
            .collect();
        let duration = row.slice_end - row.slice_begin;
        let path = out_dir.join(format!("{}.TextGrid", row.id));
        write_textgrid(&path, &tiers, duration)?;
    }
    Ok(rows.len())
}

/// Merge empty intervals into their predecessors, in place.
///
/// A tier's first and last intervals are kept even when empty: they are
/// the legitimate silence buffers around the trial.
pub fn remove_empty_intervals(tiers: &mut [Tier]) {
    for tier in tiers.iter_mut() {
        let original = std::mem::take(&mut tier.intervals);
        let count = original.len();
        let mut merged: Vec<Interval> = Vec::with_capacity(count);
        for (index, interval) in original.into_iter().enumerate() {
            let interior = index > 0 && index + 1 < count;
            if interior && interval.label.is_empty() {
                if let Some(previous) = merged.last_mut() {
                    previous.end = interval.end;
                    continue;
                }
            }
            merged.push(interval);
        }
        tier.intervals = merged;
    }
}

/// Clean every TextGrid in `in_dir` with [`remove_empty_intervals`],
/// writing the results under the same names into `out_dir`. Returns the
/// number of grids written.
pub fn remove_empty_intervals_from_textgrids(in_dir: &Path, out_dir: &Path) -> Result<usize> {
    let mut grid_files: Vec<_> = fs::read_dir(in_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("textgrid"))
        })
        .collect();
    grid_files.sort();
    if !out_dir.is_dir() {
        fs::create_dir_all(out_dir)?;
    }

    let mut written = 0;
    for path in &grid_files {
        let Some(name) = path.file_name() else {
            continue;
        };
        let mut grid = read_textgrid(path)?;
        remove_empty_intervals(&mut grid.tiers);
        write_textgrid(&out_dir.join(name), &grid.tiers, grid.duration)?;
        written += 1;
    }
    Ok(written)
}
