//! Output writers: concatenated WAV, tabular results, tiered
//! annotation (Praat TextGrid) and its JSON counterpart.

pub mod json;
pub mod results;
pub mod textgrid;
pub mod wav;
