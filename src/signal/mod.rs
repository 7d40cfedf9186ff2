//! Signal processing: filter design and synchronization-tone detection.

pub mod filters;
pub mod onset;

pub use filters::{band_pass, high_pass, FilterSpec};
pub use onset::{detect_beep_and_speech, Onset};
