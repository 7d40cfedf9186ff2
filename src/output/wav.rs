//! Concatenated WAV output.

use std::path::Path;

use crate::concatenate::ConcatenationResult;
use crate::error::Result;

/// Write the concatenated stream as a 16-bit PCM WAV file.
pub fn write_wav(path: &Path, audio: &ConcatenationResult) -> Result<()> {
    let spec = hound::WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in &audio.samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}
