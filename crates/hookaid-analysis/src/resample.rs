//! Sample-rate conversion using rubato.

use crate::error::Result;
use rubato::{FftFixedIn, Resampler};

const CHUNK_SIZE: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Resample a mono buffer from `source_rate` to `target_rate`.
pub fn resample_mono(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    if source_rate == target_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        target_rate as usize,
        CHUNK_SIZE,
        SUB_CHUNKS,
        1,
    )?;

    let input_frames = samples.len();
    let expected_output_frames =
        (input_frames as f64 * target_rate as f64 / source_rate as f64).ceil() as usize;
    let delay = resampler.output_delay();

    let mut output = Vec::with_capacity(expected_output_frames + delay + CHUNK_SIZE);

    // Feed zero-padded chunks until the delayed tail has been flushed out
    let mut pos = 0;
    while pos < input_frames || output.len() < expected_output_frames + delay {
        let needed = resampler.input_frames_next();
        let mut chunk = vec![0.0f32; needed];
        if pos < input_frames {
            let copy = needed.min(input_frames - pos);
            chunk[..copy].copy_from_slice(&samples[pos..pos + copy]);
        }
        let input_channels = vec![chunk];
        let processed = resampler.process(&input_channels, None)?;
        output.extend_from_slice(&processed[0]);
        pos += needed;
    }

    let end = (delay + expected_output_frames).min(output.len());
    Ok(output[delay.min(end)..end].to_vec())
}
