//! Harmonic-percussive source separation via median filtering.
//!
//! Sustained tones are continuous along time (horizontal median), drum hits
//! are broadband within a frame (vertical median). Soft Wiener masks built
//! from the two filtered spectrograms split the complex STFT, which is then
//! inverted back to two signals.

use crate::stft::Stft;

/// Parameters for HPSS processing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HpssParams {
    /// FFT size of the separation STFT
    pub fft_size: usize,
    /// Hop of the separation STFT
    pub hop_size: usize,
    /// Width of the time-axis median filter in frames
    pub harmonic_width: usize,
    /// Width of the frequency-axis median filter in bins
    pub percussive_width: usize,
}

impl Default for HpssParams {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            hop_size: 512,
            harmonic_width: 17,
            percussive_width: 17,
        }
    }
}

/// Split `input` into `(harmonic, percussive)` signals of the same length.
pub fn hpss(input: &[f32], params: &HpssParams) -> (Vec<f32>, Vec<f32>) {
    if input.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let stft = Stft::new(params.fft_size, params.hop_size);
    let mut spectrogram = stft.forward(input);
    let magnitudes: Vec<Vec<f32>> = spectrogram
        .iter()
        .map(|frame| frame.iter().map(|c| c.norm()).collect())
        .collect();

    let harmonic_mags = median_filter_horizontal(&magnitudes, params.harmonic_width);
    let percussive_mags = median_filter_vertical(&magnitudes, params.percussive_width);

    // H_mask = H^2 / (H^2 + P^2 + eps)
    let eps = 1e-10f32;
    let mut percussive_spec = spectrogram.clone();
    for (t, frame) in spectrogram.iter_mut().enumerate() {
        for (bin, value) in frame.iter_mut().enumerate() {
            let h2 = harmonic_mags[t][bin].powi(2);
            let p2 = percussive_mags[t][bin].powi(2);
            let denom = h2 + p2 + eps;
            percussive_spec[t][bin] = *value * (p2 / denom);
            *value *= h2 / denom;
        }
    }

    let harmonic = stft.inverse(&spectrogram, input.len());
    let percussive = stft.inverse(&percussive_spec, input.len());
    (harmonic, percussive)
}

/// Harmonic component only.
pub fn harmonic(input: &[f32], params: &HpssParams) -> Vec<f32> {
    hpss(input, params).0
}

fn median(scratch: &mut [f32]) -> f32 {
    scratch.sort_unstable_by(|a, b| a.total_cmp(b));
    scratch[scratch.len() / 2]
}

/// Median over `width` frames centred on each frame, per bin.
fn median_filter_horizontal(mags: &[Vec<f32>], width: usize) -> Vec<Vec<f32>> {
    let num_frames = mags.len();
    if num_frames == 0 {
        return Vec::new();
    }
    let num_bins = mags[0].len();
    let half = width / 2;
    let mut scratch = Vec::with_capacity(width);

    (0..num_frames)
        .map(|t| {
            let start = t.saturating_sub(half);
            let end = (t + half + 1).min(num_frames);
            (0..num_bins)
                .map(|bin| {
                    scratch.clear();
                    scratch.extend(mags[start..end].iter().map(|frame| frame[bin]));
                    median(&mut scratch)
                })
                .collect()
        })
        .collect()
}

/// Median over `width` bins centred on each bin, per frame.
fn median_filter_vertical(mags: &[Vec<f32>], width: usize) -> Vec<Vec<f32>> {
    let half = width / 2;
    let mut scratch = Vec::with_capacity(width);

    mags.iter()
        .map(|frame| {
            let num_bins = frame.len();
            (0..num_bins)
                .map(|bin| {
                    let start = bin.saturating_sub(half);
                    let end = (bin + half + 1).min(num_bins);
                    scratch.clear();
                    scratch.extend_from_slice(&frame[start..end]);
                    median(&mut scratch)
                })
                .collect()
        })
        .collect()
}
