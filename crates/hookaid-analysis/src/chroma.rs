//! Peak-based chroma extraction.
//!
//! Only tonal spectral peaks count toward the chroma: local maxima that stand
//! at least 20 dB above the frame's median magnitude and within 60 dB of the
//! loudest bin in the signal. Broadband noise has no such peaks and so
//! produces an all-zero chroma.

use crate::stft::Stft;
use tracing::debug;

/// Chroma STFT size
pub const CHROMA_FFT_SIZE: usize = 4096;

/// Chroma STFT hop
pub const CHROMA_HOP_SIZE: usize = 1024;

/// Lowest frequency considered (A1)
const MIN_FREQ: f32 = 55.0;

/// Highest frequency considered
const MAX_FREQ: f32 = 5000.0;

/// Required prominence over the frame median (20 dB in amplitude)
const PEAK_OVER_MEDIAN: f32 = 10.0;

/// Dynamic range below the global maximum (60 dB in amplitude)
const GLOBAL_RANGE: f32 = 1e-3;

/// Pitch class (0 = C) of a frequency in Hz.
pub fn pitch_class_of(freq: f32) -> usize {
    let midi = 69.0 + 12.0 * (freq / 440.0).log2();
    (midi.round() as i64).rem_euclid(12) as usize
}

/// Parabolic interpolation of a peak's fractional bin offset in [-0.5, 0.5].
fn interpolate_peak(left: f32, centre: f32, right: f32) -> f32 {
    let (a, b, c) = (
        (left + 1e-12).ln(),
        (centre + 1e-12).ln(),
        (right + 1e-12).ln(),
    );
    let denom = a - 2.0 * b + c;
    if denom.abs() < 1e-12 {
        return 0.0;
    }
    (0.5 * (a - c) / denom).clamp(-0.5, 0.5)
}

/// Time-averaged 12-bin chroma vector of `samples`, unnormalized.
pub fn chroma(samples: &[f32], sample_rate: u32) -> [f64; 12] {
    let mut chroma = [0.0f64; 12];
    if samples.is_empty() || sample_rate == 0 {
        return chroma;
    }

    let stft = Stft::new(CHROMA_FFT_SIZE, CHROMA_HOP_SIZE);
    let mags = stft.magnitudes(samples);
    if mags.is_empty() {
        return chroma;
    }

    let global_max = mags
        .iter()
        .flat_map(|frame| frame.iter())
        .copied()
        .fold(0.0f32, f32::max);
    if global_max <= 0.0 {
        return chroma;
    }
    let floor = global_max * GLOBAL_RANGE;

    let bin_hz = sample_rate as f32 / CHROMA_FFT_SIZE as f32;
    let lo = ((MIN_FREQ / bin_hz).floor() as usize).max(1);
    let hi = ((MAX_FREQ / bin_hz).ceil() as usize).min(stft.num_bins() - 2);

    let mut sorted = Vec::with_capacity(stft.num_bins());
    let mut peaks = 0usize;
    for frame in &mags {
        sorted.clear();
        sorted.extend_from_slice(frame);
        sorted.sort_unstable_by(|a, b| a.total_cmp(b));
        let median = sorted[sorted.len() / 2];
        let threshold = (median * PEAK_OVER_MEDIAN).max(floor);

        for k in lo..=hi {
            let m = frame[k];
            if m < threshold || m <= frame[k - 1] || m < frame[k + 1] {
                continue;
            }
            let offset = interpolate_peak(frame[k - 1], m, frame[k + 1]);
            let freq = (k as f32 + offset) * bin_hz;
            if !(MIN_FREQ..=MAX_FREQ).contains(&freq) {
                continue;
            }
            let power: f32 = frame[k - 1].powi(2) + m.powi(2) + frame[k + 1].powi(2);
            chroma[pitch_class_of(freq)] += power as f64;
            peaks += 1;
        }
    }

    let frames = mags.len() as f64;
    for c in chroma.iter_mut() {
        *c /= frames;
    }
    debug!("Chroma from {} tonal peaks over {} frames", peaks, mags.len());
    chroma
}
