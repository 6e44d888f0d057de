//! Onset detection for drum loops.
//!
//! Computes an onset-strength envelope (one value per STFT hop) and
//! peak-picks it with local-maximum, moving-average and minimum-gap rules.
//!
//! The envelope is positive spectral flux over log-compressed magnitudes,
//! averaged across bins.

use crate::stft::Stft;
use hookaid_core::Signal;
use tracing::debug;

/// Default FFT size for the onset envelope
pub const DEFAULT_FFT_SIZE: usize = 2048;

/// Default hop size (samples between envelope frames)
pub const DEFAULT_HOP_SIZE: usize = 512;

/// Log compression factor applied to magnitudes before differencing
const LOG_COMPRESSION: f32 = 1000.0;

/// A detected onset
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Onset {
    /// Envelope frame index
    pub frame: usize,
    /// Time position in seconds
    pub time: f64,
    /// Normalized envelope value at the peak (0.0 - 1.0)
    pub strength: f32,
}

/// Peak-picking windows, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakPickParams {
    /// Look-back for the local maximum test
    pub pre_max: f64,
    /// Look-ahead for the local maximum test
    pub post_max: f64,
    /// Look-back for the moving average
    pub pre_avg: f64,
    /// Look-ahead for the moving average
    pub post_avg: f64,
    /// Height above the moving average a peak must reach
    pub delta: f32,
    /// Minimum gap between consecutive onsets
    pub wait: f64,
}

impl Default for PeakPickParams {
    fn default() -> Self {
        Self {
            pre_max: 0.03,
            post_max: 0.0,
            pre_avg: 0.10,
            post_avg: 0.10,
            delta: 0.07,
            wait: 0.03,
        }
    }
}

/// Onset detector for drum loops
pub struct OnsetDetector {
    sample_rate: u32,
    stft: Stft,
    params: PeakPickParams,
}

impl OnsetDetector {
    /// Create a detector with the default 2048/512 analysis frames
    pub fn new(sample_rate: u32) -> Self {
        Self::with_params(sample_rate, DEFAULT_FFT_SIZE, DEFAULT_HOP_SIZE)
    }

    /// Create with custom FFT and hop size
    pub fn with_params(sample_rate: u32, fft_size: usize, hop_size: usize) -> Self {
        Self {
            sample_rate,
            stft: Stft::new(fft_size.next_power_of_two(), hop_size),
            params: PeakPickParams::default(),
        }
    }

    pub fn hop_size(&self) -> usize {
        self.stft.hop()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Envelope frames per second.
    pub fn frame_rate(&self) -> f64 {
        self.sample_rate as f64 / self.stft.hop() as f64
    }

    /// Time in seconds of envelope frame `frame`.
    pub fn frame_to_time(&self, frame: usize) -> f64 {
        frame as f64 / self.frame_rate()
    }

    /// Onset-strength envelope, one value per hop. Frame 0 is always 0.
    pub fn envelope(&self, samples: &[f32]) -> Vec<f32> {
        let mut mags = self.stft.magnitudes(samples);
        for frame in mags.iter_mut() {
            for m in frame.iter_mut() {
                *m = (1.0 + LOG_COMPRESSION * *m).ln();
            }
        }

        let mut envelope = Vec::with_capacity(mags.len());
        if mags.is_empty() {
            return envelope;
        }
        envelope.push(0.0);
        for pair in mags.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            let flux: f32 = cur
                .iter()
                .zip(prev.iter())
                .map(|(c, p)| (c - p).max(0.0))
                .sum();
            envelope.push(flux / cur.len() as f32);
        }
        envelope
    }

    /// Analyze audio and detect onsets, sorted by time.
    pub fn detect(&self, samples: &[f32]) -> Vec<Onset> {
        let envelope = self.envelope(samples);
        self.detect_from_envelope(&envelope)
    }

    /// Peak-pick a precomputed envelope.
    pub fn detect_from_envelope(&self, envelope: &[f32]) -> Vec<Onset> {
        let normalized = normalize_unit(envelope);
        let fps = self.frame_rate();
        let frames = |secs: f64| (secs * fps) as usize;
        let picked = peak_pick(
            &normalized,
            frames(self.params.pre_max),
            frames(self.params.post_max) + 1,
            frames(self.params.pre_avg),
            frames(self.params.post_avg) + 1,
            self.params.delta,
            frames(self.params.wait),
        );

        let onsets: Vec<Onset> = picked
            .into_iter()
            .map(|frame| Onset {
                frame,
                time: self.frame_to_time(frame),
                strength: normalized[frame],
            })
            .collect();
        debug!("Detected {} onsets", onsets.len());
        onsets
    }
}

/// Shift and scale to [0, 1]. A flat envelope becomes all zeros.
fn normalize_unit(envelope: &[f32]) -> Vec<f32> {
    let min = envelope.iter().copied().fold(f32::INFINITY, f32::min);
    let max = envelope.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;
    if !range.is_finite() || range <= f32::EPSILON {
        return vec![0.0; envelope.len()];
    }
    envelope.iter().map(|v| (v - min) / range).collect()
}

/// Indices `n` where `x[n]` is the maximum of `x[n - pre_max .. n + post_max]`,
/// at least `delta` above the mean of `x[n - pre_avg .. n + post_avg]`, and
/// more than `wait` frames after the previous peak.
pub fn peak_pick(
    x: &[f32],
    pre_max: usize,
    post_max: usize,
    pre_avg: usize,
    post_avg: usize,
    delta: f32,
    wait: usize,
) -> Vec<usize> {
    let len = x.len();
    let mut peaks: Vec<usize> = Vec::new();

    for n in 0..len {
        let max_window = &x[n.saturating_sub(pre_max)..(n + post_max.max(1)).min(len)];
        let local_max = max_window.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        if x[n] < local_max {
            continue;
        }

        let avg_window = &x[n.saturating_sub(pre_avg)..(n + post_avg.max(1)).min(len)];
        let mean = avg_window.iter().sum::<f32>() / avg_window.len() as f32;
        if x[n] < mean + delta {
            continue;
        }

        if let Some(&last) = peaks.last() {
            if n - last <= wait {
                continue;
            }
        }
        peaks.push(n);
    }

    peaks
}

/// Onset times in seconds for a loaded signal.
pub fn onset_times(signal: &Signal) -> Vec<f64> {
    if signal.is_empty() || signal.sample_rate == 0 {
        return Vec::new();
    }
    OnsetDetector::new(signal.sample_rate)
        .detect(&signal.samples)
        .into_iter()
        .map(|o| o.time)
        .collect()
}
