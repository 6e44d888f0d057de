//! Centred short-time Fourier transform shared by the analyzers.
//!
//! Frames are centred: the signal is zero-padded by `n_fft / 2` on both sides,
//! so frame `t` is centred on sample `t * hop`.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

const COMPLEX_ZERO: Complex<f32> = Complex { re: 0.0, im: 0.0 };

/// Periodic Hann window.
pub fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let angle = 2.0 * core::f32::consts::PI * i as f32 / size as f32;
            0.5 * (1.0 - angle.cos())
        })
        .collect()
}

/// Forward/inverse STFT with a fixed FFT size and hop.
pub struct Stft {
    n_fft: usize,
    hop: usize,
    window: Vec<f32>,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
}

impl Stft {
    pub fn new(n_fft: usize, hop: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            n_fft,
            hop: hop.max(1),
            window: hann_window(n_fft),
            forward: planner.plan_fft_forward(n_fft),
            inverse: planner.plan_fft_inverse(n_fft),
        }
    }

    pub fn n_fft(&self) -> usize {
        self.n_fft
    }

    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Bins per frame (DC through Nyquist).
    pub fn num_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Frame count for a signal of `len` samples (0 for an empty signal).
    pub fn num_frames(&self, len: usize) -> usize {
        if len == 0 {
            0
        } else {
            1 + len / self.hop
        }
    }

    /// Centre frequency of `bin` in Hz.
    pub fn bin_frequency(&self, bin: usize, sample_rate: u32) -> f32 {
        bin as f32 * sample_rate as f32 / self.n_fft as f32
    }

    /// Complex spectrogram, indexed `[frame][bin]`.
    pub fn forward(&self, samples: &[f32]) -> Vec<Vec<Complex<f32>>> {
        let num_frames = self.num_frames(samples.len());
        let half = self.n_fft / 2;
        let num_bins = self.num_bins();
        let mut buf = vec![COMPLEX_ZERO; self.n_fft];
        let mut frames = Vec::with_capacity(num_frames);

        for t in 0..num_frames {
            // Index into the virtual padded signal
            let start = (t * self.hop) as isize - half as isize;
            for (i, slot) in buf.iter_mut().enumerate() {
                let idx = start + i as isize;
                *slot = if idx >= 0 && (idx as usize) < samples.len() {
                    Complex::new(samples[idx as usize] * self.window[i], 0.0)
                } else {
                    COMPLEX_ZERO
                };
            }
            self.forward.process(&mut buf);
            frames.push(buf[..num_bins].to_vec());
        }

        frames
    }

    /// Magnitude spectrogram, indexed `[frame][bin]`.
    pub fn magnitudes(&self, samples: &[f32]) -> Vec<Vec<f32>> {
        self.forward(samples)
            .into_iter()
            .map(|frame| frame.iter().map(|c| c.norm()).collect())
            .collect()
    }

    /// Weighted overlap-add inverse of [`Stft::forward`], trimmed to `len` samples.
    pub fn inverse(&self, spectrogram: &[Vec<Complex<f32>>], len: usize) -> Vec<f32> {
        let half = self.n_fft / 2;
        let num_bins = self.num_bins();
        let padded_len = len + self.n_fft;
        let norm = 1.0 / self.n_fft as f32;
        let mut out = vec![0.0f32; padded_len];
        let mut window_sum = vec![0.0f32; padded_len];
        let mut buf = vec![COMPLEX_ZERO; self.n_fft];

        for (t, frame) in spectrogram.iter().enumerate() {
            buf.fill(COMPLEX_ZERO);
            for bin in 0..num_bins.min(frame.len()) {
                buf[bin] = frame[bin];
                if bin > 0 && bin < num_bins - 1 {
                    buf[self.n_fft - bin] = frame[bin].conj();
                }
            }
            self.inverse.process(&mut buf);

            let pos = t * self.hop;
            for i in 0..self.n_fft {
                let idx = pos + i;
                if idx >= padded_len {
                    break;
                }
                out[idx] += buf[i].re * norm * self.window[i];
                window_sum[idx] += self.window[i] * self.window[i];
            }
        }

        let max_ws = window_sum.iter().copied().fold(0.0f32, f32::max);
        let min_ws = (max_ws * 0.01).max(1e-8);
        (0..len)
            .map(|i| out[i + half] / window_sum[i + half].max(min_ws))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_frame_count() {
        let stft = Stft::new(2048, 512);
        assert_eq!(stft.num_frames(0), 0);
        assert_eq!(stft.num_frames(1), 1);
        assert_eq!(stft.num_frames(22050), 44);
        assert_eq!(stft.num_bins(), 1025);
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let sr = 22050;
        let stft = Stft::new(2048, 512);
        let freq = stft.bin_frequency(93, sr);
        let samples: Vec<f32> = (0..sr as usize)
            .map(|i| (2.0 * core::f32::consts::PI * freq * i as f32 / sr as f32).sin())
            .collect();
        let mags = stft.magnitudes(&samples);
        let middle = &mags[mags.len() / 2];
        let peak = middle
            .iter()
            .enumerate()
            .fold((0, 0.0f32), |best, (i, &m)| if m > best.1 { (i, m) } else { best })
            .0;
        assert_eq!(peak, 93);
    }

    #[test]
    fn test_inverse_reconstructs() {
        let stft = Stft::new(1024, 256);
        let samples: Vec<f32> = (0..8000).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let spec = stft.forward(&samples);
        let rebuilt = stft.inverse(&spec, samples.len());
        assert_eq!(rebuilt.len(), samples.len());
        for i in (1000..7000).step_by(97) {
            assert_abs_diff_eq!(rebuilt[i], samples[i], epsilon = 1e-3);
        }
    }
}
