//! Test helpers and fixtures for Hook Aid integration tests
//!
//! Synthetic loops are built on the analysis frame grid (512-sample hop at
//! 22050 Hz) so their beat period is a whole number of onset frames.
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): Exact operations (mixing identical buffers)
//! - `INT16_EPSILON`: one 16-bit quantization step
//! - `TEMPO_TOLERANCE_BPM`: frame-quantized tempo estimates

#![allow(dead_code)]

pub mod tolerances;

use std::io::Cursor;

/// Analysis sample rate
pub const TEST_SAMPLE_RATE: u32 = 22050;

/// Onset-envelope hop in samples
pub const HOP: usize = 512;

/// 21 hops per beat, about 123 BPM at 22050 Hz
pub const BEAT_FRAMES: usize = 21;

/// Tempo of a loop built with [`BEAT_FRAMES`] hops per beat.
pub fn grid_bpm(sample_rate: u32) -> f64 {
    60.0 * sample_rate as f64 / (BEAT_FRAMES * HOP) as f64
}

/// Generate a test signal: sine wave at given frequency for specified samples.
pub fn generate_sine(frequency: f64, sample_rate: u32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            (2.0 * std::f64::consts::PI * frequency * t).sin() as f32
        })
        .collect()
}

/// Sum of equal-amplitude sines.
pub fn generate_chord(frequencies: &[f64], sample_rate: u32, num_samples: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; num_samples];
    for &f in frequencies {
        for (o, s) in out.iter_mut().zip(generate_sine(f, sample_rate, num_samples)) {
            *o += 0.2 * s;
        }
    }
    out
}

/// Generate white noise (random samples in -1..1).
pub fn generate_noise(num_samples: usize, seed: u64) -> Vec<f32> {
    // Simple LCG for reproducible "random" noise
    let mut rng = seed;
    (0..num_samples)
        .map(|_| {
            rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((rng >> 33) as f32 / u32::MAX as f32) * 4.0 - 1.0
        })
        .collect()
}

/// Exponentially decaying noise burst, like a closed drum hit.
pub fn drum_hit(length: usize, amplitude: f32, seed: u64) -> Vec<f32> {
    generate_noise(length, seed)
        .into_iter()
        .enumerate()
        .map(|(i, s)| amplitude * s * (-(i as f32) / 400.0).exp())
        .collect()
}

/// Drum loop with one hit every `period` samples, accented on beats 1 and 3.
pub fn click_loop(beats: usize, period: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; beats * period];
    for beat in 0..beats {
        let amplitude = if beat % 2 == 0 { 0.9 } else { 0.6 };
        let hit = drum_hit(2000, amplitude, beat as u64 + 1);
        let start = beat * period;
        for (o, h) in out[start..].iter_mut().zip(hit) {
            *o += h;
        }
    }
    out
}

/// Encode mono samples as 16-bit WAV bytes.
pub fn wav_bytes(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut buffer = Vec::new();
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut buffer), spec).unwrap();
        for &s in samples {
            writer
                .write_sample((s.clamp(-1.0, 1.0) * 32767.0) as i16)
                .unwrap();
        }
        writer.finalize().unwrap();
    }
    buffer
}

/// Decode 16-bit WAV bytes.
pub fn decode_wav(bytes: &[u8]) -> (hound::WavSpec, Vec<i16>) {
    let reader = hound::WavReader::new(Cursor::new(bytes)).expect("valid WAV");
    let spec = reader.spec();
    let samples = reader
        .into_samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .expect("16-bit samples");
    (spec, samples)
}

/// Calculate RMS of a signal.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Calculate peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f32, |a, b| a.max(b))
}

/// Check if two signals are approximately equal within tolerance.
pub fn signals_approx_equal(a: &[f32], b: &[f32], tolerance: f32) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= tolerance)
}
