//! Signal loader: encoded bytes to a trimmed, loudness-normalized mono signal.
//!
//! ## Pipeline
//!
//! 1. Decode with symphonia (any default codec plus MP3), averaging channels
//! 2. Resample to the analysis rate with rubato
//! 3. Trim leading/trailing frames more than `top_db` below the loudest frame
//! 4. Scale so the RMS equals `target_rms`
//!
//! [`load_signal`] never fails: undecodable input becomes a zero-length
//! signal so downstream analyzers take their degenerate-input fallbacks.

use crate::error::{AnalysisError, Result};
use crate::resample::resample_mono;
use hookaid_core::signal::SILENCE_FLOOR;
use hookaid_core::{Signal, DEFAULT_SAMPLE_RATE};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Frame length used for silence trimming.
const TRIM_FRAME_LENGTH: usize = 2048;
/// Hop used for silence trimming.
const TRIM_HOP: usize = 512;
/// Amplitude floor for the dB comparison (-100 dBFS).
const TRIM_AMIN: f64 = 1e-5;

/// Loader settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct LoaderConfig {
    /// Output sample rate in Hz
    pub target_sample_rate: u32,
    /// Trim threshold in dB below the loudest frame
    pub top_db: f64,
    /// RMS level the trimmed signal is scaled to
    pub target_rms: f64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: DEFAULT_SAMPLE_RATE,
            top_db: 30.0,
            target_rms: 0.1,
        }
    }
}

impl LoaderConfig {
    pub fn validate(&self) -> hookaid_core::Result<()> {
        if self.target_sample_rate < 8000 || self.target_sample_rate > 192_000 {
            return Err(hookaid_core::Error::InvalidConfig(format!(
                "target_sample_rate {} out of range (8000-192000 Hz)",
                self.target_sample_rate
            )));
        }
        if self.top_db.is_nan() || self.top_db <= 0.0 {
            return Err(hookaid_core::Error::InvalidConfig(format!(
                "top_db {} must be positive",
                self.top_db
            )));
        }
        if self.target_rms.is_nan() || self.target_rms <= 0.0 || self.target_rms > 1.0 {
            return Err(hookaid_core::Error::InvalidConfig(format!(
                "target_rms {} out of range (0.0-1.0]",
                self.target_rms
            )));
        }
        Ok(())
    }
}

/// Decoded audio before any processing.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Mono samples (channels averaged)
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Channel count of the source
    pub channels: usize,
}

/// Decode an in-memory audio file to mono.
pub fn try_decode(bytes: &[u8]) -> Result<DecodedAudio> {
    if bytes.is_empty() {
        return Err(AnalysisError::EmptyAudio);
    }

    let cursor = Cursor::new(bytes.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let probed = symphonia::default::get_probe().format(
        &Hint::new(),
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| AnalysisError::Decode("no audio track found".into()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| AnalysisError::Decode("unknown sample rate".into()))?;

    let mut decoder =
        symphonia::default::get_codecs().make(&codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();
    let mut channels = codec_params.channels.map(|c| c.count()).unwrap_or(1);

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                warn!("Skipping undecodable packet: {}", e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        channels = spec.channels.count().max(1);
        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);
        for frame in buf.samples().chunks(channels) {
            samples.push(frame.iter().sum::<f32>() / channels as f32);
        }
    }

    if samples.is_empty() {
        return Err(AnalysisError::EmptyAudio);
    }

    debug!(
        "Decoded {} frames at {} Hz ({} channels)",
        samples.len(),
        sample_rate,
        channels
    );

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// Decode, resample, trim and normalize. Fails only on decode/resample errors.
pub fn try_load_signal(bytes: &[u8], config: &LoaderConfig) -> Result<Signal> {
    let decoded = try_decode(bytes)?;
    let resampled = resample_mono(
        &decoded.samples,
        decoded.sample_rate,
        config.target_sample_rate,
    )?;
    let trimmed = trim_silence(&resampled, config.top_db);
    let normalized = normalize_rms(trimmed, config.target_rms);
    Ok(Signal::new(normalized, config.target_sample_rate))
}

/// Never-failing loader: any error yields a zero-length signal.
pub fn load_signal(bytes: &[u8], config: &LoaderConfig) -> Signal {
    match try_load_signal(bytes, config) {
        Ok(signal) => signal,
        Err(e) => {
            warn!("Could not load audio, continuing with an empty signal: {}", e);
            Signal::empty(config.target_sample_rate)
        }
    }
}

/// RMS of each centred, zero-padded frame.
fn frame_rms(samples: &[f32], frame_length: usize, hop: usize) -> Vec<f64> {
    let half = frame_length / 2;
    let num_frames = 1 + samples.len() / hop;
    (0..num_frames)
        .map(|t| {
            let centre = t * hop;
            let start = centre.saturating_sub(half);
            let end = (centre + half).min(samples.len());
            let sum_sq: f64 = samples[start.min(end)..end]
                .iter()
                .map(|&s| (s as f64) * (s as f64))
                .sum();
            (sum_sq / frame_length as f64).sqrt()
        })
        .collect()
}

/// Drop leading and trailing frames quieter than `top_db` below the loudest
/// frame. An all-silent signal is returned unchanged.
pub fn trim_silence(samples: &[f32], top_db: f64) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }

    let rms = frame_rms(samples, TRIM_FRAME_LENGTH, TRIM_HOP);
    let reference = rms.iter().copied().fold(0.0f64, f64::max).max(TRIM_AMIN);
    let threshold = 10f64.powf(-top_db / 20.0);
    let loud = |r: f64| r.max(TRIM_AMIN) / reference > threshold;

    let first = rms.iter().position(|&r| loud(r));
    let last = rms.iter().rposition(|&r| loud(r));

    match (first, last) {
        (Some(first), Some(last)) => {
            let start = (first * TRIM_HOP).min(samples.len());
            let end = ((last + 1) * TRIM_HOP).min(samples.len());
            debug!("Trimmed to samples {}..{} of {}", start, end, samples.len());
            samples[start..end.max(start)].to_vec()
        }
        _ => samples.to_vec(),
    }
}

/// Scale to `target_rms`, clipping to [-1, 1].
pub fn normalize_rms(mut samples: Vec<f32>, target_rms: f64) -> Vec<f32> {
    if samples.is_empty() {
        return samples;
    }
    let mean_sq =
        samples.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>() / samples.len() as f64;
    let gain = target_rms / (mean_sq.sqrt() + SILENCE_FLOOR as f64);
    for s in samples.iter_mut() {
        *s = ((*s as f64) * gain).clamp(-1.0, 1.0) as f32;
    }
    samples
}
