//! Tempo estimation and beat tracking with double-time correction.
//!
//! ## Algorithm
//!
//! 1. Onset-strength envelope of the signal
//! 2. Tempo candidates from windowed autocorrelation of the envelope, each
//!    weighted by a log-normal prior around 120 BPM
//! 3. The lowest candidate within 60..=160 BPM becomes the tempo guess,
//!    otherwise the whole-envelope estimate
//! 4. A refined estimate whose prior is centred on the guess, and beat
//!    tracking at that refined tempo
//! 5. Shuffle (3:2) and straight (2:1) double-time correction
//! 6. Beat tracking at the whole-envelope estimate when fewer than two beats
//!    remain

use crate::beat::{track_beats, BeatTrackerParams};
use crate::onset::OnsetDetector;
use hookaid_core::Signal;
use tracing::{debug, warn};

/// Tempo reported when nothing better is available
pub const DEFAULT_BPM: f64 = 120.0;

/// Slowest tempo the autocorrelation considers
pub const MIN_TEMPO: f64 = 30.0;

/// Fastest tempo the autocorrelation considers
pub const MAX_TEMPO: f64 = 320.0;

/// Tempo guesses inside this range are preferred
pub const PLAUSIBLE_TEMPO: std::ops::RangeInclusive<f64> = 60.0..=160.0;

/// Envelope frames per local tempo window (~8.9 s at 22050 Hz / 512 hop)
const TEMPO_WINDOW: usize = 384;

/// Frames between local tempo windows
const TEMPO_WINDOW_HOP: usize = 64;

/// Weight of `bpm` under a one-octave log-normal prior centred on `start_bpm`.
fn tempo_prior(bpm: f64, start_bpm: f64) -> f64 {
    (-0.5 * (bpm / start_bpm).log2().powi(2)).exp()
}

/// Autocorrelation of the mean-removed sequence for lags `0..=max_lag`.
fn autocorrelate(values: &[f64], max_lag: usize) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let centred: Vec<f64> = values.iter().map(|v| v - mean).collect();
    (0..=max_lag.min(n - 1))
        .map(|lag| {
            centred[..n - lag]
                .iter()
                .zip(centred[lag..].iter())
                .map(|(a, b)| a * b)
                .sum()
        })
        .collect()
}

/// Most likely tempo for an envelope segment, or `None` when the segment
/// shows no positive periodicity in the 30..=320 BPM range.
fn tempo_from_segment(segment: &[f64], frame_rate: f64, start_bpm: f64) -> Option<f64> {
    let max_lag = (60.0 * frame_rate / MIN_TEMPO).floor() as usize;
    let acf = autocorrelate(segment, max_lag);

    let mut best: Option<(f64, f64)> = None;
    for (lag, &value) in acf.iter().enumerate().skip(1) {
        let bpm = 60.0 * frame_rate / lag as f64;
        if !(MIN_TEMPO..=MAX_TEMPO).contains(&bpm) || value <= 0.0 {
            continue;
        }
        let score = value * tempo_prior(bpm, start_bpm);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((bpm, score));
        }
    }
    best.map(|(bpm, _)| bpm)
}

/// Whole-envelope tempo estimate with a prior centred on `start_bpm`.
pub fn estimate_tempo(envelope: &[f32], frame_rate: f64, start_bpm: f64) -> Option<f64> {
    let values: Vec<f64> = envelope.iter().map(|&v| v as f64).collect();
    tempo_from_segment(&values, frame_rate, start_bpm)
}

/// Local tempo estimates over Hann-windowed envelope segments.
///
/// Envelopes shorter than one window yield a single estimate.
pub fn tempo_candidates(envelope: &[f32], frame_rate: f64) -> Vec<f64> {
    if envelope.is_empty() {
        return Vec::new();
    }
    let window_len = TEMPO_WINDOW.min(envelope.len());
    let window: Vec<f64> = (0..window_len)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / window_len as f64;
            0.5 * (1.0 - angle.cos())
        })
        .collect();

    let mut candidates = Vec::new();
    let mut start = 0;
    loop {
        let segment: Vec<f64> = envelope[start..start + window_len]
            .iter()
            .zip(window.iter())
            .map(|(&v, w)| v as f64 * w)
            .collect();
        if let Some(bpm) = tempo_from_segment(&segment, frame_rate, DEFAULT_BPM) {
            candidates.push(bpm);
        }
        if start + window_len >= envelope.len() {
            break;
        }
        start = (start + TEMPO_WINDOW_HOP).min(envelope.len() - window_len);
    }
    candidates
}

/// Lowest candidate inside the plausible range, else `global`, else 120.
pub fn select_tempo_guess(candidates: &[f64], global: Option<f64>) -> f64 {
    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let guess = sorted
        .into_iter()
        .find(|c| PLAUSIBLE_TEMPO.contains(c))
        .or(global)
        .unwrap_or(DEFAULT_BPM);
    if guess > 0.0 && guess.is_finite() {
        guess
    } else {
        DEFAULT_BPM
    }
}

/// Undo double-time tracking errors.
///
/// With at least four beats, a refined/guess ratio in [1.4, 1.6] (shuffle)
/// keeps every other beat and divides the tempo by 1.5; a ratio in
/// [1.9, 2.1] keeps every other beat and divides by 2.
pub fn correct_double_time(guess: f64, refined: f64, beats: Vec<f64>) -> (f64, Vec<f64>) {
    let ratio = if guess != 0.0 { refined / guess } else { 1.0 };
    if beats.len() < 4 {
        return (refined, beats);
    }

    let divisor = if (1.4..=1.6).contains(&ratio) {
        1.5
    } else if (1.9..=2.1).contains(&ratio) {
        2.0
    } else {
        return (refined, beats);
    };

    debug!("Double-time correction: ratio {:.3}, dividing by {}", ratio, divisor);
    let halved = beats.into_iter().step_by(2).collect();
    (refined / divisor, halved)
}

/// Beat times in seconds, tracked at `bpm`.
fn track_at(envelope: &[f32], detector: &OnsetDetector, bpm: f64) -> Vec<f64> {
    let frame_rate = detector.frame_rate();
    track_beats(envelope, frame_rate, bpm, &BeatTrackerParams::default())
        .into_iter()
        .map(|frame| detector.frame_to_time(frame))
        .collect()
}

/// Beat tracking on a precomputed envelope. Returns the tempo estimate with
/// a prior at `start_bpm` and the beats tracked at that estimate (or at
/// `start_bpm` when there is none).
fn beat_track(
    envelope: &[f32],
    detector: &OnsetDetector,
    start_bpm: f64,
) -> (Option<f64>, Vec<f64>) {
    let refined = estimate_tempo(envelope, detector.frame_rate(), start_bpm);
    let beats = track_at(envelope, detector, refined.unwrap_or(start_bpm));
    (refined, beats)
}

/// Tempo and beats for an envelope given the tempo guess and the
/// whole-envelope estimate. The returned beats are always tracked at the
/// returned tempo, or at its double before double-time correction.
fn tempo_and_beats(
    envelope: &[f32],
    detector: &OnsetDetector,
    guess: f64,
    global: Option<f64>,
) -> (f64, Vec<f64>) {
    let (refined, beats) = beat_track(envelope, detector, guess);
    let refined = refined.unwrap_or(guess);
    let (mut bpm, mut beats) = correct_double_time(guess, refined, beats);

    if beats.len() < 2 {
        let fallback = global
            .filter(|b| *b > 0.0 && b.is_finite())
            .unwrap_or(DEFAULT_BPM);
        warn!("Fewer than two beats tracked, retrying at {:.2} BPM", fallback);
        beats = track_at(envelope, detector, fallback);
        bpm = fallback;
    }
    (bpm, beats)
}

/// Estimate tempo (BPM) and beat times (seconds) for a loaded signal.
///
/// Never fails: an empty or silent signal yields `(120.0, [])`.
pub fn estimate_bpm_and_beats(signal: &Signal) -> (f64, Vec<f64>) {
    if signal.is_empty() || signal.sample_rate == 0 {
        warn!("Empty signal, defaulting to {} BPM", DEFAULT_BPM);
        return (DEFAULT_BPM, Vec::new());
    }

    let detector = OnsetDetector::new(signal.sample_rate);
    let envelope = detector.envelope(&signal.samples);
    let frame_rate = detector.frame_rate();

    let candidates = tempo_candidates(&envelope, frame_rate);
    let global = estimate_tempo(&envelope, frame_rate, DEFAULT_BPM);
    let guess = select_tempo_guess(&candidates, global);
    debug!(
        "Tempo candidates {:?}, global {:?}, guess {:.2}",
        candidates, global, guess
    );

    let (mut bpm, beats) = tempo_and_beats(&envelope, &detector, guess, global);
    if bpm <= 0.0 || !bpm.is_finite() {
        bpm = DEFAULT_BPM;
    }
    debug!("Tempo {:.2} BPM, {} beats", bpm, beats.len());
    (bpm, beats)
}
