//! Dynamic-programming beat tracker.
//!
//! Finds the beat sequence that maximizes onset strength at the beats while
//! penalizing inter-beat gaps that stray from the target period:
//!
//! ```text
//! C(t) = local(t) + max_{g in [P/2, 2P]} ( C(t - g) - tightness * ln(g / P)^2 )
//! ```
//!
//! The best path is backtracked from the last salient peak of the cumulative
//! score, then weak beats at either end are dropped.

use tracing::debug;

/// Default transition tightness
pub const DEFAULT_TIGHTNESS: f64 = 100.0;

/// Beat-tracker settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatTrackerParams {
    /// How strongly gaps away from the period are penalized
    pub tightness: f64,
    /// Drop weak leading/trailing beats
    pub trim: bool,
}

impl Default for BeatTrackerParams {
    fn default() -> Self {
        Self {
            tightness: DEFAULT_TIGHTNESS,
            trim: true,
        }
    }
}

/// Period in envelope frames for a tempo.
pub fn period_frames(bpm: f64, frame_rate: f64) -> usize {
    if bpm <= 0.0 || !bpm.is_finite() {
        return 0;
    }
    (60.0 * frame_rate / bpm).round() as usize
}

/// Track beats through an onset-strength envelope.
///
/// Returns beat positions as envelope frame indices, strictly increasing.
/// An empty or flat envelope has no beats.
pub fn track_beats(
    envelope: &[f32],
    frame_rate: f64,
    bpm: f64,
    params: &BeatTrackerParams,
) -> Vec<usize> {
    let period = period_frames(bpm, frame_rate);
    if envelope.is_empty() || period == 0 || !envelope.iter().any(|v| *v > 0.0) {
        return Vec::new();
    }

    let local = local_score(envelope, period);
    let (backlink, cumulative) = dynamic_program(&local, period, params.tightness);

    let Some(last) = last_beat(&cumulative) else {
        return Vec::new();
    };

    let mut beats = vec![last];
    let mut current = last;
    while let Some(prev) = backlink[current] {
        beats.push(prev);
        current = prev;
    }
    beats.reverse();

    if params.trim {
        beats = trim_beats(&local, beats);
    }

    debug!("Tracked {} beats at period {} frames", beats.len(), period);
    beats
}

/// Envelope normalized by its standard deviation, smoothed by a Gaussian
/// whose width scales with the period.
fn local_score(envelope: &[f32], period: usize) -> Vec<f64> {
    let n = envelope.len() as f64;
    let mean = envelope.iter().map(|&v| v as f64).sum::<f64>() / n;
    let var = envelope
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    let std = var.sqrt();
    let scale = if std > 0.0 { 1.0 / std } else { 1.0 };

    let p = period as isize;
    let kernel: Vec<f64> = (-p..=p)
        .map(|i| (-0.5 * (i as f64 * 32.0 / period as f64).powi(2)).exp())
        .collect();

    let len = envelope.len() as isize;
    (0..len)
        .map(|t| {
            let mut acc = 0.0;
            for (k, w) in kernel.iter().enumerate() {
                let idx = t + k as isize - p;
                if idx >= 0 && idx < len {
                    acc += envelope[idx as usize] as f64 * scale * w;
                }
            }
            acc
        })
        .collect()
}

fn dynamic_program(
    local: &[f64],
    period: usize,
    tightness: f64,
) -> (Vec<Option<usize>>, Vec<f64>) {
    let max_gap = 2 * period;
    let min_gap = ((period as f64 / 2.0).round() as usize).max(1);
    let gaps: Vec<usize> = (min_gap..=max_gap).rev().collect();
    let penalties: Vec<f64> = gaps
        .iter()
        .map(|&g| -tightness * (g as f64 / period as f64).ln().powi(2))
        .collect();

    let local_max = local.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut backlink = vec![None; local.len()];
    let mut cumulative = vec![0.0; local.len()];
    let mut first_beat = true;

    for (i, &score) in local.iter().enumerate() {
        // Predecessors before the start contribute only their penalty
        let mut best_value = f64::NEG_INFINITY;
        let mut best_prev = None;
        for (&gap, &penalty) in gaps.iter().zip(penalties.iter()) {
            let (value, prev) = if gap <= i {
                (penalty + cumulative[i - gap], Some(i - gap))
            } else {
                (penalty, None)
            };
            if value > best_value {
                best_value = value;
                best_prev = prev;
            }
        }

        cumulative[i] = score + best_value;
        if first_beat && score < 0.01 * local_max {
            backlink[i] = None;
        } else {
            backlink[i] = best_prev;
            first_beat = false;
        }
    }

    (backlink, cumulative)
}

/// Last local maximum of the cumulative score that reaches half the median
/// of all local maxima.
fn last_beat(cumulative: &[f64]) -> Option<usize> {
    let n = cumulative.len();
    let is_peak = |i: usize| {
        let prev = if i == 0 { cumulative[0] } else { cumulative[i - 1] };
        let next = if i + 1 == n { cumulative[i] } else { cumulative[i + 1] };
        cumulative[i] > prev && cumulative[i] >= next
    };

    let peaks: Vec<usize> = (0..n).filter(|&i| is_peak(i)).collect();
    if peaks.is_empty() {
        return n.checked_sub(1);
    }

    let mut values: Vec<f64> = peaks.iter().map(|&i| cumulative[i]).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    let median = if values.len() % 2 == 1 {
        values[values.len() / 2]
    } else {
        (values[values.len() / 2 - 1] + values[values.len() / 2]) / 2.0
    };

    peaks
        .iter()
        .rev()
        .find(|&&i| cumulative[i] >= 0.5 * median)
        .copied()
}

/// Drop leading/trailing beats whose smoothed local score is at or below
/// half the RMS of the smoothed scores.
fn trim_beats(local: &[f64], beats: Vec<usize>) -> Vec<usize> {
    if beats.is_empty() {
        return beats;
    }

    const HANN5: [f64; 5] = [0.0, 0.5, 1.0, 0.5, 0.0];
    let values: Vec<f64> = beats.iter().map(|&b| local[b]).collect();
    let len = values.len() as isize;
    let smooth: Vec<f64> = (0..len)
        .map(|i| {
            HANN5
                .iter()
                .enumerate()
                .map(|(k, w)| {
                    let idx = i + k as isize - 2;
                    if idx >= 0 && idx < len {
                        values[idx as usize] * w
                    } else {
                        0.0
                    }
                })
                .sum()
        })
        .collect();

    let rms = (smooth.iter().map(|v| v * v).sum::<f64>() / smooth.len() as f64).sqrt();
    let threshold = 0.5 * rms;

    let mut start = 0;
    while start < smooth.len() && smooth[start] <= threshold {
        start += 1;
    }
    let mut end = smooth.len();
    while end > start && smooth[end - 1] <= threshold {
        end -= 1;
    }

    beats[start..end].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse_envelope(len: usize, period: usize, offset: usize) -> Vec<f32> {
        (0..len)
            .map(|i| if i >= offset && (i - offset) % period == 0 { 1.0 } else { 0.0 })
            .collect()
    }

    #[test]
    fn test_period_frames() {
        let fr = 22050.0 / 512.0;
        assert_eq!(period_frames(120.0, fr), 22);
        assert_eq!(period_frames(0.0, fr), 0);
        assert_eq!(period_frames(f64::NAN, fr), 0);
    }

    #[test]
    fn test_tracks_regular_pulses() {
        let fr = 22050.0 / 512.0;
        let period = 20;
        let bpm = 60.0 * fr / period as f64;
        let env = pulse_envelope(400, period, 5);

        let beats = track_beats(&env, fr, bpm, &BeatTrackerParams::default());
        assert!(beats.len() >= 15, "beats: {:?}", beats);
        for pair in beats.windows(2) {
            assert!(pair[1] > pair[0]);
            assert_eq!(pair[1] - pair[0], period);
        }
        for b in &beats {
            assert_eq!((b - 5) % period, 0);
        }
    }

    #[test]
    fn test_flat_envelope_has_no_beats() {
        let fr = 43.0;
        let params = BeatTrackerParams::default();
        assert!(track_beats(&[], fr, 120.0, &params).is_empty());
        assert!(track_beats(&vec![0.0; 300], fr, 120.0, &params).is_empty());
        assert!(track_beats(&vec![1.0; 300], fr, 0.0, &params).is_empty());
    }
}
