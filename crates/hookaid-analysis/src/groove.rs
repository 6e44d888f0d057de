//! Groove extraction: beat subdivision and the 16-step onset histogram.

use crate::onset::onset_times;
use crate::tempo::estimate_bpm_and_beats;
use hookaid_core::{GrooveHistogram, Signal, GRID_STEPS};
use tracing::{debug, warn};

/// Sixteenth-note subdivision of a beat.
pub const DEFAULT_SUBDIVISION: usize = 4;

/// Tempo, beat grid and groove of one loop.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct GrooveAnalysis {
    /// Estimated tempo, always > 0
    pub bpm: f64,
    /// Beat times in seconds, strictly increasing
    pub beats: Vec<f64>,
    /// Sixteenth-note tick times, `4 * (beats - 1)` of them
    pub ticks: Vec<f64>,
    /// Onset times in seconds
    pub onsets: Vec<f64>,
    pub histogram: GrooveHistogram,
}

/// Evenly subdivide each beat interval into `subdiv` ticks, starting at the
/// first beat of the pair. Fewer than two beats yield no ticks.
pub fn ticks_from_beats(beat_times: &[f64], subdiv: usize) -> Vec<f64> {
    if beat_times.len() < 2 || subdiv == 0 {
        return Vec::new();
    }
    let mut ticks = Vec::with_capacity(subdiv * (beat_times.len() - 1));
    for pair in beat_times.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let step = (end - start) / subdiv as f64;
        ticks.extend((0..subdiv).map(|k| start + k as f64 * step));
    }
    ticks
}

/// Index of the tick nearest to `time`. Ties resolve to the earlier tick.
/// `ticks` must be sorted and non-empty.
fn nearest_tick(ticks: &[f64], time: f64) -> usize {
    let upper = ticks.partition_point(|&t| t < time);
    if upper == 0 {
        return 0;
    }
    if upper == ticks.len() {
        return ticks.len() - 1;
    }
    let lower = upper - 1;
    if (time - ticks[lower]).abs() <= (ticks[upper] - time).abs() {
        lower
    } else {
        upper
    }
}

/// Fold onset times onto the tick grid modulo one bar and normalize.
///
/// No ticks or no onsets yields the uniform histogram.
pub fn histogram_from_onsets(onsets: &[f64], ticks: &[f64]) -> GrooveHistogram {
    if ticks.is_empty() || onsets.is_empty() {
        return GrooveHistogram::uniform();
    }
    let mut counts = [0.0; GRID_STEPS];
    for &time in onsets {
        counts[nearest_tick(ticks, time) % GRID_STEPS] += 1.0;
    }
    GrooveHistogram::from_counts(counts)
}

/// Detect onsets in the signal and build the groove histogram over `ticks`.
pub fn groove_histogram(signal: &Signal, ticks: &[f64]) -> GrooveHistogram {
    if ticks.is_empty() {
        return GrooveHistogram::uniform();
    }
    histogram_from_onsets(&onset_times(signal), ticks)
}

/// Run the full groove pipeline on a loaded signal.
pub fn analyze_groove(signal: &Signal) -> GrooveAnalysis {
    let (bpm, beats) = estimate_bpm_and_beats(signal);
    let ticks = ticks_from_beats(&beats, DEFAULT_SUBDIVISION);
    let onsets = if ticks.is_empty() {
        Vec::new()
    } else {
        onset_times(signal)
    };
    let histogram = histogram_from_onsets(&onsets, &ticks);

    if histogram.is_uniform() {
        warn!(
            "Groove histogram is uniform ({} beats, {} onsets)",
            beats.len(),
            onsets.len()
        );
    } else {
        debug!(
            "Groove: {:.1} BPM, {} beats, {} onsets, strongest step {}",
            bpm,
            beats.len(),
            onsets.len(),
            histogram.strongest_step()
        );
    }

    GrooveAnalysis {
        bpm,
        beats,
        ticks,
        onsets,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_ticks_from_beats() {
        let ticks = ticks_from_beats(&[0.0, 1.0, 3.0], 4);
        assert_eq!(ticks.len(), 8);
        assert_relative_eq!(ticks[1], 0.25);
        assert_relative_eq!(ticks[4], 1.0);
        assert_relative_eq!(ticks[7], 2.5);
        assert!(ticks_from_beats(&[1.0], 4).is_empty());
        assert!(ticks_from_beats(&[], 4).is_empty());
    }

    #[test]
    fn test_nearest_tick() {
        let ticks = [0.0, 0.25, 0.5, 0.75];
        assert_eq!(nearest_tick(&ticks, -1.0), 0);
        assert_eq!(nearest_tick(&ticks, 0.3), 1);
        assert_eq!(nearest_tick(&ticks, 0.125), 0);
        assert_eq!(nearest_tick(&ticks, 0.45), 2);
        assert_eq!(nearest_tick(&ticks, 9.0), 3);
    }

    #[test]
    fn test_histogram_wraps_bars() {
        let beats: Vec<f64> = (0..9).map(|i| i as f64 * 0.5).collect();
        let ticks = ticks_from_beats(&beats, 4);
        assert_eq!(ticks.len(), 32);
        // Downbeats of bar one and two, plus one off-beat sixteenth
        let onsets = [0.0, 2.0, 0.125 * 3.0];
        let hist = histogram_from_onsets(&onsets, &ticks);
        assert_relative_eq!(hist.get(0), 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(hist.get(3), 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_inputs_are_uniform() {
        assert!(histogram_from_onsets(&[], &[0.0, 0.1]).is_uniform());
        assert!(histogram_from_onsets(&[0.5], &[]).is_uniform());
        assert!(groove_histogram(&Signal::empty(22050), &[]).is_uniform());

        let analysis = analyze_groove(&Signal::empty(22050));
        assert_eq!(analysis.bpm, 120.0);
        assert!(analysis.histogram.is_uniform());
    }

    proptest! {
        #[test]
        fn prop_tick_count(beats in prop::collection::vec(0.01f64..2.0, 0..20)) {
            let times: Vec<f64> = beats
                .iter()
                .scan(0.0, |acc, d| { *acc += d; Some(*acc) })
                .collect();
            let ticks = ticks_from_beats(&times, 4);
            let expected = if times.len() < 2 { 0 } else { 4 * (times.len() - 1) };
            prop_assert_eq!(ticks.len(), expected);
            prop_assert!(ticks.windows(2).all(|w| w[1] > w[0]));
        }

        #[test]
        fn prop_histogram_normalized(
            onsets in prop::collection::vec(0.0f64..8.0, 1..64),
            beat_count in 2usize..20,
        ) {
            let beats: Vec<f64> = (0..beat_count).map(|i| i as f64 * 0.5).collect();
            let ticks = ticks_from_beats(&beats, 4);
            let hist = histogram_from_onsets(&onsets, &ticks);
            let total: f64 = hist.weights().iter().sum();
            prop_assert!((total - 1.0).abs() < 1e-6);
            prop_assert!(hist.weights().iter().all(|w| *w >= 0.0));
        }
    }
}
