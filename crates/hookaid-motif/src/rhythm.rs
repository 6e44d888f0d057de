//! Rhythm sampler: groove-weighted onsets for one bar.

use hookaid_core::config::MAX_DENSITY;
use hookaid_core::{Event, GrooveHistogram, GRID_STEPS};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Chance that an onset lasts an eighth instead of a sixteenth
pub const LONG_NOTE_PROB: f64 = 0.25;

/// Groove weights with `syncopation * mean` added to every off-beat
/// sixteenth (odd steps), renormalized. Degenerate sums become uniform.
pub fn syncopated_weights(hist: &GrooveHistogram, syncopation: f64) -> [f64; GRID_STEPS] {
    let syncopation = if syncopation.is_nan() {
        0.0
    } else {
        syncopation.clamp(0.0, 1.0)
    };

    let mut weights = *hist.weights();
    let boost = syncopation * hist.mean();
    for w in weights.iter_mut().skip(1).step_by(2) {
        *w += boost;
    }

    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return [1.0 / GRID_STEPS as f64; GRID_STEPS];
    }
    for w in weights.iter_mut() {
        *w /= total;
    }
    weights
}

/// Draw `density` distinct grid steps (at most 16) weighted by the groove,
/// sorted ascending, each lasting one or two sixteenths.
///
/// Identical arguments always produce identical events.
pub fn sample_rhythm(
    hist: &GrooveHistogram,
    density: usize,
    syncopation: f64,
    seed: u64,
) -> Vec<Event> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut weights = syncopated_weights(hist, syncopation);
    let count = density.min(MAX_DENSITY);

    let mut positions = Vec::with_capacity(count);
    for _ in 0..count {
        let step = match WeightedIndex::new(weights.iter().copied()) {
            Ok(dist) => dist.sample(&mut rng),
            Err(_) => {
                // Remaining weight is zero; pick uniformly among unused steps
                let remaining: Vec<usize> =
                    (0..GRID_STEPS).filter(|s| !positions.contains(s)).collect();
                remaining[rng.gen_range(0..remaining.len())]
            }
        };
        weights[step] = 0.0;
        positions.push(step);
    }
    positions.sort_unstable();

    positions
        .into_iter()
        .map(|step| {
            let duration = if rng.gen::<f64>() < LONG_NOTE_PROB { 2 } else { 1 };
            Event::new(step as u8, duration)
        })
        .collect()
}
