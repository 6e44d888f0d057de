//! Groove histogram: onset density over a one-bar sixteenth-note grid.

/// Sixteenth-note steps in one 4/4 bar.
pub const GRID_STEPS: usize = 16;

const UNIFORM_WEIGHT: f64 = 1.0 / GRID_STEPS as f64;

/// Normalized onset-density weights, one per sixteenth-note step.
///
/// Invariant: every weight is non-negative and the weights sum to 1.
/// Degenerate input (no counts, negative or non-finite values) yields the
/// uniform distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct GrooveHistogram {
    weights: [f64; GRID_STEPS],
}

impl GrooveHistogram {
    /// Every step weighted 1/16.
    pub fn uniform() -> Self {
        Self {
            weights: [UNIFORM_WEIGHT; GRID_STEPS],
        }
    }

    /// Normalize raw per-step counts into a distribution.
    pub fn from_counts(counts: [f64; GRID_STEPS]) -> Self {
        if counts.iter().any(|c| !c.is_finite() || *c < 0.0) {
            return Self::uniform();
        }
        let total: f64 = counts.iter().sum();
        if total <= 0.0 {
            return Self::uniform();
        }
        let mut weights = counts;
        for w in weights.iter_mut() {
            *w /= total;
        }
        Self { weights }
    }

    /// Weights indexed by step.
    pub fn weights(&self) -> &[f64; GRID_STEPS] {
        &self.weights
    }

    /// Weight at `step` (wrapped modulo one bar).
    pub fn get(&self, step: usize) -> f64 {
        self.weights[step % GRID_STEPS]
    }

    /// Mean weight. Always 1/16 for a normalized histogram.
    pub fn mean(&self) -> f64 {
        self.weights.iter().sum::<f64>() / GRID_STEPS as f64
    }

    pub fn is_uniform(&self) -> bool {
        self.weights
            .iter()
            .all(|w| (w - UNIFORM_WEIGHT).abs() < 1e-12)
    }

    /// Step with the highest weight (lowest index wins ties).
    pub fn strongest_step(&self) -> usize {
        let mut best = 0;
        for (i, &w) in self.weights.iter().enumerate() {
            if w > self.weights[best] {
                best = i;
            }
        }
        best
    }
}

impl Default for GrooveHistogram {
    fn default() -> Self {
        Self::uniform()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_uniform() {
        let hist = GrooveHistogram::uniform();
        assert!(hist.is_uniform());
        assert_relative_eq!(hist.weights().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(hist.get(3), 1.0 / 16.0);
    }

    #[test]
    fn test_from_counts_normalizes() {
        let mut counts = [0.0; GRID_STEPS];
        counts[0] = 3.0;
        counts[4] = 1.0;
        let hist = GrooveHistogram::from_counts(counts);
        assert_relative_eq!(hist.get(0), 0.75);
        assert_relative_eq!(hist.get(4), 0.25);
        assert_relative_eq!(hist.get(20), 0.25);
        assert_eq!(hist.strongest_step(), 0);
    }

    #[test]
    fn test_degenerate_counts_fall_back_to_uniform() {
        assert!(GrooveHistogram::from_counts([0.0; GRID_STEPS]).is_uniform());

        let mut negative = [1.0; GRID_STEPS];
        negative[2] = -1.0;
        assert!(GrooveHistogram::from_counts(negative).is_uniform());

        let mut nan = [1.0; GRID_STEPS];
        nan[7] = f64::NAN;
        assert!(GrooveHistogram::from_counts(nan).is_uniform());
    }

    proptest! {
        #[test]
        fn prop_histogram_sums_to_one(counts in prop::array::uniform16(0.0f64..100.0)) {
            let hist = GrooveHistogram::from_counts(counts);
            let total: f64 = hist.weights().iter().sum();
            prop_assert!((total - 1.0).abs() < 1e-6);
            prop_assert!(hist.weights().iter().all(|w| *w >= 0.0));
        }
    }
}
