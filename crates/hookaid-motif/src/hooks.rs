//! Hook-set generation: rhythm sampling followed by pitch assignment.

use crate::pitch::{assign_pitches, WalkParams};
use crate::rhythm::sample_rhythm;
use hookaid_core::{GenerationParams, GrooveHistogram, Hook, Scale};
use tracing::debug;

/// Generate one hook from `seed`.
///
/// The same seed drives both the rhythm draw and the pitch walk, so
/// identical inputs always give an identical hook. Out-of-range controls in
/// `params` are clamped rather than rejected.
pub fn generate_hook(
    hist: &GrooveHistogram,
    scale: &Scale,
    params: &GenerationParams,
    seed: u64,
) -> Hook {
    let params = params.clamped();
    let events = sample_rhythm(hist, params.density, params.syncopation, seed);
    let walk = WalkParams {
        step_prob: params.step_prob,
        max_leap: params.max_leap,
    };
    let notes = assign_pitches(&events, scale, params.register, &walk, seed);
    Hook::new(seed, notes)
}

/// Generate `params.hook_count` hooks seeded `0, 1, 2, ...`.
pub fn generate_hooks(
    hist: &GrooveHistogram,
    scale: &Scale,
    params: &GenerationParams,
) -> Vec<Hook> {
    let count = params.hook_count.max(1);
    debug!(
        "Generating {} hooks in {} (density {}, syncopation {:.2}, register {})",
        count, scale, params.density, params.syncopation, params.register
    );
    (0..count as u64)
        .map(|seed| generate_hook(hist, scale, params, seed))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookaid_core::{PitchClass, Quality, Register};

    #[test]
    fn test_default_hook_set() {
        let hooks = generate_hooks(
            &GrooveHistogram::uniform(),
            &Scale::default(),
            &GenerationParams::default(),
        );
        assert_eq!(hooks.len(), 5);
        for (i, hook) in hooks.iter().enumerate() {
            assert_eq!(hook.seed, i as u64);
            assert_eq!(hook.notes.len(), 7);
            // C minor tonic in the mid register
            assert_eq!(hook.final_pitch(), Some(60));
        }
    }

    #[test]
    fn test_hooks_are_reproducible() {
        let scale = Scale::new(PitchClass::E, Quality::Major);
        let params = GenerationParams {
            density: 10,
            register: Register::HIGH,
            ..Default::default()
        };
        let a = generate_hooks(&GrooveHistogram::uniform(), &scale, &params);
        let b = generate_hooks(&GrooveHistogram::uniform(), &scale, &params);
        assert_eq!(a, b);
        assert_eq!(a[2], generate_hook(&GrooveHistogram::uniform(), &scale, &params, 2));
    }

    #[test]
    fn test_seeds_differ() {
        let hooks = generate_hooks(
            &GrooveHistogram::uniform(),
            &Scale::default(),
            &GenerationParams::default(),
        );
        assert!(hooks.windows(2).any(|w| w[0].notes != w[1].notes));
    }

    #[test]
    fn test_out_of_range_params_clamped() {
        let params = GenerationParams {
            density: 99,
            syncopation: -3.0,
            hook_count: 0,
            ..Default::default()
        };
        let hooks = generate_hooks(&GrooveHistogram::uniform(), &Scale::default(), &params);
        assert_eq!(hooks.len(), 1);
        assert_eq!(hooks[0].notes.len(), 16);
    }

    #[test]
    fn test_notes_ordered_within_bar() {
        let hook = generate_hook(
            &GrooveHistogram::uniform(),
            &Scale::default(),
            &GenerationParams::default(),
            3,
        );
        assert!(hook.notes.windows(2).all(|w| w[0].onset < w[1].onset));
        assert!(hook.notes.iter().all(|n| n.onset < 16));
        assert!(hook.length_sixteenths() <= 17);
    }
}
