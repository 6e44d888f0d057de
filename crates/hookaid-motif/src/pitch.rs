//! Pitch assigner: a seeded random walk over scale degrees.
//!
//! Each event moves the walk one degree up or down with probability
//! `step_prob`, otherwise leaps by up to `max_leap` degrees. Pitches are
//! folded into the register by octaves and the last note always lands on
//! the tonic.

use hookaid_core::{Event, Note, Register, Scale};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random-walk settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkParams {
    /// Probability of a stepwise (±1 degree) move
    pub step_prob: f64,
    /// Largest leap in degrees, either direction
    pub max_leap: i32,
}

impl Default for WalkParams {
    fn default() -> Self {
        Self {
            step_prob: 0.8,
            max_leap: 4,
        }
    }
}

/// Maps a scale-step index to a MIDI pitch.
///
/// Step 0 is the root in its base octave; every seven steps add an octave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegreeMapper {
    root_midi: i32,
    degrees: &'static [u8; 7],
}

impl DegreeMapper {
    pub fn new(scale: &Scale) -> Self {
        Self {
            root_midi: scale.tonic_midi() as i32,
            degrees: scale.degrees(),
        }
    }

    pub fn pitch(&self, step: usize) -> i32 {
        let octave = (step / self.degrees.len()) as i32;
        let degree = self.degrees[step % self.degrees.len()] as i32;
        self.root_midi + 12 * octave + degree
    }
}

/// Assign a pitch to every event, in order.
///
/// Identical arguments always produce identical notes. Every pitch lies in
/// `register`, and the final pitch is the scale root fit into `register`.
pub fn assign_pitches(
    events: &[Event],
    scale: &Scale,
    register: Register,
    params: &WalkParams,
    seed: u64,
) -> Vec<Note> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mapper = DegreeMapper::new(scale);
    let step_prob = if params.step_prob.is_nan() {
        0.0
    } else {
        params.step_prob.clamp(0.0, 1.0)
    };
    let max_leap = params.max_leap.max(0);

    let mut idx: i64 = rng.gen_range(0..7);
    let mut notes: Vec<Note> = events
        .iter()
        .map(|event| {
            if rng.gen::<f64>() < step_prob {
                idx += if rng.gen_bool(0.5) { 1 } else { -1 };
            } else {
                idx += rng.gen_range(-max_leap..=max_leap) as i64;
            }
            idx = idx.max(0);
            let pitch = register.fit(mapper.pitch(idx as usize));
            Note::new(event.position as u32, event.duration as u32, pitch)
        })
        .collect();

    if let Some(last) = notes.last_mut() {
        last.pitch = register.fit(scale.tonic_midi() as i32);
    }
    notes
}
