//! Rhythmic events, pitched notes and generated hooks.
//!
//! All timing is in sixteenth-note units; conversion to seconds or samples
//! happens only at render time once a tempo is known.

use crate::groove::GRID_STEPS;

/// A rhythmic onset before pitch assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Event {
    /// Grid position in [0, 16)
    pub position: u8,
    /// Length in sixteenths (1 or 2)
    pub duration: u8,
}

impl Event {
    /// Create an event, wrapping the position into one bar and flooring the
    /// duration at one sixteenth.
    pub fn new(position: u8, duration: u8) -> Self {
        Self {
            position: position % GRID_STEPS as u8,
            duration: duration.max(1),
        }
    }
}

/// A pitched note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Note {
    /// Start in sixteenths from the top of the hook
    pub onset: u32,
    /// Length in sixteenths (>= 1)
    pub duration: u32,
    /// MIDI note number
    pub pitch: u8,
}

impl Note {
    pub fn new(onset: u32, duration: u32, pitch: u8) -> Self {
        Self {
            onset,
            duration: duration.max(1),
            pitch,
        }
    }

    /// First sixteenth after the note ends, saturating at `u32::MAX`.
    pub fn end(&self) -> u32 {
        self.onset.saturating_add(self.duration)
    }

    /// Equal-temperament frequency in Hz.
    pub fn frequency(&self) -> f64 {
        midi_to_freq(self.pitch)
    }
}

/// One generated monophonic line.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Hook {
    /// Seed the hook was generated from
    pub seed: u64,
    /// Notes ordered by onset
    pub notes: Vec<Note>,
}

impl Hook {
    pub fn new(seed: u64, notes: Vec<Note>) -> Self {
        Self { seed, notes }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Sixteenth at which the last sounding note ends (0 when empty).
    pub fn length_sixteenths(&self) -> u32 {
        self.notes.iter().map(Note::end).max().unwrap_or(0)
    }

    /// Pitch of the closing note, if any.
    pub fn final_pitch(&self) -> Option<u8> {
        self.notes.last().map(|n| n.pitch)
    }
}

/// Convert MIDI note to frequency (A4 = MIDI 69 = 440 Hz).
pub fn midi_to_freq(note: u8) -> f64 {
    440.0 * 2.0f64.powf((note as f64 - 69.0) / 12.0)
}
