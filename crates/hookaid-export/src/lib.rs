//! # Hook Aid Export
//!
//! Turns generated hooks into files.
//!
//! - **Rendering**: additive sine tones with linear attack/release envelopes
//!   on a sixteenth-note grid, plus equal-weight mixdown
//! - **Format encoding**: 16-bit mono WAV, Standard MIDI File (format 0 and 1)
//!
//! ## Example
//!
//! ```rust
//! use hookaid_core::Note;
//! use hookaid_export::render;
//!
//! let notes = [Note::new(0, 1, 60), Note::new(4, 2, 67)];
//! let pcm = render(&notes, 120.0, 22050);
//! // One sixteenth past the last note end (7 * 0.125 s)
//! assert_eq!(pcm.len(), 19294);
//! ```
//!
//! ## Feature Flags
//!
//! - `wav` (default): WAV export via hound (pure Rust)
//! - `midi` (default): MIDI export via midly

pub mod error;
pub mod format;
mod options;
pub mod renderer;

pub use error::{ExportError, Result};
pub use options::RenderOptions;
pub use renderer::{mix_down, render, render_mix, sixteenth_seconds, Renderer};

#[cfg(feature = "wav")]
pub use format::wav::{
    encode_wav_mono_file, encode_wav_mono_memory, hooks_to_wav_bytes, notes_to_wav_bytes,
};

#[cfg(feature = "midi")]
pub use format::midi::{hooks_to_midi_bytes, notes_to_midi_bytes, write_multi_track};
