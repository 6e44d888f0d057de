//! # Hook Aid Core
//!
//! Domain types shared by every Hook Aid subsystem.
//!
//! - [`Signal`]: mono floating-point audio at a fixed sample rate
//! - [`GrooveHistogram`]: 16-step onset-density distribution over one 4/4 bar
//! - [`Event`] / [`Note`] / [`Hook`]: rhythmic onsets, pitched notes and generated lines
//! - [`Scale`] / [`ScaleTemplate`]: root + quality, and the read-only template bank
//! - [`Register`]: inclusive MIDI pitch range a hook is folded into
//! - [`GenerationParams`]: validated user-facing generation controls
//!
//! No I/O happens here; the crate only defines data and its invariants.
//!
//! ## Example
//!
//! ```rust
//! use hookaid_core::{Register, Scale, list_available_scales};
//!
//! let scale: Scale = "Bb minor".parse().unwrap();
//! assert_eq!(scale.to_string(), "A# minor");
//! assert_eq!(Register::MID.fit(scale.tonic_midi() as i32), 70);
//! assert_eq!(list_available_scales().len(), 24);
//! ```

pub mod config;
pub mod error;
pub mod groove;
pub mod note;
pub mod register;
pub mod scale;
pub mod signal;

pub use config::{clamp_bpm, GenerationParams, MAX_BPM, MIN_BPM};
pub use error::{Error, Result};
pub use groove::{GrooveHistogram, GRID_STEPS};
pub use note::{midi_to_freq, Event, Hook, Note};
pub use register::Register;
pub use scale::{
    l2_normalize, list_available_scales, templates, PitchClass, Quality, Scale, ScaleTemplate,
};
pub use signal::Signal;

/// Analysis sample rate every loaded signal is converted to.
pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

/// Number of hooks produced per generation request.
pub const DEFAULT_HOOK_COUNT: usize = 5;
