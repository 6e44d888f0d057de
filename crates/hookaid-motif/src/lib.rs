//! # Hook Aid Motif
//!
//! Procedural hook generation locked to a loop's groove.
//!
//! - [`sample_rhythm`]: draws distinct sixteenth positions weighted by the
//!   groove histogram, with an off-beat syncopation boost
//! - [`assign_pitches`]: random walk over scale degrees, folded into a
//!   register and closed on the tonic
//! - [`generate_hooks`]: one hook per seed `0..hook_count`
//!
//! Every function seeds its own generator, so output depends only on its
//! arguments.
//!
//! ## Example
//!
//! ```rust
//! use hookaid_core::{GenerationParams, GrooveHistogram, Scale};
//! use hookaid_motif::generate_hooks;
//!
//! let hooks = generate_hooks(
//!     &GrooveHistogram::uniform(),
//!     &Scale::default(),
//!     &GenerationParams::default(),
//! );
//! assert_eq!(hooks.len(), 5);
//! assert!(hooks.iter().all(|h| h.final_pitch() == Some(60)));
//! ```

pub mod hooks;
pub mod pitch;
pub mod rhythm;

pub use hooks::{generate_hook, generate_hooks};
pub use pitch::{assign_pitches, DegreeMapper, WalkParams};
pub use rhythm::{sample_rhythm, syncopated_weights, LONG_NOTE_PROB};
