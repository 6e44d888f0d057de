//! File format encoders
//!
//! Each encoder is feature-gated:
//! - `wav`: WAV via hound (pure Rust)
//! - `midi`: Standard MIDI File via midly

#[cfg(feature = "wav")]
pub mod wav;

#[cfg(feature = "midi")]
pub mod midi;
