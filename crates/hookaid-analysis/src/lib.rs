//! # Hook Aid Analysis
//!
//! Drum-loop analysis: everything between encoded audio bytes and the
//! numbers the hook generator consumes.
//!
//! - **Signal loading**: symphonia decoding, rubato resampling, silence trim,
//!   RMS normalization
//! - **Onset detection**: log spectral-flux envelope with peak picking
//! - **Tempo and beats**: autocorrelation tempo candidates, dynamic-programming
//!   beat tracking, double-time correction
//! - **Groove**: sixteenth-note ticks and the 16-step onset histogram
//! - **Key**: HPSS, peak-based chroma, and template matching against the
//!   24 major/minor scales
//!
//! Every analyzer accepts degenerate input (empty, silent, noisy) and returns
//! a defined fallback rather than an error.
//!
//! ## Example
//!
//! ```rust
//! use hookaid_analysis::{analyze_groove, detect_scale_from_audio};
//! use hookaid_core::Signal;
//!
//! let signal = Signal::new(vec![0.0; 22050], 22050);
//!
//! let groove = analyze_groove(&signal);
//! assert!(groove.bpm > 0.0);
//! assert!(groove.histogram.is_uniform());
//!
//! let key = detect_scale_from_audio(&signal);
//! assert!(key.scale.is_none());
//! ```

pub mod beat;
pub mod chroma;
pub mod error;
pub mod groove;
pub mod hpss;
pub mod key;
pub mod loader;
pub mod onset;
pub mod resample;
pub mod stft;
pub mod tempo;

pub use error::{AnalysisError, Result};
pub use groove::{
    analyze_groove, groove_histogram, histogram_from_onsets, ticks_from_beats, GrooveAnalysis,
};
pub use key::{detect_scale_from_audio, match_chroma, Confidence, ScaleMatch};
pub use loader::{load_signal, try_decode, try_load_signal, DecodedAudio, LoaderConfig};
pub use onset::{onset_times, Onset, OnsetDetector};
pub use tempo::{correct_double_time, estimate_bpm_and_beats};
