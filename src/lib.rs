//! # Hook Aid - Groove-Locked Hook Generator
//!
//! Analyzes a short drum loop and generates short monophonic melodic hooks
//! that follow its groove and fit a detected or chosen scale.
//!
//! ## Architecture
//!
//! Hook Aid is an umbrella crate that coordinates:
//! - **hookaid-core** - Shared types (Signal, GrooveHistogram, Scale, Register, Note, Hook)
//! - **hookaid-analysis** - Loading, tempo and beat tracking, groove histogram, scale detection
//! - **hookaid-motif** - Groove-weighted rhythm sampling and scale-degree random walks
//! - **hookaid-export** - Sine-tone rendering, mixdown, WAV and MIDI encoding
//!
//! ## Quick Start
//!
//! ```no_run
//! use hookaid::prelude::*;
//!
//! let aid = HookAid::builder().density(8).midi(true).build()?;
//!
//! let bytes = std::fs::read("loop.wav")?;
//! let session = aid.run(&bytes)?;
//! println!("{:.1} BPM, hooks in {}", session.analysis.bpm(), session.hook_set.scale);
//!
//! session.rendered.write_to_dir(std::path::Path::new("out"))?;
//! # Ok::<(), hookaid::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serialization` - serde derives on analysis and generation results
//! - `cli` (default) - the `hookaid` command-line tool (implies `serialization`)

/// Re-export of hookaid-core for direct access
pub use hookaid_core as core;

pub use hookaid_analysis as analysis;
pub use hookaid_export as export;
pub use hookaid_motif as motif;

// Core types
pub use hookaid_core::{
    list_available_scales, Event, GenerationParams, GrooveHistogram, Hook, Note, PitchClass,
    Quality, Register, Scale, Signal,
};

pub use hookaid_analysis::{Confidence, GrooveAnalysis, LoaderConfig, ScaleMatch};
pub use hookaid_export::RenderOptions;

mod builder;
mod engine;
mod error;

pub use builder::HookAidBuilder;
pub use engine::{
    HookAid, HookSet, LoopAnalysis, RenderedHooks, Session, COMBINED_WAV_NAME, MIDI_NAME,
};
pub use error::{Error, Result};

/// Convenience prelude for common imports
pub mod prelude {
    // Pipeline
    pub use crate::{HookAid, HookAidBuilder, HookSet, LoopAnalysis, RenderedHooks, Session};

    // Domain types
    pub use crate::core::{GenerationParams, Hook, Note, Register, Scale, Signal};

    pub use crate::analysis::{Confidence, ScaleMatch};
    pub use crate::export::RenderOptions;
}
