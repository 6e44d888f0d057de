//! HookAid session pipeline: analyze a loop, generate hooks, render them.

use crate::{HookAidBuilder, Result};
use hookaid_analysis::{analyze_groove, detect_scale_from_audio, load_signal};
use hookaid_analysis::{GrooveAnalysis, LoaderConfig, ScaleMatch};
use hookaid_core::{clamp_bpm, GenerationParams, GrooveHistogram, Hook, Register, Scale, Signal};
use hookaid_export::{
    encode_wav_mono_memory, hooks_to_midi_bytes, hooks_to_wav_bytes, RenderOptions, Renderer,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name of the averaged mix of every hook
pub const COMBINED_WAV_NAME: &str = "hooks_combined.wav";

/// File name of the multi-track MIDI export
pub const MIDI_NAME: &str = "hooks.mid";

/// Everything learned about one loop.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub struct LoopAnalysis {
    /// Length of the trimmed, resampled signal
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub groove: GrooveAnalysis,
    pub key: ScaleMatch,
}

impl LoopAnalysis {
    /// Detected tempo (always > 0).
    pub fn bpm(&self) -> f64 {
        self.groove.bpm
    }

    pub fn histogram(&self) -> &GrooveHistogram {
        &self.groove.histogram
    }

    /// Scale suggestion, if detection was confident enough to make one.
    pub fn suggested_scale(&self) -> Option<Scale> {
        self.key.scale
    }
}

/// Hooks generated for one loop, with the settings they will render at.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub struct HookSet {
    /// Render tempo, in [60, 180]
    pub bpm: u32,
    pub scale: Scale,
    pub register: Register,
    pub hooks: Vec<Hook>,
}

/// Encoded output files for a hook set.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedHooks {
    /// One WAV file per hook, in hook order
    pub hook_wavs: Vec<Vec<u8>>,
    /// Averaged mix of every hook
    pub combined_wav: Vec<u8>,
    /// Format-1 MIDI file, when MIDI export is enabled
    pub midi: Option<Vec<u8>>,
}

impl RenderedHooks {
    /// File name of hook `index` (0-based): `hook_1.wav`, `hook_2.wav`, ...
    pub fn hook_file_name(index: usize) -> String {
        format!("hook_{}.wav", index + 1)
    }

    /// Write every file into `dir`, creating it if needed.
    pub fn write_to_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.hook_wavs.len() + 2);

        for (i, bytes) in self.hook_wavs.iter().enumerate() {
            let path = dir.join(Self::hook_file_name(i));
            std::fs::write(&path, bytes)?;
            written.push(path);
        }

        let combined = dir.join(COMBINED_WAV_NAME);
        std::fs::write(&combined, &self.combined_wav)?;
        written.push(combined);

        if let Some(midi) = &self.midi {
            let path = dir.join(MIDI_NAME);
            std::fs::write(&path, midi)?;
            written.push(path);
        }

        debug!("Wrote {} files to {}", written.len(), dir.display());
        Ok(written)
    }
}

/// Result of a full run.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub analysis: LoopAnalysis,
    pub hook_set: HookSet,
    pub rendered: RenderedHooks,
}

/// Hook generation pipeline.
///
/// Holds validated configuration only; every call is independent and the
/// same inputs always produce the same outputs.
///
/// # Example
///
/// ```rust
/// use hookaid::prelude::*;
///
/// let aid = HookAid::builder().density(5).build()?;
///
/// let analysis = aid.analyze_signal(&Signal::new(vec![0.0; 22050], 22050));
/// let set = aid.generate(&analysis);
/// assert_eq!(set.hooks.len(), 5);
/// assert_eq!(set.scale.to_string(), "C minor");
///
/// let rendered = aid.render(&set)?;
/// assert_eq!(rendered.hook_wavs.len(), 5);
/// # Ok::<(), hookaid::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct HookAid {
    loader: LoaderConfig,
    params: GenerationParams,
    renderer: Renderer,
    export_midi: bool,
    midi_program: u8,
}

impl HookAid {
    /// Create a new builder
    pub fn builder() -> HookAidBuilder {
        HookAidBuilder::default()
    }

    pub(crate) fn from_parts(
        loader: LoaderConfig,
        params: GenerationParams,
        render: RenderOptions,
        export_midi: bool,
        midi_program: u8,
    ) -> Self {
        Self {
            loader,
            params,
            renderer: Renderer::new(render),
            export_midi,
            midi_program,
        }
    }

    pub fn loader_config(&self) -> &LoaderConfig {
        &self.loader
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    pub fn render_options(&self) -> &RenderOptions {
        self.renderer.options()
    }

    /// Decode and analyze an encoded audio file.
    ///
    /// Undecodable or empty input is analyzed as an empty signal: 120 BPM,
    /// uniform groove, no scale suggestion.
    pub fn analyze_bytes(&self, bytes: &[u8]) -> LoopAnalysis {
        let signal = load_signal(bytes, &self.loader);
        self.analyze_signal(&signal)
    }

    /// Analyze an already-loaded signal.
    pub fn analyze_signal(&self, signal: &Signal) -> LoopAnalysis {
        let mut groove = analyze_groove(signal);
        if !groove.histogram.weights().iter().any(|&w| w > 0.0) {
            warn!("Empty groove histogram, substituting uniform");
            groove.histogram = GrooveHistogram::uniform();
        }
        let key = detect_scale_from_audio(signal);

        info!(
            "Analyzed {:.2}s loop: {:.1} BPM, {} beats, key {} ({:.2}, {})",
            signal.duration_secs(),
            groove.bpm,
            groove.beats.len(),
            key.scale
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".into()),
            key.score,
            key.confidence
        );

        LoopAnalysis {
            duration_secs: signal.duration_secs(),
            sample_rate: signal.sample_rate,
            groove,
            key,
        }
    }

    /// Tempo override if set, else the detected tempo rounded into [60, 180].
    pub fn resolve_bpm(&self, analysis: &LoopAnalysis) -> u32 {
        match self.params.bpm {
            Some(bpm) => bpm,
            None => clamp_bpm(analysis.bpm()),
        }
    }

    /// Scale override if set, else the detected scale, else C minor.
    pub fn resolve_scale(&self, analysis: &LoopAnalysis) -> Scale {
        if let Some(name) = &self.params.scale {
            return Scale::parse_lossy(name);
        }
        analysis.suggested_scale().unwrap_or_default()
    }

    /// Generate `hook_count` hooks seeded by their index.
    pub fn generate(&self, analysis: &LoopAnalysis) -> HookSet {
        let scale = self.resolve_scale(analysis);
        let bpm = self.resolve_bpm(analysis);
        let hooks = hookaid_motif::generate_hooks(analysis.histogram(), &scale, &self.params);
        info!("Generated {} hooks in {} at {} BPM", hooks.len(), scale, bpm);

        HookSet {
            bpm,
            scale,
            register: self.params.register,
            hooks,
        }
    }

    /// Encode every hook, the mix, and optionally the MIDI file.
    pub fn render(&self, set: &HookSet) -> Result<RenderedHooks> {
        let bpm = set.bpm as f64;
        let sample_rate = self.renderer.sample_rate();

        let hook_wavs = set
            .hooks
            .iter()
            .map(|hook| {
                let pcm = self.renderer.render(hook.notes(), bpm);
                encode_wav_mono_memory(&pcm, sample_rate)
            })
            .collect::<hookaid_export::Result<Vec<_>>>()?;
        let combined_wav = hooks_to_wav_bytes(&self.renderer, &set.hooks, bpm)?;

        let midi = if self.export_midi {
            Some(hooks_to_midi_bytes(&set.hooks, bpm, self.midi_program)?)
        } else {
            None
        };

        Ok(RenderedHooks {
            hook_wavs,
            combined_wav,
            midi,
        })
    }

    /// Analyze, generate and render in one call.
    pub fn run(&self, bytes: &[u8]) -> Result<Session> {
        let analysis = self.analyze_bytes(bytes);
        let hook_set = self.generate(&analysis);
        let rendered = self.render(&hook_set)?;
        Ok(Session {
            analysis,
            hook_set,
            rendered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookaid_analysis::Confidence;

    fn silent_analysis() -> LoopAnalysis {
        HookAid::default().analyze_signal(&Signal::empty(22050))
    }

    #[test]
    fn test_degenerate_analysis() {
        let analysis = silent_analysis();
        assert_eq!(analysis.bpm(), 120.0);
        assert!(analysis.histogram().is_uniform());
        assert_eq!(analysis.key.confidence, Confidence::Inconclusive);
        assert_eq!(analysis.duration_secs, 0.0);
    }

    #[test]
    fn test_garbage_bytes_do_not_fail() {
        let analysis = HookAid::default().analyze_bytes(b"definitely not audio");
        assert_eq!(analysis.bpm(), 120.0);
        assert!(analysis.suggested_scale().is_none());
    }

    #[test]
    fn test_resolution_order() {
        let mut analysis = silent_analysis();
        let aid = HookAid::default();
        assert_eq!(aid.resolve_scale(&analysis), Scale::default());
        assert_eq!(aid.resolve_bpm(&analysis), 120);

        analysis.key.scale = Some("E major".parse().unwrap());
        analysis.groove.bpm = 201.7;
        assert_eq!(aid.resolve_scale(&analysis).to_string(), "E major");
        assert_eq!(aid.resolve_bpm(&analysis), 180);

        let aid = HookAid::builder().scale("D minor").bpm(95).build().unwrap();
        assert_eq!(aid.resolve_scale(&analysis).to_string(), "D minor");
        assert_eq!(aid.resolve_bpm(&analysis), 95);
    }

    #[test]
    fn test_render_outputs() {
        let aid = HookAid::builder().midi(true).build().unwrap();
        let set = aid.generate(&silent_analysis());
        let rendered = aid.render(&set).unwrap();
        assert_eq!(rendered.hook_wavs.len(), 5);
        assert!(rendered.hook_wavs.iter().all(|w| &w[0..4] == b"RIFF"));
        assert_eq!(&rendered.combined_wav[8..12], b"WAVE");
        assert_eq!(rendered.midi.as_ref().map(|m| &m[0..4]), Some(&b"MThd"[..]));

        let no_midi = HookAid::default().render(&set).unwrap();
        assert!(no_midi.midi.is_none());
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let aid = HookAid::builder().hook_count(2).midi(true).build().unwrap();
        let session = aid.run(&[]).unwrap();
        let written = session.rendered.write_to_dir(dir.path()).unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["hook_1.wav", "hook_2.wav", "hooks_combined.wav", "hooks.mid"]
        );
    }
}
