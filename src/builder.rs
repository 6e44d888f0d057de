//! Builder for configuring and constructing a `HookAid` pipeline.

use crate::{HookAid, Result};
use hookaid_analysis::LoaderConfig;
use hookaid_core::{GenerationParams, Register, Scale};
use hookaid_export::RenderOptions;

/// Every setting starts at the session defaults: 22050 Hz analysis and
/// render rate, five hooks of seven notes, syncopation 0.5, mid register,
/// detected scale and tempo.
///
/// `build()` rejects out-of-range values instead of clamping them.
///
/// # Example
///
/// ```rust
/// use hookaid::prelude::*;
///
/// let aid = HookAid::builder()
///     .density(9)
///     .syncopation(0.8)
///     .register(Register::HIGH)
///     .scale("F# minor")
///     .midi(true)
///     .build()?;
/// assert_eq!(aid.params().density, 9);
///
/// assert!(HookAid::builder().density(0).build().is_err());
/// # Ok::<(), hookaid::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct HookAidBuilder {
    loader: LoaderConfig,
    params: GenerationParams,
    render: RenderOptions,
    export_midi: bool,
    midi_program: u8,
}

impl HookAidBuilder {
    /// Replace the whole loader configuration.
    pub fn loader(mut self, config: LoaderConfig) -> Self {
        self.loader = config;
        self
    }

    /// Replace every generation parameter at once.
    pub fn params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Replace the render settings.
    pub fn render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Default: 7 (1-16)
    pub fn density(mut self, density: usize) -> Self {
        self.params.density = density;
        self
    }

    /// Default: 0.5 (0.0-1.0)
    pub fn syncopation(mut self, amount: f64) -> Self {
        self.params.syncopation = amount;
        self
    }

    /// Default: `Register::MID`
    pub fn register(mut self, register: Register) -> Self {
        self.params.register = register;
        self
    }

    /// Use this scale instead of the detected one.
    pub fn scale(mut self, name: impl Into<String>) -> Self {
        self.params.scale = Some(name.into());
        self
    }

    /// Render at this tempo instead of the detected one (60-180).
    pub fn bpm(mut self, bpm: u32) -> Self {
        self.params.bpm = Some(bpm);
        self
    }

    /// Default: 5
    pub fn hook_count(mut self, count: usize) -> Self {
        self.params.hook_count = count;
        self
    }

    /// Default: 0.8
    pub fn step_prob(mut self, prob: f64) -> Self {
        self.params.step_prob = prob;
        self
    }

    /// Default: 4 scale degrees
    pub fn max_leap(mut self, degrees: i32) -> Self {
        self.params.max_leap = degrees;
        self
    }

    /// Sets both the analysis and the render sample rate.
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.loader.target_sample_rate = sample_rate;
        self.render.sample_rate = sample_rate;
        self
    }

    /// Also produce a multi-track MIDI file. Default: off
    pub fn midi(mut self, enabled: bool) -> Self {
        self.export_midi = enabled;
        self
    }

    /// General MIDI program for every hook track. Default: 0
    pub fn midi_program(mut self, program: u8) -> Self {
        self.midi_program = program;
        self
    }

    pub fn build(self) -> Result<HookAid> {
        self.loader.validate()?;
        self.params.validate()?;
        self.render.validate()?;
        if let Some(name) = &self.params.scale {
            Scale::parse(name)?;
        }
        if self.midi_program > 127 {
            return Err(hookaid_core::Error::InvalidConfig(format!(
                "MIDI program {} out of range (0-127)",
                self.midi_program
            ))
            .into());
        }

        Ok(HookAid::from_parts(
            self.loader,
            self.params,
            self.render,
            self.export_midi,
            self.midi_program,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_defaults_build() {
        let aid = HookAidBuilder::default().build().unwrap();
        assert_eq!(aid.params(), &GenerationParams::default());
        assert_eq!(aid.loader_config().target_sample_rate, 22050);
        assert_eq!(aid.render_options().sample_rate, 22050);
    }

    #[test]
    fn test_rejects_invalid_settings() {
        assert!(matches!(
            HookAid::builder().bpm(200).build(),
            Err(Error::Core(hookaid_core::Error::InvalidTempo(200)))
        ));
        assert!(matches!(
            HookAid::builder().scale("H dorian").build(),
            Err(Error::Core(hookaid_core::Error::InvalidScale(_)))
        ));
        assert!(HookAid::builder().syncopation(1.5).build().is_err());
        assert!(HookAid::builder().sample_rate(0).build().is_err());
        assert!(HookAid::builder().midi_program(128).build().is_err());
    }

    #[test]
    fn test_sample_rate_applies_to_both_stages() {
        let aid = HookAid::builder().sample_rate(44100).build().unwrap();
        assert_eq!(aid.loader_config().target_sample_rate, 44100);
        assert_eq!(aid.render_options().sample_rate, 44100);
    }
}
