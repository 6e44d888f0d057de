//! Hook generation parameters.

use crate::register::Register;
use crate::{Error, Result, DEFAULT_HOOK_COUNT};

/// Slowest tempo accepted for rendering.
pub const MIN_BPM: u32 = 60;
/// Fastest tempo accepted for rendering.
pub const MAX_BPM: u32 = 180;
/// Most notes a one-bar hook can hold.
pub const MAX_DENSITY: usize = 16;

/// User-facing controls for one generation request.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct GenerationParams {
    /// Notes per hook
    pub density: usize,
    /// Extra weight on off-beat sixteenths, 0.0..=1.0
    pub syncopation: f64,
    pub register: Register,
    /// Scale name override. `None` uses the detected scale, then C minor.
    pub scale: Option<String>,
    /// Tempo override for rendering. `None` uses the detected tempo.
    pub bpm: Option<u32>,
    pub hook_count: usize,
    /// Probability of a stepwise move between notes
    pub step_prob: f64,
    /// Largest leap in scale degrees
    pub max_leap: i32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            density: 7,
            syncopation: 0.5,
            register: Register::MID,
            scale: None,
            bpm: None,
            hook_count: DEFAULT_HOOK_COUNT,
            step_prob: 0.8,
            max_leap: 4,
        }
    }
}

impl GenerationParams {
    pub fn validate(&self) -> Result<()> {
        if self.density == 0 || self.density > MAX_DENSITY {
            return Err(Error::InvalidConfig(format!(
                "density {} out of range (1-{})",
                self.density, MAX_DENSITY
            )));
        }
        if !(0.0..=1.0).contains(&self.syncopation) {
            return Err(Error::InvalidConfig(format!(
                "syncopation {} out of range (0.0-1.0)",
                self.syncopation
            )));
        }
        if !(0.0..=1.0).contains(&self.step_prob) {
            return Err(Error::InvalidConfig(format!(
                "step_prob {} out of range (0.0-1.0)",
                self.step_prob
            )));
        }
        if self.max_leap < 0 {
            return Err(Error::InvalidConfig(format!(
                "max_leap {} must not be negative",
                self.max_leap
            )));
        }
        if self.hook_count == 0 {
            return Err(Error::InvalidConfig("hook_count must be at least 1".into()));
        }
        if let Some(bpm) = self.bpm {
            if !(MIN_BPM..=MAX_BPM).contains(&bpm) {
                return Err(Error::InvalidTempo(bpm));
            }
        }
        Ok(())
    }

    /// Copy with every numeric control forced into its valid range.
    pub fn clamped(&self) -> Self {
        let unit = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self {
            density: self.density.clamp(1, MAX_DENSITY),
            syncopation: unit(self.syncopation),
            register: self.register,
            scale: self.scale.clone(),
            bpm: self.bpm.map(|b| b.clamp(MIN_BPM, MAX_BPM)),
            hook_count: self.hook_count.max(1),
            step_prob: unit(self.step_prob),
            max_leap: self.max_leap.max(0),
        }
    }
}

/// Clamp a tempo into the renderable range.
pub fn clamp_bpm(bpm: f64) -> u32 {
    if !bpm.is_finite() {
        return 120;
    }
    (bpm.round() as i64).clamp(MIN_BPM as i64, MAX_BPM as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = GenerationParams::default();
        assert_eq!(params.density, 7);
        assert_eq!(params.syncopation, 0.5);
        assert_eq!(params.register, Register::MID);
        assert_eq!(params.hook_count, 5);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let params = GenerationParams {
            density: 17,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = GenerationParams {
            syncopation: 1.5,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = GenerationParams {
            bpm: Some(200),
            ..Default::default()
        };
        assert_eq!(params.validate(), Err(Error::InvalidTempo(200)));
    }

    #[test]
    fn test_clamped() {
        let params = GenerationParams {
            density: 40,
            syncopation: -0.3,
            bpm: Some(30),
            step_prob: f64::NAN,
            max_leap: -2,
            hook_count: 0,
            ..Default::default()
        }
        .clamped();
        assert_eq!(params.density, 16);
        assert_eq!(params.syncopation, 0.0);
        assert_eq!(params.bpm, Some(60));
        assert_eq!(params.step_prob, 0.0);
        assert_eq!(params.max_leap, 0);
        assert_eq!(params.hook_count, 1);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_clamp_bpm() {
        assert_eq!(clamp_bpm(119.6), 120);
        assert_eq!(clamp_bpm(240.0), 180);
        assert_eq!(clamp_bpm(12.0), 60);
        assert_eq!(clamp_bpm(f64::NAN), 120);
    }
}
