//! Render options.

use crate::error::{ExportError, Result};
use hookaid_core::DEFAULT_SAMPLE_RATE;

/// Sine-tone render settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Peak amplitude of each tone
    pub gain: f32,
    /// Linear fade-in length in seconds
    pub attack_secs: f64,
    /// Linear fade-out length in seconds
    pub release_secs: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            gain: 0.35,
            attack_secs: 0.01,
            release_secs: 0.02,
        }
    }
}

impl RenderOptions {
    /// Default options at another sample rate.
    pub fn with_sample_rate(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(ExportError::InvalidOptions(
                "sample rate must be positive".into(),
            ));
        }
        if !self.gain.is_finite() || self.gain < 0.0 {
            return Err(ExportError::InvalidOptions(format!(
                "gain {} must be finite and non-negative",
                self.gain
            )));
        }
        for (name, secs) in [("attack", self.attack_secs), ("release", self.release_secs)] {
            if !secs.is_finite() || secs < 0.0 {
                return Err(ExportError::InvalidOptions(format!(
                    "{} time {} must be finite and non-negative",
                    name, secs
                )));
            }
        }
        Ok(())
    }

    /// Fade-in length in samples (at least 1).
    pub fn attack_samples(&self) -> usize {
        ((self.attack_secs * self.sample_rate as f64) as usize).max(1)
    }

    /// Fade-out length in samples (at least 1).
    pub fn release_samples(&self) -> usize {
        ((self.release_secs * self.sample_rate as f64) as usize).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RenderOptions::default();
        assert_eq!(options.sample_rate, 22050);
        assert_eq!(options.attack_samples(), 220);
        assert_eq!(options.release_samples(), 441);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        assert!(RenderOptions::with_sample_rate(0).validate().is_err());
        let options = RenderOptions {
            gain: f32::NAN,
            ..Default::default()
        };
        assert!(options.validate().is_err());
        let options = RenderOptions {
            release_secs: -1.0,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_envelope_floor() {
        let options = RenderOptions::with_sample_rate(50);
        assert_eq!(options.attack_samples(), 1);
        assert_eq!(options.release_samples(), 1);
    }
}
