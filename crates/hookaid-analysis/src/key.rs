//! Scale detection by chroma template matching.

use crate::chroma::chroma;
use crate::hpss::{harmonic, HpssParams};
use hookaid_core::scale::l2_normalize;
use hookaid_core::signal::SILENCE_FLOOR;
use hookaid_core::{templates, Scale, Signal};
use std::fmt;
use tracing::debug;

/// Best score below which a match is too weak to suggest
pub const MIN_MATCH_SCORE: f64 = 0.25;

/// Best-minus-second margin below which a match is ambiguous
pub const MIN_MATCH_MARGIN: f64 = 0.08;

/// How much to trust a scale suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Confidence {
    /// No scale suggested; ask the user
    Inconclusive,
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Tier for a suggestion: High at >= 0.6, Medium at >= 0.4, else Low.
    pub fn from_match(scale: Option<Scale>, score: f64) -> Self {
        match scale {
            None => Confidence::Inconclusive,
            Some(_) if score >= 0.6 => Confidence::High,
            Some(_) if score >= 0.4 => Confidence::Medium,
            Some(_) => Confidence::Low,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Confidence::Inconclusive => "inconclusive",
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        })
    }
}

/// Outcome of scale detection.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ScaleMatch {
    /// Suggested scale, `None` when the match is weak, ambiguous or the
    /// signal is not tonal
    pub scale: Option<Scale>,
    /// Best cosine similarity (0.0 when rejected before matching)
    pub score: f64,
    pub confidence: Confidence,
}

impl ScaleMatch {
    fn new(scale: Option<Scale>, score: f64) -> Self {
        Self {
            scale,
            score,
            confidence: Confidence::from_match(scale, score),
        }
    }

    /// Rejected before any template comparison.
    pub fn rejected() -> Self {
        Self::new(None, 0.0)
    }

    pub fn is_inconclusive(&self) -> bool {
        self.scale.is_none()
    }
}

/// Compare a chroma vector against every template.
///
/// Returns the best scale unless the best score is under 0.25 or leads the
/// runner-up by less than 0.08.
pub fn match_chroma(chroma: &[f64; 12]) -> ScaleMatch {
    let mut normalized = *chroma;
    if !l2_normalize(&mut normalized) {
        return ScaleMatch::rejected();
    }

    let mut best: Option<(Scale, f64)> = None;
    let mut second = f64::NEG_INFINITY;
    for template in templates() {
        let score = template.similarity(&normalized);
        match best {
            Some((_, best_score)) if score <= best_score => {
                second = second.max(score);
            }
            Some((_, best_score)) => {
                second = best_score;
                best = Some((template.scale, score));
            }
            None => best = Some((template.scale, score)),
        }
    }

    let Some((scale, best_score)) = best else {
        return ScaleMatch::rejected();
    };
    debug!(
        "Best scale {} ({:.3}), runner-up {:.3}",
        scale, best_score, second
    );

    let ambiguous = second >= 0.0 && best_score - second < MIN_MATCH_MARGIN;
    if best_score < MIN_MATCH_SCORE || ambiguous {
        return ScaleMatch::new(None, best_score);
    }
    ScaleMatch::new(Some(scale), best_score)
}

/// Samples chroma is computed from: the harmonic component, or the raw
/// signal when the harmonic component is silent.
fn analysis_source<'a>(raw: &'a [f32], harmonic: &'a [f32]) -> &'a [f32] {
    if harmonic.iter().all(|s| s.abs() < SILENCE_FLOOR) {
        debug!("Harmonic component is silent, using the raw signal");
        raw
    } else {
        harmonic
    }
}

/// Suggest a scale from the harmonic content of a signal.
///
/// Empty or silent signals are rejected with score 0.0. The harmonic
/// component is used unless it is silent, in which case the raw signal is.
pub fn detect_scale_from_audio(signal: &Signal) -> ScaleMatch {
    if signal.is_silent() || signal.sample_rate == 0 {
        return ScaleMatch::rejected();
    }

    let harmonic_part = harmonic(&signal.samples, &HpssParams::default());
    let source = analysis_source(&signal.samples, &harmonic_part);

    let chroma = chroma(source, signal.sample_rate);
    if chroma.iter().all(|c| *c == 0.0) {
        debug!("No tonal content found");
        return ScaleMatch::rejected();
    }
    match_chroma(&chroma)
}
