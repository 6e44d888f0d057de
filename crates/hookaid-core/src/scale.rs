//! Scales, scale-name parsing and the template bank used for key detection.
//!
//! A scale is a root pitch class plus a quality (major or natural minor).
//! Names are spelled with sharps ("C#", never "Db") when listed; parsing is
//! lenient and accepts flats, unicode accidentals and the usual
//! abbreviations ("Bbm", "F# min", "c major").

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Base octave the scale root is placed in (C4 = MIDI 60).
pub const ROOT_BASE_MIDI: u8 = 60;

/// One of the twelve pitch classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    /// Chromatic order starting at C.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Semitones above C.
    pub fn semitone(self) -> u8 {
        self as u8
    }

    /// Pitch class of a semitone offset (wraps modulo 12).
    pub fn from_semitone(semitone: i32) -> Self {
        Self::ALL[semitone.rem_euclid(12) as usize]
    }

    /// Sharp spelling.
    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }

    /// Parse a note letter followed by any number of accidentals.
    pub fn parse(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        match split_root(&lowered) {
            Some((pc, "")) => Ok(pc),
            _ => Err(Error::InvalidScale(s.to_string())),
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scale quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Quality {
    Major,
    /// Natural (aeolian) minor
    Minor,
}

impl Quality {
    pub const ALL: [Quality; 2] = [Quality::Major, Quality::Minor];

    /// Semitone offsets of the seven scale degrees from the root.
    pub fn degrees(self) -> &'static [u8; 7] {
        match self {
            Quality::Major => &[0, 2, 4, 5, 7, 9, 11],
            Quality::Minor => &[0, 2, 3, 5, 7, 8, 10],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Quality::Major => "major",
            Quality::Minor => "minor",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "" | "maj" | "major" => Some(Quality::Major),
            "m" | "min" | "minor" => Some(Quality::Minor),
            _ => None,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A root pitch class and a quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Scale {
    pub root: PitchClass,
    pub quality: Quality,
}

impl Scale {
    pub const fn new(root: PitchClass, quality: Quality) -> Self {
        Self { root, quality }
    }

    /// Parse names such as `"C minor"`, `"a# maj"`, `"Bbm"` or `"E"`.
    ///
    /// Whitespace, `-` and `_` are ignored, case does not matter and a bare
    /// root means major.
    pub fn parse(s: &str) -> Result<Self> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        let invalid = || Error::InvalidScale(s.to_string());
        let (root, suffix) = split_root(&compact).ok_or_else(invalid)?;
        let quality = Quality::from_suffix(suffix).ok_or_else(invalid)?;
        Ok(Self { root, quality })
    }

    /// Parse, falling back to C minor for anything unrecognised.
    pub fn parse_lossy(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    /// Semitone offsets of the seven degrees.
    pub fn degrees(&self) -> &'static [u8; 7] {
        self.quality.degrees()
    }

    /// MIDI pitch of the root in the base octave.
    pub fn tonic_midi(&self) -> u8 {
        ROOT_BASE_MIDI + self.root.semitone()
    }

    /// True when `pitch` belongs to the scale in any octave.
    pub fn contains_pitch(&self, pitch: i32) -> bool {
        let offset = (pitch - self.root.semitone() as i32).rem_euclid(12) as u8;
        self.degrees().contains(&offset)
    }

    /// Position of this scale in [`list_available_scales`].
    pub fn index(&self) -> usize {
        self.root.semitone() as usize * 2 + self.quality as usize
    }

    /// Matching template from the shared bank.
    pub fn template(&self) -> &'static ScaleTemplate {
        &TEMPLATES[self.index()]
    }
}

impl Default for Scale {
    fn default() -> Self {
        Scale::new(PitchClass::C, Quality::Minor)
    }
}

impl FromStr for Scale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Scale::parse(s)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.root, self.quality)
    }
}

/// Split a lowercased string into a leading root and the remaining suffix.
fn split_root(s: &str) -> Option<(PitchClass, &str)> {
    let mut chars = s.char_indices();
    let (_, letter) = chars.next()?;
    let mut semitone: i32 = match letter {
        'c' => 0,
        'd' => 2,
        'e' => 4,
        'f' => 5,
        'g' => 7,
        'a' => 9,
        'b' => 11,
        _ => return None,
    };
    let mut suffix_start = s.len();
    for (i, c) in chars {
        match c {
            '#' | '♯' => semitone += 1,
            'b' | '♭' => semitone -= 1,
            _ => {
                suffix_start = i;
                break;
            }
        }
    }
    Some((PitchClass::from_semitone(semitone), &s[suffix_start..]))
}

/// One entry of the template bank.
///
/// `membership` is the L2-normalized binary pitch-class membership vector.
/// `profile` weights the same pitch classes (tonic 3.0, third and fifth 2.0,
/// other degrees 1.0) and is what chroma vectors are matched against, since
/// relative major/minor keys share an identical membership set.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleTemplate {
    pub scale: Scale,
    membership: [f64; 12],
    profile: [f64; 12],
}

impl ScaleTemplate {
    fn build(scale: Scale) -> Self {
        let mut membership = [0.0; 12];
        let mut profile = [0.0; 12];
        let root = scale.root.semitone() as usize;
        for (degree, &offset) in scale.degrees().iter().enumerate() {
            let pc = (root + offset as usize) % 12;
            membership[pc] = 1.0;
            profile[pc] = match degree {
                0 => 3.0,
                2 | 4 => 2.0,
                _ => 1.0,
            };
        }
        l2_normalize(&mut membership);
        l2_normalize(&mut profile);
        Self {
            scale,
            membership,
            profile,
        }
    }

    pub fn membership(&self) -> &[f64; 12] {
        &self.membership
    }

    pub fn profile(&self) -> &[f64; 12] {
        &self.profile
    }

    /// Cosine similarity against an already L2-normalized chroma vector.
    pub fn similarity(&self, chroma: &[f64; 12]) -> f64 {
        self.profile
            .iter()
            .zip(chroma.iter())
            .map(|(a, b)| a * b)
            .sum()
    }
}

/// Scale the vector to unit length in place. Returns false (leaving the
/// vector untouched) when its norm is zero or not finite.
pub fn l2_normalize(v: &mut [f64; 12]) -> bool {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm <= 0.0 || !norm.is_finite() {
        return false;
    }
    for x in v.iter_mut() {
        *x /= norm;
    }
    true
}

lazy_static::lazy_static! {
    static ref TEMPLATES: Vec<ScaleTemplate> = PitchClass::ALL
        .into_iter()
        .flat_map(|root| {
            Quality::ALL
                .into_iter()
                .map(move |quality| ScaleTemplate::build(Scale::new(root, quality)))
        })
        .collect();

    static ref SCALE_NAMES: Vec<String> = TEMPLATES
        .iter()
        .map(|t| t.scale.to_string())
        .collect();
}

/// The 24 scale templates, roots in chromatic order, major before minor.
pub fn templates() -> &'static [ScaleTemplate] {
    &TEMPLATES
}

/// The 24 scale names in the same fixed order as [`templates`].
pub fn list_available_scales() -> &'static [String] {
    &SCALE_NAMES
}
