//! Pitch registers.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Narrowest span that still holds every pitch class.
const MIN_SPAN: u8 = 11;

/// Inclusive MIDI pitch range a hook is folded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RegisterBounds")
)]
pub struct Register {
    low: u8,
    high: u8,
}

/// Unchecked register bounds as they appear on the wire.
#[cfg(feature = "serialization")]
#[derive(serde::Deserialize)]
struct RegisterBounds {
    low: u8,
    high: u8,
}

#[cfg(feature = "serialization")]
impl TryFrom<RegisterBounds> for Register {
    type Error = Error;

    fn try_from(bounds: RegisterBounds) -> Result<Self> {
        Register::new(bounds.low, bounds.high)
    }
}

impl Register {
    /// Lower octave, C3..A4.
    pub const LOW: Register = Register { low: 48, high: 69 };
    /// Around middle C, G3..E5.
    pub const MID: Register = Register { low: 55, high: 76 };
    /// An octave up, D4..C6.
    pub const HIGH: Register = Register { low: 62, high: 84 };

    /// Custom register. Must span at least 11 semitones so octave folding
    /// always lands inside it.
    pub fn new(low: u8, high: u8) -> Result<Self> {
        if high > 127 || high < low || high - low < MIN_SPAN {
            return Err(Error::InvalidRegister { low, high });
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> u8 {
        self.low
    }

    pub fn high(&self) -> u8 {
        self.high
    }

    pub fn contains(&self, pitch: i32) -> bool {
        pitch >= self.low as i32 && pitch <= self.high as i32
    }

    /// Transpose `pitch` by whole octaves until it lies inside the register.
    pub fn fit(&self, pitch: i32) -> u8 {
        let mut pitch = pitch;
        while pitch < self.low as i32 {
            pitch += 12;
        }
        while pitch > self.high as i32 {
            pitch -= 12;
        }
        pitch as u8
    }

    /// Preset name, if this is one of the presets.
    pub fn preset_name(&self) -> Option<&'static str> {
        match *self {
            Register::LOW => Some("low"),
            Register::MID => Some("mid"),
            Register::HIGH => Some("high"),
            _ => None,
        }
    }
}

impl Default for Register {
    fn default() -> Self {
        Register::MID
    }
}

impl FromStr for Register {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Register::LOW),
            "mid" => Ok(Register::MID),
            "high" => Ok(Register::HIGH),
            _ => Err(Error::UnknownRegister(s.to_string())),
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.preset_name() {
            Some(name) => write!(f, "{} ({}-{})", name, self.low, self.high),
            None => write!(f, "{}-{}", self.low, self.high),
        }
    }
}
