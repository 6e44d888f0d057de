//! Error types for hookaid-core.

use thiserror::Error;

/// Error type for hookaid-core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid tempo: {0}. Must be between 60 and 180 BPM")]
    InvalidTempo(u32),

    #[error("Invalid register: low={low}, high={high}. Needs an 11-semitone span within 0-127")]
    InvalidRegister { low: u8, high: u8 },

    #[error("Unknown register preset: {0}")]
    UnknownRegister(String),

    #[error("Invalid scale name: {0:?}")]
    InvalidScale(String),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
