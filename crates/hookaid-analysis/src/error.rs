//! Error types for hookaid-analysis

use thiserror::Error;

/// Analysis error type.
///
/// Only decoding and resampling can fail. Every analyzer that takes a
/// [`Signal`](hookaid_core::Signal) has a defined fallback for degenerate input
/// and never returns this type.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Input bytes could not be probed or decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Input decoded to zero samples
    #[error("Decoded audio is empty")]
    EmptyAudio,

    /// Sample-rate conversion failed
    #[error("Resampling error: {0}")]
    Resample(String),
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

impl From<symphonia::core::errors::Error> for AnalysisError {
    fn from(e: symphonia::core::errors::Error) -> Self {
        AnalysisError::Decode(e.to_string())
    }
}

impl From<rubato::ResamplerConstructionError> for AnalysisError {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        AnalysisError::Resample(e.to_string())
    }
}

impl From<rubato::ResampleError> for AnalysisError {
    fn from(e: rubato::ResampleError) -> Self {
        AnalysisError::Resample(e.to_string())
    }
}
