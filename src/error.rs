//! Centralized error type for the hookaid umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] hookaid_core::Error),

    #[error("Analysis: {0}")]
    Analysis(#[from] hookaid_analysis::AnalysisError),

    #[error("Export: {0}")]
    Export(#[from] hookaid_export::ExportError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
