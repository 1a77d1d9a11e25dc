//! Unified error types for the CEP ecosystem
//!
//! This module provides a common error type [`CepError`] that can represent
//! errors from any part of the system. Construction-time failures (unknown
//! resources, out-of-range stages, malformed required inputs) are reported
//! here; feasibility of the declared model is a property of the data and is
//! diagnosed by the solver, never by this crate.

use thiserror::Error;

/// Unified error type for all CEP operations.
///
/// Covers the structural well-formedness checks performed at construction
/// time. A model that passes construction can still be infeasible; that
/// verdict belongs to the solver backend.
#[derive(Error, Debug)]
pub enum CepError {
    /// A resource identifier referenced outside the declared universe
    #[error("unknown resource {id} referenced by {referenced_by}")]
    UnknownResource {
        /// Numeric resource id that failed to resolve
        id: usize,
        /// Which input referenced it (eligibility set, snapshot, ...)
        referenced_by: String,
    },

    /// A stage index outside 1..=num_stages
    #[error("stage {stage} out of range (planning horizon has {num_stages} stages)")]
    StageOutOfRange { stage: usize, num_stages: usize },

    /// Malformed multi-stage settings
    #[error("settings error: {0}")]
    Settings(String),

    /// A required input is missing or the wrong shape
    #[error("missing input: {0}")]
    MissingInput(String),

    /// Data validation errors
    #[error("validation error: {0}")]
    Validation(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using CepError.
pub type CepResult<T> = Result<T, CepError>;

impl From<anyhow::Error> for CepError {
    fn from(err: anyhow::Error) -> Self {
        CepError::Other(err.to_string())
    }
}
