//! Error types for the finite-element backend.

use cf_core::CoreError;
use thiserror::Error;

/// Errors that can occur in the discrete backend.
#[derive(Error, Debug)]
pub enum FemError {
    #[error("Unsupported polynomial degree: {degree}")]
    UnsupportedDegree { degree: usize },

    #[error("Invalid mesh: {what}")]
    InvalidMesh { what: &'static str },

    #[error("Singular linear system: {what}")]
    SingularSystem { what: &'static str },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type FemResult<T> = Result<T, FemError>;
