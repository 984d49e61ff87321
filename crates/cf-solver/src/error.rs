//! Error types for the coupled solver.

use cf_fem::FemError;
use thiserror::Error;

/// Errors that can occur while configuring or advancing the coupled solve.
///
/// Every failure is fatal for the run; there are no retries and no partial
/// results. Step-level variants carry the offending time index.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Invalid configuration: {what}")]
    Config { what: &'static str },

    #[error("Backend solve failed at step {step}: {source}")]
    Backend { step: usize, source: FemError },

    #[error(
        "Newton iteration exhausted at step {step}: {iterations} iterations, residual {residual:.3e}"
    )]
    NewtonExhausted {
        step: usize,
        iterations: usize,
        residual: f64,
    },

    #[error("Linear solve failed at step {step}, iteration {iteration}: {source}")]
    LinearSolve {
        step: usize,
        iteration: usize,
        source: FemError,
    },

    #[error("Finite-element backend error: {0}")]
    Fem(#[from] FemError),
}

pub type SolverResult<T> = Result<T, SolverError>;
