//! Error types for transient runs.

use cf_results::ResultsError;
use cf_solver::SolverError;
use thiserror::Error;

/// Errors encountered while driving a transient run. Step-level solver
/// failures already carry the offending time index.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Output error: {0}")]
    Output(#[from] ResultsError),
}

pub type SimResult<T> = Result<T, SimError>;
