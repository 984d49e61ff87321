//! Dense linear solve.

use crate::error::{FemError, FemResult};
use nalgebra::{DMatrix, DVector};

/// Solve `A x = b` by LU factorization with partial pivoting.
pub fn solve_dense(a: DMatrix<f64>, b: &DVector<f64>) -> FemResult<DVector<f64>> {
    a.lu().solve(b).ok_or(FemError::SingularSystem {
        what: "LU solve failed",
    })
}
