//! Newton solve with backend-owned iteration policy.

use crate::error::{FemError, FemResult};
use cf_core::ensure_finite;
use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// Newton solver configuration. Callers that need a specific convergence
/// behavior own their own loop instead; this solver's policy is internal.
pub struct NewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Absolute tolerance for residual norm
    pub abs_tol: f64,
    /// Relative tolerance for residual norm
    pub rel_tol: f64,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            abs_tol: 1e-8,
            rel_tol: 1e-12,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
        }
    }
}

/// Newton iteration result.
#[derive(Debug)]
pub struct NewtonResult {
    /// Solution vector
    pub x: DVector<f64>,
    /// Final residual norm
    pub residual_norm: f64,
    /// Number of iterations
    pub iterations: usize,
    /// Converged flag
    pub converged: bool,
}

/// Newton solver with backtracking line search.
///
/// Iterates until the residual norm meets the absolute or relative
/// tolerance; failure to converge within the iteration cap is an error, not
/// a partial result.
pub fn newton_solve<F, J>(
    x0: DVector<f64>,
    residual_fn: F,
    jacobian_fn: J,
    config: &NewtonConfig,
) -> FemResult<NewtonResult>
where
    F: Fn(&DVector<f64>) -> FemResult<DVector<f64>>,
    J: Fn(&DVector<f64>) -> FemResult<DMatrix<f64>>,
{
    let mut x = x0;
    let mut r = residual_fn(&x)?;
    let mut r_norm = ensure_finite(r.norm(), "residual norm")?;
    let r0_norm = r_norm;

    for iter in 0..config.max_iterations {
        if r_norm < config.abs_tol || r_norm < config.rel_tol * r0_norm {
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                iterations: iter,
                converged: true,
            });
        }

        let jac = jacobian_fn(&x)?;

        // Solve J * dx = -r
        let dx = jac
            .lu()
            .solve(&(-r.clone()))
            .ok_or(FemError::SingularSystem {
                what: "Jacobian solve failed",
            })?;

        // Backtracking line search on the residual norm
        let mut alpha = 1.0;
        let mut x_new = &x + alpha * &dx;
        let mut r_new = residual_fn(&x_new)?;
        let mut r_new_norm = ensure_finite(r_new.norm(), "residual norm")?;

        for _ in 0..config.max_line_search_iters {
            if r_new_norm < r_norm {
                break;
            }
            alpha *= config.line_search_beta;
            x_new = &x + alpha * &dx;
            r_new = residual_fn(&x_new)?;
            r_new_norm = ensure_finite(r_new.norm(), "residual norm")?;
        }

        x = x_new;
        r = r_new;
        r_norm = r_new_norm;
        debug!(iteration = iter, residual = r_norm, alpha, "newton iteration");

        if alpha < 1e-10 {
            return Err(FemError::ConvergenceFailed {
                what: format!("Line search stagnated at iteration {}", iter),
            });
        }
    }

    Err(FemError::ConvergenceFailed {
        what: format!(
            "Maximum iterations {} reached, residual = {}",
            config.max_iterations, r_norm
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_quadratic() {
        // Solve x^2 - 4 = 0 from x0 = 3
        let residual = |x: &DVector<f64>| -> FemResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };
        let jacobian = |x: &DVector<f64>| -> FemResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };

        let x0 = DVector::from_element(1, 3.0);
        let config = NewtonConfig::default();
        let result = newton_solve(x0, residual, jacobian, &config).unwrap();

        assert!(result.converged);
        assert!((result.x[0] - 2.0).abs() < 1e-8);
    }

    #[test]
    fn coupled_system() {
        // x^2 + y^2 = 5, x y = 2 has a root at (2, 1)
        let residual = |x: &DVector<f64>| -> FemResult<DVector<f64>> {
            Ok(DVector::from_column_slice(&[
                x[0] * x[0] + x[1] * x[1] - 5.0,
                x[0] * x[1] - 2.0,
            ]))
        };
        let jacobian = |x: &DVector<f64>| -> FemResult<DMatrix<f64>> {
            Ok(DMatrix::from_row_slice(
                2,
                2,
                &[2.0 * x[0], 2.0 * x[1], x[1], x[0]],
            ))
        };

        let x0 = DVector::from_column_slice(&[3.0, 0.5]);
        let result = newton_solve(x0, residual, jacobian, &NewtonConfig::default()).unwrap();
        assert!(result.converged);
        assert!((result.x[0] - 2.0).abs() < 1e-7);
        assert!((result.x[1] - 1.0).abs() < 1e-7);
    }

    #[test]
    fn iteration_cap_is_fatal() {
        // Residual that never shrinks below the tolerance
        let residual =
            |_: &DVector<f64>| -> FemResult<DVector<f64>> { Ok(DVector::from_element(1, 1.0)) };
        let jacobian =
            |_: &DVector<f64>| -> FemResult<DMatrix<f64>> { Ok(DMatrix::from_element(1, 1, 1.0)) };

        let config = NewtonConfig {
            max_iterations: 3,
            ..Default::default()
        };
        let err = newton_solve(DVector::from_element(1, 0.0), residual, jacobian, &config)
            .unwrap_err();
        assert!(matches!(err, FemError::ConvergenceFailed { .. }));
    }

    #[test]
    fn non_finite_residual_is_an_error() {
        let residual =
            |_: &DVector<f64>| -> FemResult<DVector<f64>> { Ok(DVector::from_element(1, f64::NAN)) };
        let jacobian =
            |_: &DVector<f64>| -> FemResult<DMatrix<f64>> { Ok(DMatrix::from_element(1, 1, 1.0)) };
        let err = newton_solve(
            DVector::from_element(1, 1.0),
            residual,
            jacobian,
            &NewtonConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FemError::Core(_)));
    }
}
