//! Lagrange basis functions on the reference triangle.

use crate::error::{FemError, FemResult};
use crate::quadrature::QuadratureRule;

/// Number of local basis functions for a supported degree.
pub fn basis_count(degree: usize) -> FemResult<usize> {
    match degree {
        1 => Ok(3),
        2 => Ok(6),
        _ => Err(FemError::UnsupportedDegree { degree }),
    }
}

/// Basis values and reference-space gradients tabulated at quadrature points.
/// Indexed `[point][basis]`.
#[derive(Debug, Clone)]
pub struct BasisTable {
    pub count: usize,
    pub values: Vec<Vec<f64>>,
    pub grads: Vec<Vec<[f64; 2]>>,
}

/// Tabulate a Lagrange basis of the given degree at the rule's points.
///
/// Local ordering: vertices first; for degree two, edge-midpoint functions
/// follow, with midpoint `3 + k` sitting on the edge opposite vertex `k`.
pub fn tabulate(degree: usize, rule: &QuadratureRule) -> FemResult<BasisTable> {
    let count = basis_count(degree)?;
    let mut values = Vec::with_capacity(rule.len());
    let mut grads = Vec::with_capacity(rule.len());
    for p in &rule.points {
        let (v, g) = eval_basis(degree, p[0], p[1])?;
        values.push(v);
        grads.push(g);
    }
    Ok(BasisTable {
        count,
        values,
        grads,
    })
}

/// Evaluate all basis functions and their reference gradients at one point.
pub fn eval_basis(degree: usize, xi: f64, eta: f64) -> FemResult<(Vec<f64>, Vec<[f64; 2]>)> {
    let lam0 = 1.0 - xi - eta;
    match degree {
        1 => Ok((
            vec![lam0, xi, eta],
            vec![[-1.0, -1.0], [1.0, 0.0], [0.0, 1.0]],
        )),
        2 => {
            let values = vec![
                lam0 * (2.0 * lam0 - 1.0),
                xi * (2.0 * xi - 1.0),
                eta * (2.0 * eta - 1.0),
                4.0 * xi * eta,
                4.0 * eta * lam0,
                4.0 * lam0 * xi,
            ];
            let grads = vec![
                [1.0 - 4.0 * lam0, 1.0 - 4.0 * lam0],
                [4.0 * xi - 1.0, 0.0],
                [0.0, 4.0 * eta - 1.0],
                [4.0 * eta, 4.0 * xi],
                [-4.0 * eta, 4.0 * (lam0 - eta)],
                [4.0 * (lam0 - xi), -4.0 * xi],
            ];
            Ok((values, grads))
        }
        _ => Err(FemError::UnsupportedDegree { degree }),
    }
}
