//! Field norms and scalar mass matrices.

use crate::element::{BasisTable, tabulate};
use crate::error::FemResult;
use crate::mesh::{CellGeometry, TriangleMesh};
use crate::quadrature::{QuadratureRule, triangle_rule};
use crate::space::{FieldComponent, MixedSpace, ScalarSpace};
use nalgebra::{DMatrix, DVector};

/// L2 and H1-seminorm squares of one scalar component.
fn scalar_norm_squares(
    mesh: &TriangleMesh,
    space: &ScalarSpace,
    table: &BasisTable,
    rule: &QuadratureRule,
    coeff: impl Fn(usize) -> f64,
) -> (f64, f64) {
    let mut l2_sq = 0.0;
    let mut semi_sq = 0.0;
    for c in 0..mesh.cell_count() {
        let geo = CellGeometry::new(mesh, c);
        let dofs = space.cell_dofs(c);
        for (iq, wq) in rule.weights.iter().enumerate() {
            let w = wq * geo.det();
            let mut val = 0.0;
            let mut grad = [0.0, 0.0];
            for (a, &dof) in dofs.iter().enumerate() {
                let ca = coeff(dof);
                val += ca * table.values[iq][a];
                let g = geo.physical_grad(table.grads[iq][a]);
                grad[0] += ca * g[0];
                grad[1] += ca * g[1];
            }
            l2_sq += w * val * val;
            semi_sq += w * (grad[0] * grad[0] + grad[1] * grad[1]);
        }
    }
    (l2_sq, semi_sq)
}

const COMPONENTS: [FieldComponent; 4] = [
    FieldComponent::VelocityX,
    FieldComponent::VelocityY,
    FieldComponent::Pressure,
    FieldComponent::Temperature,
];

/// H1 (energy) norm of a mixed-field coefficient vector, summed over all
/// scalar components: `sqrt(int |w|^2 + |grad w|^2)`.
pub fn h1_norm(space: &MixedSpace, coeffs: &DVector<f64>) -> FemResult<f64> {
    let rule = triangle_rule();
    let mut total = 0.0;
    for comp in COMPONENTS {
        let sspace = space.component_space(comp);
        let table = tabulate(sspace.degree(), &rule)?;
        let offset = space.component_offset(comp);
        let (l2_sq, semi_sq) =
            scalar_norm_squares(space.mesh(), sspace, &table, &rule, |d| coeffs[offset + d]);
        total += l2_sq + semi_sq;
    }
    Ok(total.sqrt())
}

/// L2 norm of one scalar component of a mixed-field coefficient vector.
pub fn component_l2_norm(
    space: &MixedSpace,
    coeffs: &DVector<f64>,
    component: FieldComponent,
) -> FemResult<f64> {
    let rule = triangle_rule();
    let sspace = space.component_space(component);
    let table = tabulate(sspace.degree(), &rule)?;
    let offset = space.component_offset(component);
    let (l2_sq, _) =
        scalar_norm_squares(space.mesh(), sspace, &table, &rule, |d| coeffs[offset + d]);
    Ok(l2_sq.sqrt())
}

/// Mass matrix `M_ij = int phi_i phi_j` of a scalar space. The diagonal
/// carries the squared L2 norms of the basis functions.
pub fn mass_matrix(mesh: &TriangleMesh, space: &ScalarSpace) -> FemResult<DMatrix<f64>> {
    let rule = triangle_rule();
    let table = tabulate(space.degree(), &rule)?;
    let n = space.dof_count();
    let mut m = DMatrix::zeros(n, n);
    for c in 0..mesh.cell_count() {
        let geo = CellGeometry::new(mesh, c);
        let dofs = space.cell_dofs(c);
        for (iq, wq) in rule.weights.iter().enumerate() {
            let w = wq * geo.det();
            for (a, &da) in dofs.iter().enumerate() {
                for (b, &db) in dofs.iter().enumerate() {
                    m[(da, db)] += w * table.values[iq][a] * table.values[iq][b];
                }
            }
        }
    }
    Ok(m)
}
