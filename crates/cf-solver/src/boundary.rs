//! Wall location predicates and Dirichlet constraint sets.

use crate::problem::Parameters;
use cf_fem::MixedSpace;
use nalgebra::{DMatrix, DVector};

const WALL_TOL: f64 = 1e-12;

fn near(a: f64, b: f64) -> bool {
    (a - b).abs() < WALL_TOL
}

pub fn on_hot_wall(x: f64, _y: f64) -> bool {
    near(x, 0.0)
}

pub fn on_cold_wall(x: f64, _y: f64) -> bool {
    near(x, 1.0)
}

pub fn on_adiabatic_wall(_x: f64, y: f64) -> bool {
    near(y, 0.0) || near(y, 1.0)
}

pub fn on_any_wall(x: f64, y: f64) -> bool {
    on_hot_wall(x, y) || on_cold_wall(x, y) || on_adiabatic_wall(x, y)
}

/// One prescribed dof value.
#[derive(Debug, Clone, Copy)]
pub struct Constraint {
    pub dof: usize,
    pub value: f64,
}

/// A set of Dirichlet constraints, switched wholesale per strategy.
#[derive(Debug, Clone)]
pub struct DirichletSet {
    constraints: Vec<Constraint>,
}

impl DirichletSet {
    /// The physical wall data: no-slip velocity and zero pressure on every
    /// wall, prescribed hot/cold wall temperatures. The adiabatic walls keep
    /// the natural zero-flux condition for the temperature.
    pub fn physical(space: &MixedSpace, params: &Parameters) -> Self {
        let mut constraints = Vec::new();
        for component in 0..2 {
            for d in space.velocity().dofs_where(on_any_wall) {
                constraints.push(Constraint {
                    dof: space.velocity_dof(component, d),
                    value: 0.0,
                });
            }
        }
        for d in space.pressure().dofs_where(on_any_wall) {
            constraints.push(Constraint {
                dof: space.pressure_dof(d),
                value: 0.0,
            });
        }
        for d in space.temperature().dofs_where(on_hot_wall) {
            constraints.push(Constraint {
                dof: space.temperature_dof(d),
                value: params.theta_h,
            });
        }
        for d in space.temperature().dofs_where(on_cold_wall) {
            constraints.push(Constraint {
                dof: space.temperature_dof(d),
                value: params.theta_c,
            });
        }
        Self::from_constraints(constraints)
    }

    /// Homogeneous zero on the whole boundary for every component; the
    /// increment system of the linearized strategy uses this set.
    pub fn homogeneous(space: &MixedSpace) -> Self {
        let mut constraints = Vec::new();
        for component in 0..2 {
            for d in space.velocity().dofs_where(on_any_wall) {
                constraints.push(Constraint {
                    dof: space.velocity_dof(component, d),
                    value: 0.0,
                });
            }
        }
        for d in space.pressure().dofs_where(on_any_wall) {
            constraints.push(Constraint {
                dof: space.pressure_dof(d),
                value: 0.0,
            });
        }
        for d in space.temperature().dofs_where(on_any_wall) {
            constraints.push(Constraint {
                dof: space.temperature_dof(d),
                value: 0.0,
            });
        }
        Self::from_constraints(constraints)
    }

    fn from_constraints(mut constraints: Vec<Constraint>) -> Self {
        constraints.sort_by_key(|c| c.dof);
        constraints.dedup_by_key(|c| c.dof);
        Self { constraints }
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Replace constrained residual rows with the boundary mismatch
    /// `w[dof] - value`.
    pub fn constrain_residual(&self, w: &DVector<f64>, r: &mut DVector<f64>) {
        for c in &self.constraints {
            r[c.dof] = w[c.dof] - c.value;
        }
    }

    /// Replace constrained matrix rows with identity rows.
    pub fn constrain_matrix(&self, a: &mut DMatrix<f64>) {
        for c in &self.constraints {
            a.row_mut(c.dof).fill(0.0);
            a[(c.dof, c.dof)] = 1.0;
        }
    }

    /// Zero the constrained rows of a right-hand side.
    pub fn zero_rows(&self, b: &mut DVector<f64>) {
        for c in &self.constraints {
            b[c.dof] = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::cavity_space;

    fn small_space() -> MixedSpace {
        cavity_space(&Parameters {
            mesh_levels: 1,
            ..Parameters::default()
        })
        .unwrap()
    }

    #[test]
    fn physical_set_pins_walls() {
        let space = small_space();
        let params = Parameters::default();
        let set = DirichletSet::physical(&space, &params);

        // 2x2 mesh: P2 velocity has 16 boundary dofs per component, the P1
        // temperature has 3 dofs on each vertical wall.
        let velocity_constraints = set
            .constraints()
            .iter()
            .filter(|c| c.dof < 2 * space.velocity().dof_count())
            .count();
        assert_eq!(velocity_constraints, 32);

        let hot = space.temperature().dofs_where(on_hot_wall);
        assert_eq!(hot.len(), 3);
        for d in hot {
            let gdof = space.temperature_dof(d);
            let c = set.constraints().iter().find(|c| c.dof == gdof).unwrap();
            assert_eq!(c.value, params.theta_h);
        }

        // Pressure is pinned to zero on the whole boundary.
        let np = space.pressure().dof_count();
        let p0 = space.pressure_dof(0);
        let pressure_constraints: Vec<_> = set
            .constraints()
            .iter()
            .filter(|c| c.dof >= p0 && c.dof < p0 + np)
            .collect();
        assert_eq!(pressure_constraints.len(), 8);
        assert!(pressure_constraints.iter().all(|c| c.value == 0.0));
    }

    #[test]
    fn homogeneous_set_covers_every_component() {
        let space = small_space();
        let set = DirichletSet::homogeneous(&space);
        assert!(set.constraints().iter().all(|c| c.value == 0.0));

        // Pressure boundary dofs are included here, unlike the physical set.
        let pressure_constraints = set
            .constraints()
            .iter()
            .filter(|c| {
                c.dof >= space.pressure_dof(0)
                    && c.dof < space.pressure_dof(0) + space.pressure().dof_count()
            })
            .count();
        assert_eq!(pressure_constraints, 8);
    }

    #[test]
    fn constrained_rows_become_identity() {
        let space = small_space();
        let set = DirichletSet::homogeneous(&space);
        let n = space.dof_count();
        let mut a = DMatrix::from_element(n, n, 2.0);
        let mut b = DVector::from_element(n, 3.0);
        set.constrain_matrix(&mut a);
        set.zero_rows(&mut b);
        let c = set.constraints()[0];
        assert_eq!(a[(c.dof, c.dof)], 1.0);
        assert_eq!(a[(c.dof, (c.dof + 1) % n)], 0.0);
        assert_eq!(b[c.dof], 0.0);
    }
}
