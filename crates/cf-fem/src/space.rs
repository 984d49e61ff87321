//! Scalar and mixed Lagrange function spaces.

use crate::element::basis_count;
use crate::error::FemResult;
use crate::mesh::TriangleMesh;

/// Scalar Lagrange space on a triangle mesh.
///
/// Degree one carries a dof per vertex; degree two adds a dof per edge
/// midpoint. Per-cell dof lists follow the local basis ordering of
/// [`crate::element::eval_basis`].
#[derive(Debug, Clone)]
pub struct ScalarSpace {
    degree: usize,
    dof_count: usize,
    cell_dofs: Vec<Vec<usize>>,
    dof_coords: Vec<[f64; 2]>,
}

impl ScalarSpace {
    pub fn new(mesh: &TriangleMesh, degree: usize) -> FemResult<Self> {
        let local = basis_count(degree)?;
        let nv = mesh.vertex_count();
        let dof_count = if degree == 1 {
            nv
        } else {
            nv + mesh.edge_count()
        };

        let mut cell_dofs = Vec::with_capacity(mesh.cell_count());
        for c in 0..mesh.cell_count() {
            let verts = mesh.cell(c);
            let mut dofs = Vec::with_capacity(local);
            dofs.extend_from_slice(&verts);
            if degree == 2 {
                for e in mesh.cell_edges(c) {
                    dofs.push(nv + e);
                }
            }
            cell_dofs.push(dofs);
        }

        let mut dof_coords = Vec::with_capacity(dof_count);
        for v in 0..nv {
            dof_coords.push(mesh.vertex(v));
        }
        if degree == 2 {
            for e in 0..mesh.edge_count() {
                dof_coords.push(mesh.edge_midpoint(e));
            }
        }

        Ok(Self {
            degree,
            dof_count,
            cell_dofs,
            dof_coords,
        })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn dof_count(&self) -> usize {
        self.dof_count
    }

    pub fn cell_dofs(&self, cell: usize) -> &[usize] {
        &self.cell_dofs[cell]
    }

    pub fn dof_coords(&self) -> &[[f64; 2]] {
        &self.dof_coords
    }

    /// Dofs whose node location satisfies a predicate. Used to turn wall
    /// location predicates into constraint lists.
    pub fn dofs_where(&self, pred: impl Fn(f64, f64) -> bool) -> Vec<usize> {
        self.dof_coords
            .iter()
            .enumerate()
            .filter(|(_, p)| pred(p[0], p[1]))
            .map(|(i, _)| i)
            .collect()
    }

    /// Nodal interpolation of a function onto the space.
    pub fn interpolate(&self, f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
        self.dof_coords.iter().map(|p| f(p[0], p[1])).collect()
    }
}

/// One scalar component of the mixed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldComponent {
    VelocityX,
    VelocityY,
    Pressure,
    Temperature,
}

/// Mixed space for the coupled (velocity, pressure, temperature) unknown.
///
/// The global coefficient vector is laid out in blocks
/// `[u_x | u_y | p | theta]`; both velocity components share one scalar
/// space.
#[derive(Debug, Clone)]
pub struct MixedSpace {
    mesh: TriangleMesh,
    velocity: ScalarSpace,
    pressure: ScalarSpace,
    temperature: ScalarSpace,
}

impl MixedSpace {
    pub fn new(
        mesh: TriangleMesh,
        velocity_degree: usize,
        pressure_degree: usize,
        temperature_degree: usize,
    ) -> FemResult<Self> {
        let velocity = ScalarSpace::new(&mesh, velocity_degree)?;
        let pressure = ScalarSpace::new(&mesh, pressure_degree)?;
        let temperature = ScalarSpace::new(&mesh, temperature_degree)?;
        Ok(Self {
            mesh,
            velocity,
            pressure,
            temperature,
        })
    }

    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    pub fn velocity(&self) -> &ScalarSpace {
        &self.velocity
    }

    pub fn pressure(&self) -> &ScalarSpace {
        &self.pressure
    }

    pub fn temperature(&self) -> &ScalarSpace {
        &self.temperature
    }

    /// Total number of coupled dofs.
    pub fn dof_count(&self) -> usize {
        2 * self.velocity.dof_count() + self.pressure.dof_count() + self.temperature.dof_count()
    }

    /// Global dof of a velocity component (`component` is 0 for x, 1 for y).
    pub fn velocity_dof(&self, component: usize, dof: usize) -> usize {
        debug_assert!(component < 2);
        component * self.velocity.dof_count() + dof
    }

    pub fn pressure_dof(&self, dof: usize) -> usize {
        2 * self.velocity.dof_count() + dof
    }

    pub fn temperature_dof(&self, dof: usize) -> usize {
        2 * self.velocity.dof_count() + self.pressure.dof_count() + dof
    }

    /// Scalar space carrying a component.
    pub fn component_space(&self, component: FieldComponent) -> &ScalarSpace {
        match component {
            FieldComponent::VelocityX | FieldComponent::VelocityY => &self.velocity,
            FieldComponent::Pressure => &self.pressure,
            FieldComponent::Temperature => &self.temperature,
        }
    }

    /// Offset of a component's block in the global coefficient vector.
    pub fn component_offset(&self, component: FieldComponent) -> usize {
        match component {
            FieldComponent::VelocityX => 0,
            FieldComponent::VelocityY => self.velocity.dof_count(),
            FieldComponent::Pressure => 2 * self.velocity.dof_count(),
            FieldComponent::Temperature => {
                2 * self.velocity.dof_count() + self.pressure.dof_count()
            }
        }
    }
}
