//! Weak forms of the coupled cavity equations.
//!
//! The implicit time discretization couples momentum, stabilized
//! incompressibility and energy transport into one residual over the mixed
//! space. The tangent is expanded by hand and shared by both step
//! strategies; a directional-derivative test keeps it consistent with the
//! residual.

use crate::error::SolverResult;
use crate::problem::Parameters;
use cf_fem::element::{BasisTable, tabulate};
use cf_fem::mesh::CellGeometry;
use cf_fem::quadrature::{QuadratureRule, triangle_rule};
use cf_fem::space::MixedSpace;
use nalgebra::{DMatrix, DVector};

fn dot(a: [f64; 2], b: [f64; 2]) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}

/// Viscous stress pairing `2 mu <sym(grad u), sym(grad v)>`.
fn stress_pairing(mu: f64, gu: &[[f64; 2]; 2], gv: &[[f64; 2]; 2]) -> f64 {
    let u_sym = 0.5 * (gu[0][1] + gu[1][0]);
    let v_sym = 0.5 * (gv[0][1] + gv[1][0]);
    2.0 * mu * (gu[0][0] * gv[0][0] + gu[1][1] * gv[1][1] + 2.0 * u_sym * v_sym)
}

/// Incompressibility pairing `-(div u) q`; also the momentum pressure term.
fn divergence_coupling(div_u: f64, q: f64) -> f64 {
    -div_u * q
}

/// Divergence-form transport `((div w) z) . v`.
///
/// This is deliberately the divergence of the transporting field times the
/// transported one, not the advective `(w . grad) z` form; the hand
/// linearization below depends on it.
fn divergence_transport(div_w: f64, z: [f64; 2], v: [f64; 2]) -> f64 {
    div_w * dot(z, v)
}

/// Buoyancy force `theta * Ra/(Pr Re^2) * g`, linear in the temperature.
fn buoyancy(theta: f64, factor: f64, gravity: [f64; 2]) -> [f64; 2] {
    [theta * factor * gravity[0], theta * factor * gravity[1]]
}

/// Mixed-field values and gradients at one quadrature point.
#[derive(Debug, Clone, Copy, Default)]
struct PointState {
    u: [f64; 2],
    u_prev: [f64; 2],
    gu: [[f64; 2]; 2],
    div_u: f64,
    p: f64,
    th: f64,
    th_prev: f64,
    gth: [f64; 2],
}

/// Assembler for the coupled residual and its tangent.
pub struct WeakForms<'a> {
    space: &'a MixedSpace,
    params: Parameters,
    rule: QuadratureRule,
    tab_u: BasisTable,
    tab_p: BasisTable,
    tab_t: BasisTable,
}

impl<'a> WeakForms<'a> {
    pub fn new(space: &'a MixedSpace, params: &Parameters) -> SolverResult<Self> {
        let rule = triangle_rule();
        let tab_u = tabulate(space.velocity().degree(), &rule)?;
        let tab_p = tabulate(space.pressure().degree(), &rule)?;
        let tab_t = tabulate(space.temperature().degree(), &rule)?;
        Ok(Self {
            space,
            params: params.clone(),
            rule,
            tab_u,
            tab_p,
            tab_t,
        })
    }

    pub fn space(&self) -> &MixedSpace {
        self.space
    }

    /// Physical basis gradients of one tabulated basis at one point.
    fn physical_grads(geo: &CellGeometry, table: &BasisTable, iq: usize, out: &mut Vec<[f64; 2]>) {
        out.clear();
        for g in &table.grads[iq] {
            out.push(geo.physical_grad(*g));
        }
    }

    /// Evaluate the mixed field (and optionally the previous one) at a
    /// quadrature point from gathered cell dofs.
    #[allow(clippy::too_many_arguments)]
    fn point_state(
        &self,
        w: &DVector<f64>,
        w_prev: Option<&DVector<f64>>,
        iq: usize,
        udofs: &[usize],
        pdofs: &[usize],
        tdofs: &[usize],
        gu_phys: &[[f64; 2]],
        gt_phys: &[[f64; 2]],
    ) -> PointState {
        let space = self.space;
        let mut s = PointState::default();
        for (a, &dof) in udofs.iter().enumerate() {
            let phi = self.tab_u.values[iq][a];
            let g = gu_phys[a];
            let cx = w[space.velocity_dof(0, dof)];
            let cy = w[space.velocity_dof(1, dof)];
            s.u[0] += cx * phi;
            s.u[1] += cy * phi;
            s.gu[0][0] += cx * g[0];
            s.gu[0][1] += cx * g[1];
            s.gu[1][0] += cy * g[0];
            s.gu[1][1] += cy * g[1];
            if let Some(prev) = w_prev {
                s.u_prev[0] += prev[space.velocity_dof(0, dof)] * phi;
                s.u_prev[1] += prev[space.velocity_dof(1, dof)] * phi;
            }
        }
        s.div_u = s.gu[0][0] + s.gu[1][1];
        for (a, &dof) in pdofs.iter().enumerate() {
            s.p += w[space.pressure_dof(dof)] * self.tab_p.values[iq][a];
        }
        for (a, &dof) in tdofs.iter().enumerate() {
            let chi = self.tab_t.values[iq][a];
            let g = gt_phys[a];
            let ct = w[space.temperature_dof(dof)];
            s.th += ct * chi;
            s.gth[0] += ct * g[0];
            s.gth[1] += ct * g[1];
            if let Some(prev) = w_prev {
                s.th_prev += prev[space.temperature_dof(dof)] * chi;
            }
        }
        s
    }

    /// The coupled residual
    ///
    /// ```text
    /// F(w) = b(u,q) - gamma p q
    ///      + (u - u_n)/dt . v + c(u,u,v) + a(mu,u,v) + b(v,p) - f_B(theta) . v
    ///      + (theta - theta_n)/dt phi - (u . grad phi) theta + (K/Pr) grad theta . grad phi
    /// ```
    ///
    /// evaluated against every test function, with `(u_n, theta_n)` taken
    /// from the previous time step.
    pub fn residual(&self, w: &DVector<f64>, w_prev: &DVector<f64>) -> DVector<f64> {
        let space = self.space;
        let mesh = space.mesh();
        let prm = &self.params;
        let dt = prm.dt();
        let kpr = prm.k / prm.pr;
        let factor = prm.buoyancy_factor();

        let mut r = DVector::zeros(space.dof_count());
        let mut gu_phys: Vec<[f64; 2]> = Vec::with_capacity(self.tab_u.count);
        let mut gt_phys: Vec<[f64; 2]> = Vec::with_capacity(self.tab_t.count);

        for cell in 0..mesh.cell_count() {
            let geo = CellGeometry::new(mesh, cell);
            let udofs = space.velocity().cell_dofs(cell);
            let pdofs = space.pressure().cell_dofs(cell);
            let tdofs = space.temperature().cell_dofs(cell);

            for iq in 0..self.rule.len() {
                let wq = self.rule.weights[iq] * geo.det();
                Self::physical_grads(&geo, &self.tab_u, iq, &mut gu_phys);
                Self::physical_grads(&geo, &self.tab_t, iq, &mut gt_phys);
                let s = self.point_state(w, Some(w_prev), iq, udofs, pdofs, tdofs, &gu_phys, &gt_phys);
                let buoy = buoyancy(s.th, factor, prm.g);

                // Momentum rows, test function `v = phi e_k`
                for (a, &dof) in udofs.iter().enumerate() {
                    let phi = self.tab_u.values[iq][a];
                    let gphi = gu_phys[a];
                    for comp in 0..2 {
                        let mut v = [0.0; 2];
                        v[comp] = phi;
                        let mut gv = [[0.0; 2]; 2];
                        gv[comp] = gphi;
                        let value = dot([s.u[0] - s.u_prev[0], s.u[1] - s.u_prev[1]], v) / dt
                            + divergence_transport(s.div_u, s.u, v)
                            + stress_pairing(prm.mu, &s.gu, &gv)
                            + divergence_coupling(gv[0][0] + gv[1][1], s.p)
                            - dot(buoy, v);
                        r[space.velocity_dof(comp, dof)] += wq * value;
                    }
                }

                // Mass rows with pressure stabilization
                for (a, &dof) in pdofs.iter().enumerate() {
                    let psi = self.tab_p.values[iq][a];
                    let value = divergence_coupling(s.div_u, psi) - prm.gamma * s.p * psi;
                    r[space.pressure_dof(dof)] += wq * value;
                }

                // Energy rows
                for (a, &dof) in tdofs.iter().enumerate() {
                    let chi = self.tab_t.values[iq][a];
                    let gchi = gt_phys[a];
                    let value = (s.th - s.th_prev) / dt * chi - dot(s.u, gchi) * s.th
                        + kpr * dot(s.gth, gchi);
                    r[space.temperature_dof(dof)] += wq * value;
                }
            }
        }
        r
    }

    /// Hand-expanded tangent `A = dF/dw` at the given state:
    ///
    /// ```text
    /// A(dw) = b(du,q) - gamma dp q
    ///       + du/dt . v + c(du,u,v) + c(u,du,v) + a(mu,du,v) + b(v,dp)
    ///       - dtheta Ra/(Pr Re^2) g . v
    ///       + dtheta/dt phi - (u . grad phi) dtheta - (du . grad phi) theta
    ///       + (K/Pr) grad dtheta . grad phi
    /// ```
    pub fn tangent(&self, w: &DVector<f64>) -> DMatrix<f64> {
        let space = self.space;
        let mesh = space.mesh();
        let prm = &self.params;
        let dt = prm.dt();
        let kpr = prm.k / prm.pr;
        let factor = prm.buoyancy_factor();

        let n = space.dof_count();
        let mut mat = DMatrix::zeros(n, n);
        let mut gu_phys: Vec<[f64; 2]> = Vec::with_capacity(self.tab_u.count);
        let mut gt_phys: Vec<[f64; 2]> = Vec::with_capacity(self.tab_t.count);

        for cell in 0..mesh.cell_count() {
            let geo = CellGeometry::new(mesh, cell);
            let udofs = space.velocity().cell_dofs(cell);
            let pdofs = space.pressure().cell_dofs(cell);
            let tdofs = space.temperature().cell_dofs(cell);

            for iq in 0..self.rule.len() {
                let wq = self.rule.weights[iq] * geo.det();
                Self::physical_grads(&geo, &self.tab_u, iq, &mut gu_phys);
                Self::physical_grads(&geo, &self.tab_t, iq, &mut gt_phys);
                let s = self.point_state(w, None, iq, udofs, pdofs, tdofs, &gu_phys, &gt_phys);

                // Momentum rows
                for (a, &dof_a) in udofs.iter().enumerate() {
                    let phi_a = self.tab_u.values[iq][a];
                    let gphi_a = gu_phys[a];
                    for comp_a in 0..2 {
                        let row = space.velocity_dof(comp_a, dof_a);
                        let mut v = [0.0; 2];
                        v[comp_a] = phi_a;
                        let mut gv = [[0.0; 2]; 2];
                        gv[comp_a] = gphi_a;

                        // velocity trial functions `du = phi e_j`
                        for (b, &dof_b) in udofs.iter().enumerate() {
                            let phi_b = self.tab_u.values[iq][b];
                            let gphi_b = gu_phys[b];
                            for comp_b in 0..2 {
                                let col = space.velocity_dof(comp_b, dof_b);
                                let mut du = [0.0; 2];
                                du[comp_b] = phi_b;
                                let mut gdu = [[0.0; 2]; 2];
                                gdu[comp_b] = gphi_b;
                                let div_du = gphi_b[comp_b];
                                let value = dot(du, v) / dt
                                    + divergence_transport(div_du, s.u, v)
                                    + divergence_transport(s.div_u, du, v)
                                    + stress_pairing(prm.mu, &gdu, &gv);
                                mat[(row, col)] += wq * value;
                            }
                        }

                        // pressure trial: b(v, dp)
                        let div_v = gv[0][0] + gv[1][1];
                        for (b, &dof_b) in pdofs.iter().enumerate() {
                            let psi_b = self.tab_p.values[iq][b];
                            mat[(row, space.pressure_dof(dof_b))] +=
                                wq * divergence_coupling(div_v, psi_b);
                        }

                        // temperature trial: buoyancy coupling
                        for (b, &dof_b) in tdofs.iter().enumerate() {
                            let chi_b = self.tab_t.values[iq][b];
                            let dbuoy = buoyancy(chi_b, factor, prm.g);
                            mat[(row, space.temperature_dof(dof_b))] -= wq * dot(dbuoy, v);
                        }
                    }
                }

                // Mass rows
                for (a, &dof_a) in pdofs.iter().enumerate() {
                    let psi_a = self.tab_p.values[iq][a];
                    let row = space.pressure_dof(dof_a);
                    for (b, &dof_b) in udofs.iter().enumerate() {
                        let gphi_b = gu_phys[b];
                        for comp_b in 0..2 {
                            let col = space.velocity_dof(comp_b, dof_b);
                            mat[(row, col)] += wq * divergence_coupling(gphi_b[comp_b], psi_a);
                        }
                    }
                    for (b, &dof_b) in pdofs.iter().enumerate() {
                        let psi_b = self.tab_p.values[iq][b];
                        mat[(row, space.pressure_dof(dof_b))] -= wq * prm.gamma * psi_b * psi_a;
                    }
                }

                // Energy rows
                for (a, &dof_a) in tdofs.iter().enumerate() {
                    let chi_a = self.tab_t.values[iq][a];
                    let gchi_a = gt_phys[a];
                    let row = space.temperature_dof(dof_a);
                    for (b, &dof_b) in udofs.iter().enumerate() {
                        let phi_b = self.tab_u.values[iq][b];
                        for comp_b in 0..2 {
                            let col = space.velocity_dof(comp_b, dof_b);
                            mat[(row, col)] -= wq * phi_b * gchi_a[comp_b] * s.th;
                        }
                    }
                    for (b, &dof_b) in tdofs.iter().enumerate() {
                        let chi_b = self.tab_t.values[iq][b];
                        let gchi_b = gt_phys[b];
                        let value = chi_b * chi_a / dt - dot(s.u, gchi_a) * chi_b
                            + kpr * dot(gchi_b, gchi_a);
                        mat[(row, space.temperature_dof(dof_b))] += wq * value;
                    }
                }
            }
        }
        mat
    }

    /// Discrete mass imbalance: `int (div u) psi_i` for every pressure basis
    /// function. At a converged step this is balanced by the stabilization
    /// term, so each entry is bounded by `gamma |p| |psi_i|`.
    pub fn mass_imbalance(&self, w: &DVector<f64>) -> DVector<f64> {
        let space = self.space;
        let mesh = space.mesh();
        let mut d = DVector::zeros(space.pressure().dof_count());
        let mut gu_phys: Vec<[f64; 2]> = Vec::with_capacity(self.tab_u.count);

        for cell in 0..mesh.cell_count() {
            let geo = CellGeometry::new(mesh, cell);
            let udofs = space.velocity().cell_dofs(cell);
            let pdofs = space.pressure().cell_dofs(cell);

            for iq in 0..self.rule.len() {
                let wq = self.rule.weights[iq] * geo.det();
                Self::physical_grads(&geo, &self.tab_u, iq, &mut gu_phys);
                let mut div_u = 0.0;
                for (a, &dof) in udofs.iter().enumerate() {
                    let g = gu_phys[a];
                    div_u += w[space.velocity_dof(0, dof)] * g[0];
                    div_u += w[space.velocity_dof(1, dof)] * g[1];
                }
                for (a, &dof) in pdofs.iter().enumerate() {
                    d[dof] += wq * div_u * self.tab_p.values[iq][a];
                }
            }
        }
        d
    }
}
