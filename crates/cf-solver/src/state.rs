//! The coupled state vector.

use crate::problem::Parameters;
use cf_fem::MixedSpace;
use nalgebra::DVector;

/// Coefficients of the coupled `(velocity, pressure, temperature)` unknown
/// over the mixed space.
///
/// The fields are owned collectively; they are only mutated through a
/// coupled solve and only read out whole, via the extraction methods.
#[derive(Debug, Clone)]
pub struct State {
    coeffs: DVector<f64>,
}

impl State {
    pub fn from_coeffs(coeffs: DVector<f64>) -> Self {
        Self { coeffs }
    }

    /// Homogeneous zero field.
    pub fn rest(space: &MixedSpace) -> Self {
        Self {
            coeffs: DVector::zeros(space.dof_count()),
        }
    }

    /// Fluid at rest with the wall-to-wall linear conduction temperature
    /// profile `theta_h + x (theta_c - theta_h)`.
    pub fn conduction(space: &MixedSpace, params: &Parameters) -> Self {
        let mut coeffs = DVector::zeros(space.dof_count());
        let profile = space
            .temperature()
            .interpolate(|x, _| params.theta_h + x * (params.theta_c - params.theta_h));
        for (d, value) in profile.into_iter().enumerate() {
            coeffs[space.temperature_dof(d)] = value;
        }
        Self { coeffs }
    }

    pub fn coeffs(&self) -> &DVector<f64> {
        &self.coeffs
    }

    /// Velocity nodal values, interleaved `[vx, vy]` per dof.
    pub fn velocity_values(&self, space: &MixedSpace) -> Vec<f64> {
        let n = space.velocity().dof_count();
        let mut values = Vec::with_capacity(2 * n);
        for d in 0..n {
            values.push(self.coeffs[space.velocity_dof(0, d)]);
            values.push(self.coeffs[space.velocity_dof(1, d)]);
        }
        values
    }

    pub fn pressure_values(&self, space: &MixedSpace) -> Vec<f64> {
        (0..space.pressure().dof_count())
            .map(|d| self.coeffs[space.pressure_dof(d)])
            .collect()
    }

    pub fn temperature_values(&self, space: &MixedSpace) -> Vec<f64> {
        (0..space.temperature().dof_count())
            .map(|d| self.coeffs[space.temperature_dof(d)])
            .collect()
    }
}
