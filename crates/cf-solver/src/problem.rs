//! Problem parameters for the differentially heated cavity.

use crate::error::{SolverError, SolverResult};
use cf_fem::{MixedSpace, TriangleMesh};

/// Dimensionless physical numbers and discretization settings.
///
/// Defaults are the benchmark set for the differentially heated square
/// cavity: `Ra = 1e6`, `Pr = 0.71`, `Re = 1`, hot/cold walls at `+-0.5`,
/// gravity pointing down.
#[derive(Debug, Clone)]
pub struct Parameters {
    /// Rayleigh number
    pub ra: f64,
    /// Prandtl number
    pub pr: f64,
    /// Reynolds number
    pub re: f64,
    /// Thermal conductivity ratio
    pub k: f64,
    /// Dynamic viscosity
    pub mu: f64,
    /// Gravity direction
    pub g: [f64; 2],
    /// Hot wall temperature
    pub theta_h: f64,
    /// Cold wall temperature
    pub theta_c: f64,
    /// Pressure stabilization coefficient; must be small and strictly
    /// positive, since no Dirichlet data is imposed on the pressure
    pub gamma: f64,
    /// Final simulation time
    pub final_time: f64,
    /// Number of fixed time steps
    pub num_steps: usize,
    /// Iteration cap of the explicit Newton strategy
    pub max_newton_iterations: usize,
    /// Global mesh bisection levels; cells per side is `2^mesh_levels`
    pub mesh_levels: u32,
    /// Pressure interpolation degree
    pub pressure_degree: usize,
    /// Temperature interpolation degree
    pub temperature_degree: usize,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            ra: 1.0e6,
            pr: 0.71,
            re: 1.0,
            k: 1.0,
            mu: 1.0,
            g: [0.0, -1.0],
            theta_h: 0.5,
            theta_c: -0.5,
            gamma: 1.0e-7,
            final_time: 1.0e-5,
            num_steps: 2,
            max_newton_iterations: 50,
            mesh_levels: 4,
            pressure_degree: 1,
            temperature_degree: 1,
        }
    }
}

impl Parameters {
    /// Fixed time-step size.
    pub fn dt(&self) -> f64 {
        self.final_time / self.num_steps as f64
    }

    /// Convergence tolerance of the explicit Newton strategy.
    pub fn newton_tolerance(&self) -> f64 {
        0.1 * self.gamma
    }

    /// Velocity interpolation degree, one above the pressure degree.
    pub fn velocity_degree(&self) -> usize {
        self.pressure_degree + 1
    }

    /// Buoyancy coefficient `Ra / (Pr Re^2)`.
    pub fn buoyancy_factor(&self) -> f64 {
        self.ra / (self.pr * self.re * self.re)
    }

    /// Cells per side of the structured mesh.
    pub fn cells_per_side(&self) -> usize {
        1 << self.mesh_levels
    }

    /// Reject invalid configurations before any solve begins.
    pub fn validate(&self) -> SolverResult<()> {
        if !(self.gamma > 0.0) {
            return Err(SolverError::Config {
                what: "gamma must be strictly positive",
            });
        }
        if !(self.final_time > 0.0) {
            return Err(SolverError::Config {
                what: "final_time must be positive",
            });
        }
        if self.num_steps == 0 {
            return Err(SolverError::Config {
                what: "num_steps must be positive",
            });
        }
        if self.theta_h == self.theta_c {
            return Err(SolverError::Config {
                what: "wall temperatures must differ",
            });
        }
        if self.max_newton_iterations == 0 {
            return Err(SolverError::Config {
                what: "max_newton_iterations must be positive",
            });
        }
        if !(self.pr > 0.0) {
            return Err(SolverError::Config {
                what: "Prandtl number must be positive",
            });
        }
        if self.re == 0.0 {
            return Err(SolverError::Config {
                what: "Reynolds number must be nonzero",
            });
        }
        Ok(())
    }
}

/// Build the mixed space for the unit-square cavity described by the
/// parameters.
pub fn cavity_space(params: &Parameters) -> SolverResult<MixedSpace> {
    let mesh = TriangleMesh::unit_square(params.cells_per_side())?;
    let space = MixedSpace::new(
        mesh,
        params.velocity_degree(),
        params.pressure_degree,
        params.temperature_degree,
    )?;
    Ok(space)
}
