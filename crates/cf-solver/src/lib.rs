//! Coupled solver core for buoyancy-driven cavity flow.
//!
//! Velocity, pressure and temperature are one coupled unknown over a mixed
//! space. This crate builds the weak-form residual of the implicit time
//! discretization together with its hand-expanded tangent, and offers two
//! interchangeable per-step strategies: a backend-policy nonlinear solve and
//! an explicit Newton loop with an increment-norm convergence test.

pub mod boundary;
pub mod error;
pub mod forms;
pub mod problem;
pub mod state;
pub mod step;

pub use boundary::DirichletSet;
pub use error::{SolverError, SolverResult};
pub use forms::WeakForms;
pub use problem::{Parameters, cavity_space};
pub use state::State;
pub use step::{DirectStep, NewtonStep, StepReport, StepSolver};
