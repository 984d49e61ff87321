//! Per-time-step solve strategies.

use crate::boundary::DirichletSet;
use crate::error::{SolverError, SolverResult};
use crate::forms::WeakForms;
use crate::problem::Parameters;
use crate::state::State;
use cf_core::ensure_finite;
use cf_fem::newton::{NewtonConfig, newton_solve};
use cf_fem::space::MixedSpace;
use cf_fem::{FemError, h1_norm, solve_dense};
use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// Outcome of one converged time step.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub state: State,
    pub iterations: usize,
    pub residual_norm: f64,
}

/// A strategy producing the next coupled state from the previous one.
///
/// Selected once at configuration time; both implementations consume the
/// previous snapshot and return a fresh state, so the driver can thread the
/// evolving field explicitly through its loop.
pub trait StepSolver {
    fn advance(&mut self, previous: &State, step: usize) -> SolverResult<StepReport>;
}

/// Direct strategy: hand the coupled residual and its consistent tangent to
/// the backend nonlinear solve, which owns iteration and tolerance policy.
///
/// Backend failure to converge is fatal for the step and propagated with
/// the time index; nothing is retried here.
pub struct DirectStep<'a> {
    forms: WeakForms<'a>,
    bcs: DirichletSet,
    config: NewtonConfig,
    working: DVector<f64>,
}

impl<'a> DirectStep<'a> {
    pub fn new(space: &'a MixedSpace, params: &Parameters, initial: &State) -> SolverResult<Self> {
        Ok(Self {
            forms: WeakForms::new(space, params)?,
            bcs: DirichletSet::physical(space, params),
            config: NewtonConfig::default(),
            working: initial.coeffs().clone(),
        })
    }

    pub fn with_config(mut self, config: NewtonConfig) -> Self {
        self.config = config;
        self
    }
}

impl StepSolver for DirectStep<'_> {
    fn advance(&mut self, previous: &State, step: usize) -> SolverResult<StepReport> {
        let prev = previous.coeffs();
        let forms = &self.forms;
        let bcs = &self.bcs;

        let residual_fn = |w: &DVector<f64>| -> Result<DVector<f64>, FemError> {
            let mut r = forms.residual(w, prev);
            bcs.constrain_residual(w, &mut r);
            Ok(r)
        };
        let jacobian_fn = |w: &DVector<f64>| -> Result<DMatrix<f64>, FemError> {
            let mut a = forms.tangent(w);
            bcs.constrain_matrix(&mut a);
            Ok(a)
        };

        let result = newton_solve(self.working.clone(), residual_fn, jacobian_fn, &self.config)
            .map_err(|source| SolverError::Backend { step, source })?;
        debug!(
            step,
            iterations = result.iterations,
            residual = result.residual_norm,
            "backend solve converged"
        );

        // Keep the converged state as the next step's starting guess.
        self.working = result.x.clone();
        Ok(StepReport {
            state: State::from_coeffs(result.x),
            iterations: result.iterations,
            residual_norm: result.residual_norm,
        })
    }
}

/// Explicitly linearized strategy: assemble the hand-expanded tangent and
/// the residual at the current iterate, solve for an increment under
/// homogeneous wall data, and subtract it until the H1 norm of the
/// increment drops below `0.1 gamma`.
///
/// The iterate deliberately carries over from one time step to the next, so
/// step n+1 starts from step n's converged state rather than from a fresh
/// copy of the previous field. Resetting it each step would be equally
/// defensible but changes iteration counts.
pub struct NewtonStep<'a> {
    forms: WeakForms<'a>,
    bcs: DirichletSet,
    tolerance: f64,
    max_iterations: usize,
    iterate: DVector<f64>,
    history: Vec<f64>,
}

impl<'a> NewtonStep<'a> {
    pub fn new(space: &'a MixedSpace, params: &Parameters, initial: &State) -> SolverResult<Self> {
        Ok(Self {
            forms: WeakForms::new(space, params)?,
            bcs: DirichletSet::homogeneous(space),
            tolerance: params.newton_tolerance(),
            max_iterations: params.max_newton_iterations,
            iterate: initial.coeffs().clone(),
            history: Vec::new(),
        })
    }

    /// Increment norms recorded by the most recent `advance` call.
    pub fn residual_history(&self) -> &[f64] {
        &self.history
    }
}

impl StepSolver for NewtonStep<'_> {
    fn advance(&mut self, previous: &State, step: usize) -> SolverResult<StepReport> {
        self.history.clear();
        let prev = previous.coeffs();

        for k in 0..self.max_iterations {
            let mut tangent = self.forms.tangent(&self.iterate);
            self.bcs.constrain_matrix(&mut tangent);
            let mut rhs = self.forms.residual(&self.iterate, prev);
            self.bcs.zero_rows(&mut rhs);

            let increment = solve_dense(tangent, &rhs).map_err(|source| {
                SolverError::LinearSolve {
                    step,
                    iteration: k,
                    source,
                }
            })?;

            // The tangent right-hand side is the residual at the iterate,
            // so the update direction is the negative of the increment.
            self.iterate -= &increment;

            let norm = h1_norm(self.forms.space(), &increment)?;
            ensure_finite(norm, "increment norm").map_err(FemError::from)?;
            self.history.push(norm);
            debug!(step, iteration = k, residual = norm, "newton update");

            if norm < self.tolerance {
                return Ok(StepReport {
                    state: State::from_coeffs(self.iterate.clone()),
                    iterations: k + 1,
                    residual_norm: norm,
                });
            }
        }

        Err(SolverError::NewtonExhausted {
            step,
            iterations: self.max_iterations,
            residual: self.history.last().copied().unwrap_or(f64::INFINITY),
        })
    }
}
