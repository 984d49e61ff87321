//! Progress events for transient runs.

/// Driver progress after a completed time step.
#[derive(Debug, Clone, Default)]
pub struct StepProgressEvent {
    pub step: usize,
    pub time: f64,
    /// `time / final_time`, in `[0, 1]`
    pub fraction_complete: f64,
    /// Iterations the step solver spent on this step
    pub iterations: usize,
    pub residual_norm: f64,
}
