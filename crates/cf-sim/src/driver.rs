//! Transient driver: advances the coupled state step by step.

use crate::error::SimResult;
use crate::progress::StepProgressEvent;
use cf_fem::MixedSpace;
use cf_results::{
    FieldSnapshot, FieldStore, MemorySink, OutputSink, PRESSURE_STREAM, StreamWriter,
    TEMPERATURE_STREAM, VELOCITY_STREAM,
};
use cf_solver::{Parameters, State, StepSolver};
use tracing::info;

/// The three per-field output streams of a run.
pub struct OutputStreams<O: OutputSink> {
    pub velocity: O,
    pub pressure: O,
    pub temperature: O,
}

impl OutputStreams<StreamWriter> {
    /// Streams backed by a run directory.
    pub fn for_store(store: &FieldStore) -> SimResult<Self> {
        Ok(Self {
            velocity: store.writer(VELOCITY_STREAM)?,
            pressure: store.writer(PRESSURE_STREAM)?,
            temperature: store.writer(TEMPERATURE_STREAM)?,
        })
    }
}

impl OutputStreams<MemorySink> {
    pub fn in_memory() -> Self {
        Self {
            velocity: MemorySink::default(),
            pressure: MemorySink::default(),
            temperature: MemorySink::default(),
        }
    }
}

/// Summary of one completed time step.
#[derive(Debug, Clone)]
pub struct StepSummary {
    pub step: usize,
    pub time: f64,
    pub iterations: usize,
    pub residual_norm: f64,
}

/// Record of a completed run.
#[derive(Debug, Clone, Default)]
pub struct RunRecord {
    pub steps: Vec<StepSummary>,
}

/// Advance the coupled state over `num_steps` fixed time steps.
///
/// Each step is tagged with `n * dt`, persisted to the three field streams,
/// and reported through the optional callback as a completed fraction of
/// `final_time`. The previous state is threaded explicitly: every step
/// consumes the last snapshot and produces the next one.
pub fn run<S, O>(
    space: &MixedSpace,
    params: &Parameters,
    solver: &mut S,
    initial: State,
    streams: &mut OutputStreams<O>,
    mut progress: Option<&mut dyn FnMut(&StepProgressEvent)>,
) -> SimResult<RunRecord>
where
    S: StepSolver,
    O: OutputSink,
{
    params.validate()?;

    let dt = params.dt();
    let mut previous = initial;
    let mut record = RunRecord::default();

    for n in 0..params.num_steps {
        let time = n as f64 * dt;
        let report = solver.advance(&previous, n)?;

        streams
            .velocity
            .append(&velocity_snapshot(space, &report.state, n, time))?;
        streams
            .pressure
            .append(&pressure_snapshot(space, &report.state, n, time))?;
        streams
            .temperature
            .append(&temperature_snapshot(space, &report.state, n, time))?;

        info!(
            step = n,
            time,
            iterations = report.iterations,
            residual = report.residual_norm,
            "time step complete"
        );

        let event = StepProgressEvent {
            step: n,
            time,
            fraction_complete: time / params.final_time,
            iterations: report.iterations,
            residual_norm: report.residual_norm,
        };
        if let Some(cb) = progress.as_mut() {
            cb(&event);
        }

        record.steps.push(StepSummary {
            step: n,
            time,
            iterations: report.iterations,
            residual_norm: report.residual_norm,
        });
        previous = report.state;
    }

    Ok(record)
}

fn velocity_snapshot(space: &MixedSpace, state: &State, step: usize, time: f64) -> FieldSnapshot {
    FieldSnapshot {
        field: VELOCITY_STREAM.to_string(),
        step,
        time,
        components: 2,
        points: space.velocity().dof_coords().to_vec(),
        values: state.velocity_values(space),
    }
}

fn pressure_snapshot(space: &MixedSpace, state: &State, step: usize, time: f64) -> FieldSnapshot {
    FieldSnapshot {
        field: PRESSURE_STREAM.to_string(),
        step,
        time,
        components: 1,
        points: space.pressure().dof_coords().to_vec(),
        values: state.pressure_values(space),
    }
}

fn temperature_snapshot(
    space: &MixedSpace,
    state: &State,
    step: usize,
    time: f64,
) -> FieldSnapshot {
    FieldSnapshot {
        field: TEMPERATURE_STREAM.to_string(),
        step,
        time,
        components: 1,
        points: space.temperature().dof_coords().to_vec(),
        values: state.temperature_values(space),
    }
}
