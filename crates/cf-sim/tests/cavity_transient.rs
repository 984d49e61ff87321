//! End-to-end transient runs of the heated cavity benchmark.

use cf_results::{
    FieldStore, PRESSURE_STREAM, TEMPERATURE_STREAM, VELOCITY_STREAM,
};
use cf_sim::{OutputStreams, SimError, StepProgressEvent, run};
use cf_solver::{DirectStep, NewtonStep, Parameters, SolverError, State, cavity_space};
use std::path::PathBuf;

fn temp_run_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("cf-sim-{}-{}", tag, std::process::id()))
}

/// Benchmark scenario: two implicit steps on the level-4 mesh with the
/// direct strategy, persisted to a run directory.
#[test]
fn benchmark_run_produces_growing_flow() {
    let params = Parameters::default();
    let space = cavity_space(&params).expect("space setup failed");

    let dir = temp_run_dir("benchmark");
    let store = FieldStore::new(dir.clone()).expect("store creation failed");
    let mut streams = OutputStreams::for_store(&store).expect("streams failed");

    let initial = State::rest(&space);
    let mut solver = DirectStep::new(&space, &params, &initial).expect("solver setup failed");

    let mut fractions = Vec::new();
    let mut on_progress = |event: &StepProgressEvent| {
        fractions.push(event.fraction_complete);
    };

    let record = run(
        &space,
        &params,
        &mut solver,
        initial,
        &mut streams,
        Some(&mut on_progress),
    )
    .expect("benchmark run failed");

    assert_eq!(record.steps.len(), 2);

    // Exactly two time-tagged snapshots per stream.
    for stream in [VELOCITY_STREAM, PRESSURE_STREAM, TEMPERATURE_STREAM] {
        let snapshots = store.load_stream(stream).expect("stream load failed");
        assert_eq!(snapshots.len(), 2, "stream {stream}");
        assert_eq!(snapshots[0].time, 0.0);
        assert!((snapshots[1].time - params.dt()).abs() < 1e-18);
    }

    // Buoyancy has begun accelerating the fluid: the second snapshot's
    // maximum velocity magnitude strictly exceeds the first's.
    let velocity = store.load_stream(VELOCITY_STREAM).unwrap();
    let first_max = velocity[0].max_magnitude();
    let second_max = velocity[1].max_magnitude();
    assert!(first_max > 0.0);
    assert!(
        second_max > first_max,
        "max speed did not grow: {first_max} -> {second_max}"
    );

    // Progress is reported as completed fraction of final_time.
    assert_eq!(fractions.len(), 2);
    assert!(fractions[0].abs() < 1e-15);
    assert!((fractions[1] - 0.5).abs() < 1e-12);

    // Wall data holds on the converged fields, to discretization precision:
    // prescribed temperatures on the vertical walls, no-slip everywhere.
    let temperature = store.load_stream(TEMPERATURE_STREAM).unwrap();
    let last = &temperature[1];
    let mut hot_checked = 0;
    for (point, value) in last.points.iter().zip(&last.values) {
        if point[0].abs() < 1e-12 {
            assert!((value - params.theta_h).abs() < 1e-7);
            hot_checked += 1;
        }
        if (point[0] - 1.0).abs() < 1e-12 {
            assert!((value - params.theta_c).abs() < 1e-7);
        }
    }
    assert!(hot_checked > 0);

    let last_velocity = &velocity[1];
    for (point, pair) in last_velocity
        .points
        .iter()
        .zip(last_velocity.values.chunks(2))
    {
        let on_wall = point[0].abs() < 1e-12
            || (point[0] - 1.0).abs() < 1e-12
            || point[1].abs() < 1e-12
            || (point[1] - 1.0).abs() < 1e-12;
        if on_wall {
            assert!(pair[0].abs() < 1e-7 && pair[1].abs() < 1e-7);
        }
    }

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn newton_strategy_drives_a_full_run() {
    let params = Parameters {
        mesh_levels: 2,
        ..Parameters::default()
    };
    let space = cavity_space(&params).unwrap();
    let mut streams = OutputStreams::in_memory();

    let initial = State::conduction(&space, &params);
    let mut solver = NewtonStep::new(&space, &params, &initial).unwrap();

    let record = run(&space, &params, &mut solver, initial, &mut streams, None)
        .expect("newton run failed");

    assert_eq!(record.steps.len(), params.num_steps);
    for summary in &record.steps {
        assert!(summary.residual_norm < params.newton_tolerance());
        assert!(summary.iterations >= 1);
    }
    assert_eq!(streams.velocity.snapshots.len(), 2);
    assert_eq!(streams.pressure.snapshots.len(), 2);
    assert_eq!(streams.temperature.snapshots.len(), 2);
    assert_eq!(streams.velocity.snapshots[1].step, 1);
}

#[test]
fn invalid_configuration_is_rejected_before_solving() {
    let good = Parameters {
        mesh_levels: 1,
        ..Parameters::default()
    };
    let space = cavity_space(&good).unwrap();
    let initial = State::rest(&space);
    let mut solver = DirectStep::new(&space, &good, &initial).unwrap();
    let mut streams = OutputStreams::in_memory();

    let bad = Parameters {
        mesh_levels: 1,
        gamma: 0.0,
        ..Parameters::default()
    };
    let err = run(&space, &bad, &mut solver, initial, &mut streams, None).unwrap_err();
    assert!(matches!(
        err,
        SimError::Solver(SolverError::Config { .. })
    ));
    assert!(streams.velocity.snapshots.is_empty());
}
