//! The two step strategies must produce the same fields for the same step.

use cf_solver::{DirectStep, NewtonStep, Parameters, State, StepSolver, cavity_space};

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()))
}

fn assert_fields_agree(a: &[f64], b: &[f64], rel: f64, abs: f64, what: &str) {
    assert_eq!(a.len(), b.len());
    let scale = max_abs(a).max(max_abs(b));
    let tol = abs + rel * scale;
    for (i, (va, vb)) in a.iter().zip(b).enumerate() {
        assert!(
            (va - vb).abs() <= tol,
            "{what} differs at dof {i}: {va} vs {vb} (tol {tol:.3e}, scale {scale:.3e})"
        );
    }
}

#[test]
fn direct_and_newton_agree_for_a_small_time_step() {
    let params = Parameters {
        mesh_levels: 2,
        num_steps: 1,
        final_time: 1.0e-8,
        ..Parameters::default()
    };
    let space = cavity_space(&params).unwrap();
    // Same initial condition for both strategies.
    let initial = State::conduction(&space, &params);

    let mut direct = DirectStep::new(&space, &params, &initial).unwrap();
    let mut newton = NewtonStep::new(&space, &params, &initial).unwrap();

    let a = direct.advance(&initial, 0).expect("direct step failed").state;
    let b = newton.advance(&initial, 0).expect("newton step failed").state;

    assert_fields_agree(
        &a.velocity_values(&space),
        &b.velocity_values(&space),
        1e-3,
        1e-8,
        "velocity",
    );
    assert_fields_agree(
        &a.temperature_values(&space),
        &b.temperature_values(&space),
        1e-3,
        1e-8,
        "temperature",
    );
    assert_fields_agree(
        &a.pressure_values(&space),
        &b.pressure_values(&space),
        1e-3,
        1e-6,
        "pressure",
    );
}
