//! The hand-expanded tangent must agree with the directional derivative of
//! the residual at an arbitrary state.

use cf_solver::{Parameters, WeakForms, cavity_space};
use nalgebra::DVector;

/// Fill a mixed-field vector from smooth per-component functions evaluated
/// at the nodes.
fn nodal_state(
    space: &cf_fem::MixedSpace,
    ux: impl Fn(f64, f64) -> f64,
    uy: impl Fn(f64, f64) -> f64,
    p: impl Fn(f64, f64) -> f64,
    th: impl Fn(f64, f64) -> f64,
) -> DVector<f64> {
    let mut w = DVector::zeros(space.dof_count());
    for (d, c) in space.velocity().dof_coords().iter().enumerate() {
        w[space.velocity_dof(0, d)] = ux(c[0], c[1]);
        w[space.velocity_dof(1, d)] = uy(c[0], c[1]);
    }
    for (d, c) in space.pressure().dof_coords().iter().enumerate() {
        w[space.pressure_dof(d)] = p(c[0], c[1]);
    }
    for (d, c) in space.temperature().dof_coords().iter().enumerate() {
        w[space.temperature_dof(d)] = th(c[0], c[1]);
    }
    w
}

#[test]
fn tangent_matches_directional_derivative() {
    let params = Parameters {
        mesh_levels: 1,
        ..Parameters::default()
    };
    let space = cavity_space(&params).unwrap();
    let forms = WeakForms::new(&space, &params).unwrap();

    let w = nodal_state(
        &space,
        |x, y| 0.2 + x * y - 0.3 * y,
        |x, y| 0.1 * x * x + 0.4 * y,
        |x, y| x - 0.5 * y + 0.2,
        |x, y| 0.3 * x * x - y + 0.1,
    );
    let direction = nodal_state(
        &space,
        |x, y| 0.5 - y + 0.2 * x * x,
        |x, y| 0.3 * x + 0.1 * y * y,
        |x, y| 0.7 * x * y - 0.1,
        |x, y| x - 0.4 * y * y + 0.2,
    );
    let prev = DVector::zeros(space.dof_count());

    let eps = 1e-5;
    let plus = forms.residual(&(&w + eps * &direction), &prev);
    let minus = forms.residual(&(&w - eps * &direction), &prev);
    let diff_quotient = (plus - minus) / (2.0 * eps);

    let tangent_action = forms.tangent(&w) * &direction;

    let err = (&diff_quotient - &tangent_action).norm();
    assert!(
        err <= 1e-6 * (1.0 + tangent_action.norm()),
        "directional derivative mismatch: |A d - dF| = {err}, |A d| = {}",
        tangent_action.norm()
    );
}

#[test]
fn tangent_is_exact_for_the_linear_part() {
    // At the zero state the quadratic couplings vanish, so the tangent's
    // action reproduces the residual difference exactly (previous state
    // terms drop out of the difference).
    let params = Parameters {
        mesh_levels: 1,
        ..Parameters::default()
    };
    let space = cavity_space(&params).unwrap();
    let forms = WeakForms::new(&space, &params).unwrap();

    let zero = DVector::zeros(space.dof_count());
    let direction = nodal_state(
        &space,
        |x, y| x * (1.0 - x) * y,
        |x, y| y * (1.0 - y) * x,
        |x, _| 0.5 - x,
        |x, y| x + y,
    );

    let r0 = forms.residual(&zero, &zero);
    let r1 = forms.residual(&direction, &zero);
    let linear_part = forms.tangent(&zero) * &direction;

    // F(d) - F(0) = A(0) d + Q(d, d); subtract the quadratic remainder by
    // evaluating at +-d and averaging.
    let r_minus = forms.residual(&(-direction.clone()), &zero);
    let odd_part = (&r1 - &r_minus) / 2.0;
    let err = (&odd_part - &linear_part).norm();
    assert!(
        err <= 1e-9 * (1.0 + linear_part.norm()),
        "linear part mismatch: {err}"
    );
    // Sanity: the residual at the zero state vanishes.
    assert!(r0.norm() < 1e-12);
}
