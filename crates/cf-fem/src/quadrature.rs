//! Quadrature rules on the reference triangle.

/// Quadrature rule on the reference triangle with vertices
/// `(0,0), (1,0), (0,1)`. Weights include the reference area factor, so
/// `sum_q w_q f(x_q)` approximates the reference-cell integral directly.
#[derive(Debug, Clone)]
pub struct QuadratureRule {
    pub points: Vec<[f64; 2]>,
    pub weights: Vec<f64>,
}

impl QuadratureRule {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Seven-point rule, exact for polynomials up to degree five.
///
/// Every integrand produced by the coupled forms (velocity degree two,
/// pressure/temperature degree one, affine cells) lies within that bound.
pub fn triangle_rule() -> QuadratureRule {
    const A1: f64 = 0.059_715_871_789_770;
    const B1: f64 = 0.470_142_064_105_115;
    const A2: f64 = 0.797_426_985_353_087;
    const B2: f64 = 0.101_286_507_323_456;
    const W0: f64 = 0.225;
    const W1: f64 = 0.132_394_152_788_506;
    const W2: f64 = 0.125_939_180_544_827;

    let points = vec![
        [1.0 / 3.0, 1.0 / 3.0],
        [B1, B1],
        [A1, B1],
        [B1, A1],
        [B2, B2],
        [A2, B2],
        [B2, A2],
    ];
    // Halved: the reference triangle has area 1/2.
    let weights = vec![
        0.5 * W0,
        0.5 * W1,
        0.5 * W1,
        0.5 * W1,
        0.5 * W2,
        0.5 * W2,
        0.5 * W2,
    ];
    QuadratureRule { points, weights }
}
