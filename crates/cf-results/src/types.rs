//! Snapshot and manifest data types.

use serde::{Deserialize, Serialize};

/// Stream names for the three persisted fields.
pub const VELOCITY_STREAM: &str = "velocity";
pub const PRESSURE_STREAM: &str = "pressure";
pub const TEMPERATURE_STREAM: &str = "temperature";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub timestamp: String,
    pub strategy: String,
    pub mesh_cells: usize,
    pub dt: f64,
    pub final_time: f64,
    pub num_steps: usize,
    pub solver_version: String,
}

impl RunManifest {
    pub fn new(
        strategy: &str,
        mesh_cells: usize,
        dt: f64,
        final_time: f64,
        num_steps: usize,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            strategy: strategy.to_string(),
            mesh_cells,
            dt,
            final_time,
            num_steps,
            solver_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// One time-tagged snapshot of a nodal field, stored together with its node
/// locations so every stream is self-describing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub field: String,
    pub step: usize,
    pub time: f64,
    /// Values per point: 1 for scalar fields, 2 for velocity
    pub components: usize,
    pub points: Vec<[f64; 2]>,
    /// Nodal values, component-interleaved per point
    pub values: Vec<f64>,
}

impl FieldSnapshot {
    /// Largest pointwise magnitude (vector norm over components).
    pub fn max_magnitude(&self) -> f64 {
        let n = self.components.max(1);
        self.values
            .chunks(n)
            .map(|c| c.iter().map(|v| v * v).sum::<f64>().sqrt())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_magnitude_over_vector_values() {
        let snapshot = FieldSnapshot {
            field: VELOCITY_STREAM.to_string(),
            step: 0,
            time: 0.0,
            components: 2,
            points: vec![[0.0, 0.0], [1.0, 0.0]],
            values: vec![3.0, 4.0, 1.0, 0.0],
        };
        assert!((snapshot.max_magnitude() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn max_magnitude_of_scalar_field() {
        let snapshot = FieldSnapshot {
            field: TEMPERATURE_STREAM.to_string(),
            step: 1,
            time: 0.5,
            components: 1,
            points: vec![[0.0, 0.0], [1.0, 0.0]],
            values: vec![-0.5, 0.25],
        };
        assert!((snapshot.max_magnitude() - 0.5).abs() < 1e-12);
    }
}
