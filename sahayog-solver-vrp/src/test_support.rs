//! Test-only utilities for `sahayog-solver-vrp`.
//!
//! The helpers in this module are available to unit tests and behavioural
//! tests. They are gated behind the `test-support` feature (and `cfg(test)`).

use std::time::Duration;

use geo::Coord;
use sahayog_core::{Location, LocationId, MatrixError, MatrixProvider, RouteMatrix};

/// Construct a collection point with the given demand.
///
/// # Examples
/// ```rust
/// use sahayog_solver_vrp::test_support::bin;
///
/// let bin = bin(1, 73.85, 18.52, 40.0);
/// assert_eq!(bin.id.0, 1);
/// assert_eq!(bin.name, "bin 1");
/// ```
#[must_use]
pub fn bin(id: u64, x: f64, y: f64, demand_litres: f64) -> Location {
    Location::new(LocationId(id), format!("bin {id}"), Coord { x, y }).with_demand(demand_litres)
}

/// A [`MatrixProvider`] returning a fixed, pre-defined matrix.
///
/// This provider enables fully deterministic golden route tests by returning
/// a caller-supplied matrix verbatim. The matrix must match the number of
/// route points; mismatches produce [`MatrixError::DimensionMismatch`].
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use sahayog_core::MatrixProvider;
/// use sahayog_solver_vrp::test_support::TableMatrixProvider;
///
/// let provider = TableMatrixProvider::from_seconds(vec![vec![0, 60], vec![60, 0]]);
/// let points = [Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }];
/// assert!(provider.route_matrix(&points).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct TableMatrixProvider {
    distances: Vec<Vec<u64>>,
    durations: Vec<Vec<Duration>>,
}

impl TableMatrixProvider {
    /// Construct a provider from distance and duration tables.
    #[must_use]
    pub const fn new(distances: Vec<Vec<u64>>, durations: Vec<Vec<Duration>>) -> Self {
        Self {
            distances,
            durations,
        }
    }

    /// Build from integer seconds, charging ten metres per second.
    ///
    /// Cells holding `u64::MAX` stay unreachable in both tables.
    #[must_use]
    pub fn from_seconds(seconds: Vec<Vec<u64>>) -> Self {
        let distances = seconds
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&secs| {
                        if secs == u64::MAX {
                            u64::MAX
                        } else {
                            secs.saturating_mul(10)
                        }
                    })
                    .collect()
            })
            .collect();
        let durations = seconds
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|secs| {
                        if secs == u64::MAX {
                            Duration::MAX
                        } else {
                            Duration::from_secs(secs)
                        }
                    })
                    .collect()
            })
            .collect();
        Self {
            distances,
            durations,
        }
    }
}

impl MatrixProvider for TableMatrixProvider {
    fn route_matrix(&self, points: &[Coord<f64>]) -> Result<RouteMatrix, MatrixError> {
        if points.is_empty() {
            return Err(MatrixError::EmptyInput);
        }
        let matrix = RouteMatrix::new(self.distances.clone(), self.durations.clone())?;
        matrix.ensure_size(points.len())?;
        Ok(matrix)
    }
}
