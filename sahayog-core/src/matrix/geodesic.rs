//! Offline matrix provider using WGS84 geodesic distances.

use std::time::Duration;

use geo::{Coord, Distance, Geodesic, Point};

use crate::request::DEFAULT_AVERAGE_SPEED_KMH;

use super::{MatrixError, MatrixProvider, RouteMatrix};

/// Straight-line geodesic distances with travel times at a constant speed.
///
/// Distances are truncated to whole metres and travel times to whole
/// seconds. No road network is consulted, so every pair is reachable.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use sahayog_core::{GeodesicMatrixProvider, MatrixProvider};
///
/// let provider = GeodesicMatrixProvider::new(36.0);
/// let matrix = provider
///     .route_matrix(&[Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.01 }])
///     .expect("matrix");
/// let metres = matrix.distance(0, 1).expect("cell");
/// assert!((1_100..1_110).contains(&metres));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodesicMatrixProvider {
    average_speed_kmh: f64,
}

impl Default for GeodesicMatrixProvider {
    fn default() -> Self {
        Self::new(DEFAULT_AVERAGE_SPEED_KMH)
    }
}

impl GeodesicMatrixProvider {
    /// Create a provider travelling at `average_speed_kmh`.
    ///
    /// Non-positive or non-finite speeds fall back to the default speed.
    #[must_use]
    pub fn new(average_speed_kmh: f64) -> Self {
        let average_speed_kmh = if average_speed_kmh.is_finite() && average_speed_kmh > 0.0 {
            average_speed_kmh
        } else {
            log::warn!(
                "ignoring average speed {average_speed_kmh} km/h; using {DEFAULT_AVERAGE_SPEED_KMH}"
            );
            DEFAULT_AVERAGE_SPEED_KMH
        };
        Self { average_speed_kmh }
    }

    /// Speed used to convert distances into travel times.
    #[must_use]
    pub const fn average_speed_kmh(&self) -> f64 {
        self.average_speed_kmh
    }

    fn travel_time(&self, metres: u64) -> Duration {
        let seconds = metres as f64 * 3.6 / self.average_speed_kmh;
        Duration::from_secs(seconds.floor() as u64)
    }
}

fn geodesic_metres(from: Coord<f64>, to: Coord<f64>) -> u64 {
    Geodesic
        .distance(Point::from(from), Point::from(to))
        .floor() as u64
}

impl MatrixProvider for GeodesicMatrixProvider {
    fn route_matrix(&self, points: &[Coord<f64>]) -> Result<RouteMatrix, MatrixError> {
        if points.is_empty() {
            return Err(MatrixError::EmptyInput);
        }
        Ok(RouteMatrix::from_fn(points.len(), |from, to| {
            match (points.get(from), points.get(to)) {
                (Some(a), Some(b)) if from != to => {
                    let metres = geodesic_metres(*a, *b);
                    (metres, self.travel_time(metres))
                }
                _ => (0, Duration::ZERO),
            }
        }))
    }
}
