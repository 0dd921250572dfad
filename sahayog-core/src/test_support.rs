//! Deterministic matrix providers and sample requests for unit and
//! behaviour tests.

use std::time::Duration;

use geo::Coord;

use crate::{
    Location, LocationId, MatrixError, MatrixProvider, RouteMatrix, RouteRequest, Vehicle,
    VehicleId,
};

/// Deterministic `MatrixProvider` returning one-second, one-metre edges.
#[derive(Default, Debug, Copy, Clone)]
pub struct UnitMatrixProvider;

impl MatrixProvider for UnitMatrixProvider {
    fn route_matrix(&self, points: &[Coord<f64>]) -> Result<RouteMatrix, MatrixError> {
        FixedMatrixProvider::new(1, Duration::from_secs(1)).route_matrix(points)
    }
}

/// `MatrixProvider` charging the same distance and time for every leg.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FixedMatrixProvider {
    distance_m: u64,
    travel_time: Duration,
}

impl FixedMatrixProvider {
    /// Charge `distance_m` metres and `travel_time` per leg.
    #[must_use]
    pub const fn new(distance_m: u64, travel_time: Duration) -> Self {
        Self {
            distance_m,
            travel_time,
        }
    }

    /// Charge `seconds` per leg at 36 km/h, i.e. ten metres per second.
    #[must_use]
    pub const fn uniform(seconds: u64) -> Self {
        Self::new(seconds * 10, Duration::from_secs(seconds))
    }
}

impl MatrixProvider for FixedMatrixProvider {
    fn route_matrix(&self, points: &[Coord<f64>]) -> Result<RouteMatrix, MatrixError> {
        if points.is_empty() {
            return Err(MatrixError::EmptyInput);
        }
        Ok(RouteMatrix::from_fn(points.len(), |from, to| {
            if from == to {
                (0, Duration::ZERO)
            } else {
                (self.distance_m, self.travel_time)
            }
        }))
    }
}

/// `MatrixProvider` that always fails with the configured error.
#[derive(Debug, Clone)]
pub struct FailingMatrixProvider(pub MatrixError);

impl MatrixProvider for FailingMatrixProvider {
    fn route_matrix(&self, _points: &[Coord<f64>]) -> Result<RouteMatrix, MatrixError> {
        Err(self.0.clone())
    }
}

/// Locations spaced about a kilometre apart around Pune, ids from 1, each
/// with 10 litres of demand.
#[must_use]
pub fn sample_locations(count: usize) -> Vec<Location> {
    (1..=count)
        .map(|n| {
            let offset = n as f64 * 0.01;
            Location::new(
                LocationId(n as u64),
                format!("bin {n}"),
                Coord {
                    x: 73.85 + offset,
                    y: 18.52 + offset,
                },
            )
            .with_demand(10.0)
        })
        .collect()
}

/// Trucks with 100 litres of capacity, ids from 1.
#[must_use]
pub fn sample_vehicles(count: usize) -> Vec<Vehicle> {
    (1..=count)
        .map(|n| Vehicle::new(VehicleId(n as u64), format!("truck {n}"), 100.0))
        .collect()
}

/// A request over [`sample_locations`] and [`sample_vehicles`].
#[must_use]
pub fn sample_request(locations: usize, vehicles: usize) -> RouteRequest {
    RouteRequest::new(sample_locations(locations), sample_vehicles(vehicles))
}
