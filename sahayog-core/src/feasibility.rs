//! Feasibility rules shared by every solver.
//!
//! Loads are compared in whole litres: demands round up and capacities
//! round down, so a plan accepted in whole litres never overloads a vehicle.
//! The `i32` units solvers work in assume validated requests, whose figures
//! stay within [`MAX_LITRES`](crate::MAX_LITRES).

use std::collections::HashSet;
use std::time::Duration;

use thiserror::Error;

use crate::{
    LocationId, RouteLayout, RouteMatrix, RoutePlan, RouteRequest, UnassignedLocation,
    UnassignedReason, VehicleId,
};

/// Whole-litre load used by solvers for a validated demand.
#[must_use]
pub fn demand_units(litres: f64) -> i32 {
    litres.ceil() as i32
}

/// Whole-litre load a vehicle of validated `litres` capacity may carry.
#[must_use]
pub fn capacity_units(litres: f64) -> i32 {
    litres.floor() as i32
}

/// One vehicle as seen by a solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleetVehicle {
    /// Position of the vehicle in the request.
    pub index: usize,
    /// Vehicle identifier.
    pub id: VehicleId,
    /// Point index the vehicle departs from.
    pub start: usize,
    /// Capacity in whole litres.
    pub capacity: i32,
}

/// Solver view of the request fleet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fleet {
    vehicles: Vec<FleetVehicle>,
}

impl Fleet {
    /// Pair every vehicle in `request` with its start point in `layout`.
    #[must_use]
    pub fn new(request: &RouteRequest, layout: &RouteLayout) -> Self {
        let vehicles = request
            .vehicles
            .iter()
            .enumerate()
            .filter_map(|(index, vehicle)| {
                layout.start_index(index).map(|start| FleetVehicle {
                    index,
                    id: vehicle.id,
                    start,
                    capacity: capacity_units(vehicle.capacity_litres),
                })
            })
            .collect();
        Self { vehicles }
    }

    /// Vehicles in request order.
    #[must_use]
    pub fn vehicles(&self) -> &[FleetVehicle] {
        &self.vehicles
    }

    /// The vehicle departing from point `start`.
    #[must_use]
    pub fn by_start(&self, start: usize) -> Option<&FleetVehicle> {
        self.vehicles.iter().find(|vehicle| vehicle.start == start)
    }
}

/// Travel time from `start` to `stop`, plus the way back when `round_trip`.
///
/// Returns `None` when a leg is unreachable.
#[must_use]
pub fn trip_duration(
    matrix: &RouteMatrix,
    start: usize,
    stop: usize,
    round_trip: bool,
) -> Option<Duration> {
    if !matrix.is_reachable(start, stop) {
        return None;
    }
    let outbound = matrix.duration(start, stop)?;
    if !round_trip {
        return Some(outbound);
    }
    if !matrix.is_reachable(stop, start) {
        return None;
    }
    outbound.checked_add(matrix.duration(stop, start)?)
}

/// Find visit locations no vehicle can serve on its own.
///
/// A location is unservable when no vehicle can carry its demand
/// ([`UnassignedReason::ExceedsCapacity`]), none of those vehicles can reach
/// it ([`UnassignedReason::Unreachable`]), or none reaches it within the
/// duration limit ([`UnassignedReason::ExceedsDuration`]).
#[must_use]
pub fn precheck(
    request: &RouteRequest,
    layout: &RouteLayout,
    matrix: &RouteMatrix,
) -> Vec<UnassignedLocation> {
    let fleet = Fleet::new(request, layout);
    let limit = request.max_route_duration();
    let mut unservable = Vec::new();

    for &index in layout.visit_indices() {
        let Some(location) = request.locations.get(index) else {
            continue;
        };
        let demand = demand_units(location.demand_litres);
        let carriers: Vec<&FleetVehicle> = fleet
            .vehicles()
            .iter()
            .filter(|vehicle| vehicle.capacity >= demand)
            .collect();
        let trips: Vec<Duration> = carriers
            .iter()
            .filter_map(|vehicle| {
                trip_duration(matrix, vehicle.start, index, request.return_to_start)
            })
            .collect();

        let reason = if carriers.is_empty() {
            Some(UnassignedReason::ExceedsCapacity)
        } else if trips.is_empty() {
            Some(UnassignedReason::Unreachable)
        } else if let Some(limit) = limit
            && trips.iter().all(|trip| *trip > limit)
        {
            Some(UnassignedReason::ExceedsDuration)
        } else {
            None
        };

        if let Some(reason) = reason {
            log::debug!("location {} is unservable: {reason:?}", location.id);
            unservable.push(UnassignedLocation {
                location_id: location.id,
                reason,
            });
        }
    }
    unservable
}

/// A broken invariant found in a solver's plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanViolation {
    /// A location appears more than once across routes.
    #[error("location {id} is visited more than once")]
    DuplicateVisit {
        /// Repeated location.
        id: LocationId,
    },
    /// A stop references a location outside the request.
    #[error("location {id} is not part of the request")]
    UnknownLocation {
        /// Unknown location.
        id: LocationId,
    },
    /// The depot appears as a stop.
    #[error("depot {id} appears as a stop")]
    DepotVisited {
        /// Depot location.
        id: LocationId,
    },
    /// A route is driven by a vehicle outside the request.
    #[error("vehicle {id} is not part of the request")]
    UnknownVehicle {
        /// Unknown vehicle.
        id: VehicleId,
    },
    /// A route carries more than its vehicle holds.
    #[error("vehicle {id} is loaded beyond its capacity")]
    CapacityExceeded {
        /// Overloaded vehicle.
        id: VehicleId,
    },
    /// A route runs past the duration limit.
    #[error("vehicle {id} needs {duration_secs}s, over the {limit_secs}s limit")]
    DurationExceeded {
        /// Vehicle on the long route.
        id: VehicleId,
        /// Route duration in seconds.
        duration_secs: u64,
        /// Limit in seconds.
        limit_secs: u64,
    },
}

/// Check the invariants every plan must satisfy.
///
/// Each location is visited at most once, only request locations other than
/// the depot are visited, loads stay within capacity and route durations stay
/// within the limit.
///
/// # Errors
/// Returns the first [`PlanViolation`] found.
pub fn verify_plan(request: &RouteRequest, plan: &RoutePlan) -> Result<(), PlanViolation> {
    let limit = request.max_route_duration();
    let mut seen = HashSet::new();

    for route in &plan.routes {
        let vehicle = request
            .vehicles
            .iter()
            .find(|vehicle| vehicle.id == route.vehicle_id)
            .ok_or(PlanViolation::UnknownVehicle {
                id: route.vehicle_id,
            })?;

        let mut load = 0.0;
        for id in route.location_ids() {
            if !seen.insert(id) {
                return Err(PlanViolation::DuplicateVisit { id });
            }
            if request.depot == Some(id) {
                return Err(PlanViolation::DepotVisited { id });
            }
            let location = request
                .location(id)
                .ok_or(PlanViolation::UnknownLocation { id })?;
            load += location.demand_litres.ceil();
        }
        if load > vehicle.capacity_litres.floor() {
            return Err(PlanViolation::CapacityExceeded { id: vehicle.id });
        }
        if let Some(limit) = limit
            && route.duration > limit
        {
            return Err(PlanViolation::DurationExceeded {
                id: vehicle.id,
                duration_secs: route.duration.as_secs(),
                limit_secs: limit.as_secs(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedMatrixProvider, sample_request};
    use crate::{MatrixProvider, UNREACHABLE_DISTANCE};
    use rstest::rstest;

    fn matrix_for(request: &RouteRequest, provider: &FixedMatrixProvider) -> (RouteLayout, RouteMatrix) {
        let layout = RouteLayout::new(request);
        let matrix = provider
            .route_matrix(layout.points())
            .expect("fixed matrix");
        (layout, matrix)
    }

    #[rstest]
    #[case(10.2, 10)]
    #[case(10.0, 10)]
    fn capacity_rounds_down(#[case] litres: f64, #[case] units: i32) {
        assert_eq!(capacity_units(litres), units);
    }

    #[rstest]
    #[case(0.1, 1)]
    #[case(0.0, 0)]
    fn demand_rounds_up(#[case] litres: f64, #[case] units: i32) {
        assert_eq!(demand_units(litres), units);
    }

    #[rstest]
    fn oversized_demand_is_flagged() {
        let mut request = sample_request(3, 1);
        if let Some(location) = request.locations.get_mut(1) {
            location.demand_litres = 1_000_000.0;
        }
        let (layout, matrix) = matrix_for(&request, &FixedMatrixProvider::uniform(60));
        let unservable = precheck(&request, &layout, &matrix);
        assert_eq!(
            unservable,
            vec![UnassignedLocation {
                location_id: request.locations[1].id,
                reason: UnassignedReason::ExceedsCapacity,
            }]
        );
    }

    #[rstest]
    fn distant_location_exceeds_duration() {
        let request = sample_request(2, 1).with_max_route_minutes(1);
        let (layout, matrix) = matrix_for(&request, &FixedMatrixProvider::uniform(600));
        let unservable = precheck(&request, &layout, &matrix);
        // The first location shares the virtual start's coordinate but the
        // fixed matrix still charges the full leg.
        assert!(
            unservable
                .iter()
                .all(|entry| entry.reason == UnassignedReason::ExceedsDuration)
        );
        assert_eq!(unservable.len(), 2);
    }

    #[rstest]
    fn unreachable_location_is_flagged() {
        let request = sample_request(2, 1);
        let layout = RouteLayout::new(&request);
        let matrix = RouteMatrix::from_fn(layout.points().len(), |from, to| {
            if from == to {
                (0, Duration::ZERO)
            } else if from == 1 || to == 1 {
                (UNREACHABLE_DISTANCE, Duration::MAX)
            } else {
                (100, Duration::from_secs(10))
            }
        });
        let unservable = precheck(&request, &layout, &matrix);
        assert_eq!(
            unservable,
            vec![UnassignedLocation {
                location_id: request.locations[1].id,
                reason: UnassignedReason::Unreachable,
            }]
        );
    }

    #[rstest]
    fn verify_plan_compares_loads_beyond_solver_units() {
        use crate::{Diagnostics, FuelEstimate, PlanStatus, Stop, VehicleRoute};

        let mut request = sample_request(2, 1);
        if let Some(location) = request.locations.first_mut() {
            location.demand_litres = 5.0e9;
        }
        let Some(vehicle) = request.vehicles.first_mut() else {
            panic!("sample request has a vehicle");
        };
        vehicle.capacity_litres = 3.0e9;
        let vehicle = vehicle.clone();
        let location = &request.locations[0];
        let route = VehicleRoute {
            vehicle_id: vehicle.id,
            stops: vec![Stop {
                location_id: location.id,
                name: location.name.clone(),
                visit_order: 1,
                demand_litres: location.demand_litres,
                distance_from_previous_m: 0,
                travel_time_from_previous: Duration::ZERO,
                cumulative_distance_m: 0,
                cumulative_time: Duration::ZERO,
            }],
            segments: Vec::new(),
            path: vec![location.coordinate],
            distance_m: 0,
            duration: Duration::ZERO,
            load_litres: location.demand_litres,
            fuel: FuelEstimate::for_distance(0, &vehicle),
        };
        let plan = RoutePlan {
            status: PlanStatus::Partial,
            routes: vec![route],
            unassigned: Vec::new(),
            total_distance_m: 0,
            total_duration: Duration::ZERO,
            total_load_litres: location.demand_litres,
            quality_score: 0.0,
            diagnostics: Diagnostics::default(),
        };
        assert_eq!(
            verify_plan(&request, &plan),
            Err(PlanViolation::CapacityExceeded { id: vehicle.id })
        );
    }

    #[rstest]
    fn round_trip_adds_return_leg() {
        let matrix = RouteMatrix::from_fn(2, |from, to| {
            if from == to {
                (0, Duration::ZERO)
            } else {
                (10, Duration::from_secs(30))
            }
        });
        assert_eq!(trip_duration(&matrix, 0, 1, false), Some(Duration::from_secs(30)));
        assert_eq!(trip_duration(&matrix, 0, 1, true), Some(Duration::from_secs(60)));
    }
}
