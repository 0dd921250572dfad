//! Property-based tests for the VRP solver.
//!
//! These tests use `proptest` to assert invariants that must hold for all valid
//! solver inputs, complementing the golden route regression tests and BDD
//! behavioural tests.
//!
//! # Invariants tested
//!
//! - **No duplicates:** Each location appears at most once across routes.
//! - **Capacity:** No route carries more than its vehicle holds.
//! - **Shift limit:** No route runs longer than the duration limit.
//! - **Accounting:** Every visit location is either routed or unassigned.
//! - **Score validity:** The quality score stays within `0..=100`.

#![expect(
    clippy::expect_used,
    reason = "property tests use expect for readable failures"
)]

use std::collections::HashSet;
use std::time::Duration;

use geo::Coord;
use proptest::prelude::*;
use sahayog_core::{
    GeodesicMatrixProvider, Location, LocationId, RouteRequest, Solver, Vehicle, VehicleId,
};
use sahayog_solver_vrp::{VrpSolver, VrpSolverConfig};

fn location_strategy() -> impl Strategy<Value = (f64, f64, f64)> {
    (73.80_f64..73.90, 18.48_f64..18.56, 0.0_f64..150.0)
}

fn request_strategy() -> impl Strategy<Value = RouteRequest> {
    (
        prop::collection::vec(location_strategy(), 2..=7),
        prop::collection::vec(40.0_f64..200.0, 1..=3),
        prop::option::of(5_u32..=60),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(points, capacities, limit, return_to_start, has_depot)| {
            let locations = points
                .into_iter()
                .zip(1_u64..)
                .map(|((x, y, demand), id)| {
                    Location::new(LocationId(id), format!("bin {id}"), Coord { x, y })
                        .with_demand(demand)
                })
                .collect();
            let vehicles = capacities
                .into_iter()
                .zip(1_u64..)
                .map(|(capacity, id)| Vehicle::new(VehicleId(id), format!("truck {id}"), capacity))
                .collect();
            let mut request = RouteRequest::new(locations, vehicles);
            if has_depot {
                request = request.with_depot(LocationId(1));
            }
            request.max_route_minutes = limit;
            request.return_to_start = return_to_start;
            request
        })
}

fn solver() -> VrpSolver<GeodesicMatrixProvider> {
    VrpSolver::with_config(
        GeodesicMatrixProvider::default(),
        VrpSolverConfig {
            max_generations: 20,
            solve_time_limit: Duration::from_secs(1),
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Property: plans never break capacity, shift or uniqueness rules.
    #[test]
    fn plans_respect_fleet_limits(request in request_strategy()) {
        let plan = solver().solve(&request).expect("solve should succeed");

        let visited: Vec<LocationId> = plan.assigned_location_ids().collect();
        let unique: HashSet<LocationId> = visited.iter().copied().collect();
        prop_assert_eq!(visited.len(), unique.len(), "duplicate visits in {:?}", visited);

        for route in &plan.routes {
            let vehicle = request
                .vehicles
                .iter()
                .find(|vehicle| vehicle.id == route.vehicle_id)
                .expect("route vehicle comes from the request");
            prop_assert!(
                route.load_litres <= vehicle.capacity_litres.floor(),
                "route load {} exceeds capacity {}",
                route.load_litres,
                vehicle.capacity_litres
            );
            if let Some(limit) = request.max_route_duration() {
                prop_assert!(
                    route.duration <= limit,
                    "route duration {:?} exceeds limit {:?}",
                    route.duration,
                    limit
                );
            }
        }
    }

    /// Property: every visit location is accounted for exactly once.
    #[test]
    fn every_location_is_accounted_for(request in request_strategy()) {
        let plan = solver().solve(&request).expect("solve should succeed");

        let mut accounted: Vec<LocationId> = plan.assigned_location_ids().collect();
        accounted.extend(plan.unassigned.iter().map(|entry| entry.location_id));
        let expected: HashSet<LocationId> =
            request.visit_locations().map(|location| location.id).collect();
        let unique: HashSet<LocationId> = accounted.iter().copied().collect();

        prop_assert_eq!(accounted.len(), unique.len());
        prop_assert_eq!(&unique, &expected);
        if let Some(depot) = request.depot {
            prop_assert!(!unique.contains(&depot), "depot must not be listed");
        }
    }

    /// Property: the quality score is a percentage.
    #[test]
    fn quality_score_is_bounded(request in request_strategy()) {
        let plan = solver().solve(&request).expect("solve should succeed");
        prop_assert!((0.0..=100.0).contains(&plan.quality_score));
        prop_assert!(plan.quality_score.is_finite());
    }
}
