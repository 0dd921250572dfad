//! Behavioural tests for `VrpSolver` using rstest-bdd.

use std::cell::RefCell;
use std::collections::HashSet;
use std::time::Duration;

use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use sahayog_core::test_support::{FailingMatrixProvider, UnitMatrixProvider};
use sahayog_core::{
    Location, LocationId, MatrixError, MatrixProvider, RouteMatrix, RoutePlan, RouteRequest,
    SolveError, Solver, UnassignedReason, Vehicle, VehicleId,
};
use sahayog_solver_vrp::test_support::bin;
use sahayog_solver_vrp::{VrpSolver, VrpSolverConfig};

#[derive(Debug, Clone)]
enum ProviderChoice {
    Unit(UnitMatrixProvider),
    Failing(FailingMatrixProvider),
}

impl Default for ProviderChoice {
    fn default() -> Self {
        Self::Unit(UnitMatrixProvider)
    }
}

impl MatrixProvider for ProviderChoice {
    fn route_matrix(&self, points: &[Coord<f64>]) -> Result<RouteMatrix, MatrixError> {
        match self {
            Self::Unit(provider) => provider.route_matrix(points),
            Self::Failing(provider) => provider.route_matrix(points),
        }
    }
}

#[derive(Debug)]
struct VrpWorld {
    locations: RefCell<Vec<Location>>,
    vehicles: RefCell<Vec<Vehicle>>,
    provider: RefCell<ProviderChoice>,
    outcome: RefCell<Option<Result<RoutePlan, SolveError>>>,
}

impl VrpWorld {
    fn new() -> Self {
        Self {
            locations: RefCell::new(Vec::new()),
            vehicles: RefCell::new(Vec::new()),
            provider: RefCell::new(ProviderChoice::default()),
            outcome: RefCell::new(None),
        }
    }

    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn expect_outcome(&self) -> Result<RoutePlan, SolveError> {
        self.outcome
            .borrow()
            .as_ref()
            .cloned()
            .expect("outcome should be recorded before assertions")
    }

    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn expect_plan(&self) -> RoutePlan {
        self.expect_outcome().expect("expected solve success")
    }

    fn location_ids(&self) -> HashSet<LocationId> {
        self.locations
            .borrow()
            .iter()
            .map(|location| location.id)
            .collect()
    }
}

#[fixture]
fn world() -> VrpWorld {
    VrpWorld::new()
}

#[given("{count} bins needing {litres} litres each")]
fn given_bins(world: &VrpWorld, count: u32, litres: f64) {
    let bins = (1..=count)
        .map(|n| {
            #[expect(
                clippy::float_arithmetic,
                reason = "bins are spread out along a line"
            )]
            let x = 73.85 + f64::from(n) * 0.005;
            bin(u64::from(n), x, 18.52, litres)
        })
        .collect();
    world.locations.replace(bins);
}

#[given("{count} trucks carrying {litres} litres each")]
fn given_trucks(world: &VrpWorld, count: u64, litres: f64) {
    let trucks = (1..=count)
        .map(|n| Vehicle::new(VehicleId(n), format!("truck {n}"), litres))
        .collect();
    world.vehicles.replace(trucks);
}

#[given("a failing matrix provider")]
fn given_failing_provider(world: &VrpWorld) {
    world
        .provider
        .replace(ProviderChoice::Failing(FailingMatrixProvider(
            MatrixError::Timeout {
                url: "http://localhost:5000/table/v1/driving".to_owned(),
                timeout_secs: 30,
            },
        )));
}

#[when("the VRP solver runs")]
fn when_solver_runs(world: &VrpWorld) {
    let provider = world.provider.borrow().clone();
    let solver = VrpSolver::with_config(
        provider,
        VrpSolverConfig {
            max_generations: 50,
            solve_time_limit: Duration::from_secs(1),
        },
    );
    let request = RouteRequest::new(
        world.locations.borrow().clone(),
        world.vehicles.borrow().clone(),
    );
    world.outcome.replace(Some(solver.solve(&request)));
}

#[then("the plan status is {status}")]
fn then_status(world: &VrpWorld, status: String) {
    assert_eq!(world.expect_plan().status.as_str(), status.trim_matches('"'));
}

#[then("every bin is visited exactly once")]
fn then_visited_once(world: &VrpWorld) {
    let plan = world.expect_plan();
    let visited: Vec<LocationId> = plan.assigned_location_ids().collect();
    let unique: HashSet<LocationId> = visited.iter().copied().collect();
    assert_eq!(visited.len(), unique.len());
    assert_eq!(unique, world.location_ids());
}

#[then("every bin is unassigned because it exceeds capacity")]
fn then_exceeds_capacity(world: &VrpWorld) {
    let plan = world.expect_plan();
    let ids: HashSet<LocationId> = plan
        .unassigned
        .iter()
        .filter(|entry| entry.reason == UnassignedReason::ExceedsCapacity)
        .map(|entry| entry.location_id)
        .collect();
    assert_eq!(ids, world.location_ids());
}

#[then("the solve fails with a matrix error")]
#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn then_matrix_error(world: &VrpWorld) {
    let err = world.expect_outcome().expect_err("expected a matrix error");
    assert!(matches!(err, SolveError::Matrix(MatrixError::Timeout { .. })));
}

#[scenario(path = "tests/features/vrp_solver.feature", index = 0)]
fn fleet_covers_every_bin(world: VrpWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/vrp_solver.feature", index = 1)]
fn oversized_bins(world: VrpWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/vrp_solver.feature", index = 2)]
fn failing_matrix_provider(world: VrpWorld) {
    let _ = world;
}
