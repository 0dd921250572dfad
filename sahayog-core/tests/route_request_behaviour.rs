//! Behavioural tests for `RouteRequest` validation using rstest-bdd.

use std::cell::RefCell;

use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use sahayog_core::{
    Location, LocationId, RouteRequest, RouteRequestValidationError, Vehicle, VehicleId,
};

#[derive(Debug)]
struct RequestWorld {
    request: RefCell<RouteRequest>,
    outcome: RefCell<Option<Result<(), RouteRequestValidationError>>>,
}

impl RequestWorld {
    fn new() -> Self {
        Self {
            request: RefCell::new(RouteRequest::new(Vec::new(), Vec::new())),
            outcome: RefCell::new(None),
        }
    }

    fn expect_error(&self) -> RouteRequestValidationError {
        self.outcome
            .borrow()
            .clone()
            .expect("validation should run before assertions")
            .expect_err("validation should fail")
    }
}

#[fixture]
fn world() -> RequestWorld {
    RequestWorld::new()
}

#[given("a request with {locations} locations and {vehicles} vehicle")]
fn given_request(world: &RequestWorld, locations: u64, vehicles: u64) {
    let locations = (1..=locations)
        .map(|n| {
            let offset = n as f64 * 0.01;
            Location::new(
                LocationId(n),
                format!("bin {n}"),
                Coord {
                    x: 73.85 + offset,
                    y: 18.52,
                },
            )
        })
        .collect();
    let vehicles = (1..=vehicles)
        .map(|n| Vehicle::new(VehicleId(n), format!("truck {n}"), 500.0))
        .collect();
    world.request.replace(RouteRequest::new(locations, vehicles));
}

#[given("location {id} has latitude {latitude}")]
fn given_latitude(world: &RequestWorld, id: u64, latitude: f64) {
    let mut request = world.request.borrow_mut();
    let location = request
        .locations
        .iter_mut()
        .find(|location| location.id == LocationId(id))
        .expect("location should exist");
    location.coordinate.y = latitude;
}

#[given("the depot is location {id}")]
fn given_depot(world: &RequestWorld, id: u64) {
    let request = world.request.borrow().clone().with_depot(LocationId(id));
    world.request.replace(request);
}

#[when("I validate the request")]
fn when_validate(world: &RequestWorld) {
    let outcome = world.request.borrow().validate_detailed();
    world.outcome.replace(Some(outcome));
}

#[then("the request is accepted")]
fn then_accepted(world: &RequestWorld) {
    assert_eq!(*world.outcome.borrow(), Some(Ok(())));
}

#[then("validation fails because there are too few locations")]
fn then_too_few(world: &RequestWorld) {
    assert_eq!(
        world.expect_error(),
        RouteRequestValidationError::TooFewLocations { found: 1 }
    );
}

#[then("validation fails because location {id} has an invalid coordinate")]
fn then_invalid_coordinate(world: &RequestWorld, id: u64) {
    assert_eq!(
        world.expect_error(),
        RouteRequestValidationError::InvalidCoordinate { id: LocationId(id) }
    );
}

#[then("validation fails because the depot is unknown")]
fn then_unknown_depot(world: &RequestWorld) {
    assert!(matches!(
        world.expect_error(),
        RouteRequestValidationError::UnknownDepot { .. }
    ));
}

#[scenario(path = "tests/features/route_request.feature", index = 0)]
fn accepted_request(world: RequestWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_request.feature", index = 1)]
fn single_location(world: RequestWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_request.feature", index = 2)]
fn invalid_coordinate(world: RequestWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_request.feature", index = 3)]
fn unknown_depot(world: RequestWorld) {
    let _ = world;
}
