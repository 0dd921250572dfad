//! Behavioural tests for [`OsrmMatrixProvider`] against a canned local
//! HTTP server.

#![expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]

mod support;

use std::cell::RefCell;
use std::time::Duration;

use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use sahayog_core::{MatrixError, MatrixProvider, RouteMatrix, UNREACHABLE_DISTANCE};
use sahayog_data::routing::{OsrmConfig, OsrmMatrixProvider};
use support::{CannedServer, closed_base_url};

#[derive(Debug, Default)]
struct OsrmWorld {
    server: RefCell<Option<CannedServer>>,
    base_url: RefCell<String>,
    request_line: RefCell<Option<String>>,
    result: RefCell<Option<Result<RouteMatrix, MatrixError>>>,
}

impl OsrmWorld {
    fn serve(&self, status: &str, body: &str) {
        let server = CannedServer::respond(status, body);
        self.base_url.replace(server.base_url().to_owned());
        self.server.replace(Some(server));
    }

    fn matrix(&self) -> RouteMatrix {
        self.result
            .borrow()
            .clone()
            .expect("a request should have been made")
            .expect("expected a matrix")
    }

    fn error(&self) -> MatrixError {
        self.result
            .borrow()
            .clone()
            .expect("a request should have been made")
            .expect_err("expected an error")
    }
}

#[fixture]
fn world() -> OsrmWorld {
    OsrmWorld::default()
}

#[given("an OSRM service answering with a 2x2 table")]
fn service_ok(world: &OsrmWorld) {
    world.serve(
        "200 OK",
        r#"{"code": "Ok",
            "durations": [[0.0, 120.2], [118.0, 0.0]],
            "distances": [[0.0, 1500.3], [1490.0, 0.0]]}"#,
    );
}

#[given("an OSRM service answering with null cells")]
fn service_nulls(world: &OsrmWorld) {
    world.serve(
        "200 OK",
        r#"{"code": "Ok",
            "durations": [[0.0, null], [60.0, 0.0]],
            "distances": [[0.0, null], [700.0, 0.0]]}"#,
    );
}

#[given("an OSRM service answering with code {code}")]
fn service_error_code(world: &OsrmWorld, code: String) {
    let body = format!(
        r#"{{"code": "{}", "message": "Query string malformed"}}"#,
        code.trim_matches('"')
    );
    world.serve("400 Bad Request", &body);
}

#[given("an OSRM service answering with HTTP status {status}")]
fn service_http_status(world: &OsrmWorld, status: u16) {
    world.serve(&format!("{status} Service Unavailable"), "{}");
}

#[given("no OSRM service is listening")]
fn service_missing(world: &OsrmWorld) {
    world.base_url.replace(closed_base_url());
}

#[when("I request a matrix for two points")]
fn request_two(world: &OsrmWorld) {
    let config = OsrmConfig::new(world.base_url.borrow().clone())
        .with_timeout(Duration::from_secs(5));
    let provider = OsrmMatrixProvider::with_config(config).expect("provider should build");
    let result = provider.route_matrix(&[
        Coord { x: 73.85, y: 18.52 },
        Coord { x: 73.86, y: 18.53 },
    ]);
    world.result.replace(Some(result));
    if let Some(server) = world.server.borrow_mut().take() {
        world.request_line.replace(Some(server.request_line()));
    }
}

#[then("a 2x2 matrix is returned")]
fn then_two_by_two(world: &OsrmWorld) {
    let matrix = world.matrix();
    assert_eq!(matrix.size(), 2);
    assert_eq!(matrix.duration(0, 0), Some(Duration::ZERO));
    assert_eq!(matrix.distance(1, 1), Some(0));
}

#[then("the leg from the first point to the second is {metres} metres and {seconds} seconds")]
fn then_leg(world: &OsrmWorld, metres: u64, seconds: u64) {
    let matrix = world.matrix();
    assert_eq!(matrix.distance(0, 1), Some(metres));
    assert_eq!(matrix.duration(0, 1), Some(Duration::from_secs(seconds)));
}

#[then("the request asked for durations and distances on the driving profile")]
fn then_request_line(world: &OsrmWorld) {
    let line = world
        .request_line
        .borrow()
        .clone()
        .expect("server should record the request");
    assert!(
        line.starts_with("GET /table/v1/driving/73.85,18.52;73.86,18.53?"),
        "unexpected request line {line}"
    );
    assert!(line.contains("annotations=duration,distance"));
}

#[then("the second point is unreachable from the first")]
fn then_unreachable(world: &OsrmWorld) {
    let matrix = world.matrix();
    assert!(!matrix.is_reachable(0, 1));
    assert_eq!(matrix.distance(0, 1), Some(UNREACHABLE_DISTANCE));
    assert_eq!(matrix.duration(0, 1), Some(Duration::MAX));
    assert!(matrix.is_reachable(1, 0));
}

#[then("a service error with code {code} is returned")]
fn then_service_error(world: &OsrmWorld, code: String) {
    assert!(
        matches!(
            world.error(),
            MatrixError::Service { code: actual, .. } if actual == code.trim_matches('"')
        ),
        "expected service error {code}"
    );
}

#[then("an HTTP error with status {status} is returned")]
fn then_http_error(world: &OsrmWorld, status: u16) {
    assert!(
        matches!(world.error(), MatrixError::Http { status: actual, .. } if actual == status),
        "expected HTTP {status}"
    );
}

#[then("a network error is returned")]
fn then_network_error(world: &OsrmWorld) {
    assert!(matches!(world.error(), MatrixError::Network { .. }));
}

#[scenario(path = "tests/features/osrm_matrix.feature", index = 0)]
fn successful_table(world: OsrmWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/osrm_matrix.feature", index = 1)]
fn unroutable_pairs(world: OsrmWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/osrm_matrix.feature", index = 2)]
fn service_error(world: OsrmWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/osrm_matrix.feature", index = 3)]
fn http_failure(world: OsrmWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/osrm_matrix.feature", index = 4)]
fn unreachable_service(world: OsrmWorld) {
    let _ = world;
}
