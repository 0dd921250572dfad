//! Test helpers for composing CLI workspaces, requests and stub solvers.

use camino::{Utf8Path, Utf8PathBuf};
use geo::Coord;
use sahayog_core::{
    Diagnostics, Location, LocationId, RoutePlan, RouteRequest, SolveError, Solver, Vehicle,
    VehicleId,
};
use tempfile::TempDir;

use crate::CliError;
use crate::solve::{SolverBuilder, SolverChoice};

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    sahayog_fs::ensure_parent_dir(path).expect("create parent directory");
    std::fs::write(path, contents).expect("write test file");
}

/// A temporary directory addressed with UTF-8 paths.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }
}

/// Bins spaced roughly a kilometre apart east of central Pune.
pub(super) fn sample_request(bins: u32) -> RouteRequest {
    let locations = (1..=bins)
        .map(|n| {
            let x = 73.85 + f64::from(n) * 0.01;
            Location::new(LocationId(u64::from(n)), format!("Bin {n}"), Coord { x, y: 18.52 })
                .with_demand(50.0)
        })
        .collect();
    let vehicles = vec![Vehicle::new(VehicleId(1), "Truck 1", 500.0)];
    RouteRequest::new(locations, vehicles)
}

pub(super) fn write_request(path: &Utf8Path, request: &RouteRequest) {
    let payload = serde_json::to_string_pretty(request).expect("serialise request");
    write_utf8(path, payload.as_bytes());
}

/// Plan every stub solver returns.
pub(super) fn stub_plan() -> RoutePlan {
    RoutePlan::infeasible(
        Vec::new(),
        Diagnostics {
            solver: "stub".to_owned(),
            ..Diagnostics::default()
        },
    )
}

struct StubSolver;

impl Solver for StubSolver {
    fn solve(&self, _request: &RouteRequest) -> Result<RoutePlan, SolveError> {
        Ok(stub_plan())
    }
}

/// Builder that always returns [`StubSolver`].
#[derive(Debug, Default)]
pub(super) struct StubSolverBuilder;

impl SolverBuilder for StubSolverBuilder {
    fn build(
        &self,
        _choice: &SolverChoice,
        _request: &RouteRequest,
    ) -> Result<Box<dyn Solver>, CliError> {
        Ok(Box::new(StubSolver))
    }
}
