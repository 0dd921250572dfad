//! Facade crate for the Sahayog waste-collection routing engine.
//!
//! This crate re-exports the core domain types and exposes the solver and
//! store implementations behind feature flags.

#![forbid(unsafe_code)]

pub use sahayog_core::{
    Diagnostics, GeodesicMatrixProvider, Location, LocationId, LocationKind, MatrixError,
    MatrixProvider, PlanStatus, Priority, RouteMatrix, RoutePlan, RouteRequest,
    RouteRequestValidationError, SolveError, Solver, Stop, UnassignedLocation,
    UnassignedReason, Vehicle, VehicleId, VehicleKind, VehicleRoute,
};

#[cfg(feature = "store-sqlite")]
pub use sahayog_core::{SqliteRouteStore, SqliteRouteStoreError};

#[cfg(feature = "solver-vrp")]
pub use sahayog_solver_vrp::{VrpSolver, VrpSolverConfig};

#[cfg(feature = "solver-greedy")]
pub use sahayog_solver_greedy::GreedySolver;
