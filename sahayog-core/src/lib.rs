//! Core domain types for the Sahayog routing engine.
//!
//! A [`RouteRequest`] names collection locations and a vehicle fleet. A
//! [`Solver`] turns it into a [`RoutePlan`]: ordered visits per vehicle with
//! distances, durations, fuel estimates and a quality score. Matrix
//! providers, feasibility rules and plan assembly are shared here so every
//! solver reports plans the same way.
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod assemble;
pub mod feasibility;
mod fuel;
mod layout;
mod location;
mod matrix;
mod plan;
mod prepare;
mod request;
mod score;
mod solver;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;
mod vehicle;

pub use assemble::PlanAssembler;
pub use feasibility::{Fleet, FleetVehicle, PlanViolation, precheck, verify_plan};
pub use fuel::{FuelEstimate, FuelWarning};
pub use layout::RouteLayout;
pub use location::{Location, LocationId, LocationKind, Priority, is_valid_coordinate};
pub use matrix::{
    GeodesicMatrixProvider, MatrixError, MatrixProvider, RouteMatrix, UNREACHABLE_DISTANCE,
};
pub use plan::{
    Diagnostics, PlanStatus, RouteNode, RoutePlan, Segment, Stop, UnassignedLocation,
    UnassignedReason, VehicleRoute,
};
pub use prepare::PreparedRequest;
pub use request::{
    DEFAULT_AVERAGE_SPEED_KMH, MAX_LITRES, RouteRequest, RouteRequestValidationError,
};
pub use score::quality_score;
pub use solver::{Error, SolveError, Solver};
pub use store::{DEFAULT_HISTORY_LIMIT, RecordStore};
#[cfg(feature = "store-sqlite")]
pub use store::{
    NewLocation, NewSession, NewVehicle, RouteId, RouteImport, RouteStatistics, RouteStopDetail,
    SessionRecord, SqliteRouteStore, SqliteRouteStoreError,
};
pub use vehicle::{Vehicle, VehicleId, VehicleKind};
