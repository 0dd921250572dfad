//! Persistence for locations, vehicles, planned routes and optimisation
//! history.
//!
//! The `RecordStore` trait defines the read side a solver front end needs:
//! loading the [`Location`] and [`Vehicle`] records a request is built from.
//! [`SqliteRouteStore`] implements it and adds the write and reporting
//! operations.

use crate::{Location, LocationId, Vehicle, VehicleId};

#[cfg(feature = "store-sqlite")]
mod schema;
#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use sqlite::{
    NewLocation, NewSession, NewVehicle, RouteId, RouteImport, RouteStatistics, RouteStopDetail,
    SessionRecord, SqliteRouteStore, SqliteRouteStoreError,
};

/// Number of sessions returned by history queries when no limit is given.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Read access to the records a route request is built from.
///
/// Implementers return records in the order of `ids`. An empty `ids` slice
/// selects every active location or available vehicle.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use sahayog_core::{Location, LocationId, RecordStore, Vehicle, VehicleId};
///
/// struct MemoryStore {
///     locations: Vec<Location>,
/// }
///
/// impl RecordStore for MemoryStore {
///     type Error = String;
///
///     fn load_locations(&self, ids: &[LocationId]) -> Result<Vec<Location>, String> {
///         ids.iter()
///             .map(|id| {
///                 self.locations
///                     .iter()
///                     .find(|loc| loc.id == *id)
///                     .cloned()
///                     .ok_or_else(|| format!("missing location {id}"))
///             })
///             .collect()
///     }
///
///     fn load_vehicles(&self, _ids: &[VehicleId]) -> Result<Vec<Vehicle>, String> {
///         Ok(Vec::new())
///     }
/// }
///
/// let bin = Location::new(LocationId(1), "bin", Coord { x: 0.0, y: 0.0 });
/// let store = MemoryStore { locations: vec![bin.clone()] };
/// assert_eq!(store.load_locations(&[LocationId(1)]), Ok(vec![bin]));
/// assert!(store.load_locations(&[LocationId(2)]).is_err());
/// ```
pub trait RecordStore {
    /// Failure type of the backing store.
    type Error;

    /// Load the active locations named by `ids`.
    fn load_locations(&self, ids: &[LocationId]) -> Result<Vec<Location>, Self::Error>;

    /// Load the available vehicles named by `ids`.
    fn load_vehicles(&self, ids: &[VehicleId]) -> Result<Vec<Vehicle>, Self::Error>;
}
