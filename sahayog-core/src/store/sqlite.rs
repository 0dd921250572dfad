//! SQLite-backed store for route records and optimisation history.

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use geo::Coord;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use serde::Serialize;
use thiserror::Error;

use crate::{
    Diagnostics, FuelWarning, GeodesicMatrixProvider, Location, LocationId, LocationKind,
    MatrixError, MatrixProvider, PlanAssembler, Priority, RouteLayout, RoutePlan, RouteRequest,
    Vehicle, VehicleId, VehicleKind,
};

use super::RecordStore;
use super::schema::migrate;

/// SQLite limits bound parameters per statement to 999 by default. The store
/// chunks `IN` queries to remain below that ceiling.
const SQLITE_MAX_VARIABLE_NUMBER: usize = 999;

/// Solver name recorded on routes saved from an import.
const IMPORT_SOLVER_NAME: &str = "import";

/// Identifier of a persisted vehicle route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RouteId(pub i64);

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error raised when reading or writing the route store.
#[derive(Debug, Error)]
pub enum SqliteRouteStoreError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A location is missing or inactive.
    #[error("location {id} does not exist or is inactive")]
    MissingLocation {
        /// Requested identifier.
        id: LocationId,
    },
    /// A vehicle is missing or unavailable.
    #[error("vehicle {id} does not exist or is unavailable")]
    MissingVehicle {
        /// Requested identifier.
        id: VehicleId,
    },
    /// A route is missing.
    #[error("route {id} does not exist")]
    MissingRoute {
        /// Requested identifier.
        id: RouteId,
    },
    /// A text column held a value the model does not recognise.
    #[error("column {column} holds unrecognised value '{value}'")]
    InvalidValue {
        /// Column name.
        column: &'static str,
        /// Stored text.
        value: String,
    },
    /// An imported route found no available vehicle to assign.
    #[error("no available vehicle to assign for the imported route")]
    NoAvailableVehicle,
    /// Distances for an imported route could not be computed.
    #[error("failed to measure the imported route: {0}")]
    Matrix(#[from] MatrixError),
    /// A JSON column could not be encoded or decoded.
    #[error("failed to encode or decode JSON column: {0}")]
    Json(#[from] serde_json::Error),
    /// Generic SQLite error.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

/// A location to insert; the store assigns its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLocation {
    /// Human-readable name.
    pub name: String,
    /// Street address, possibly empty.
    pub address: String,
    /// Geospatial position.
    pub coordinate: Coord<f64>,
    /// Site category.
    pub kind: LocationKind,
    /// Collection urgency.
    pub priority: Priority,
    /// Estimated waste volume in litres.
    pub demand_litres: f64,
}

impl NewLocation {
    /// A medium-priority bin with zero demand.
    #[must_use]
    pub fn new(name: impl Into<String>, coordinate: Coord<f64>) -> Self {
        Self {
            name: name.into(),
            address: String::new(),
            coordinate,
            kind: LocationKind::default(),
            priority: Priority::default(),
            demand_litres: 0.0,
        }
    }
}

impl From<Location> for NewLocation {
    fn from(location: Location) -> Self {
        Self {
            name: location.name,
            address: location.address,
            coordinate: location.coordinate,
            kind: location.kind,
            priority: location.priority,
            demand_litres: location.demand_litres,
        }
    }
}

/// Records written by [`SqliteRouteStore::import_route`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteImport {
    /// Identifiers of the inserted locations, in import order.
    pub location_ids: Vec<LocationId>,
    /// The saved route, absent when fewer than two locations were imported.
    pub route_id: Option<RouteId>,
    /// Vehicle assigned to the route.
    pub vehicle_id: VehicleId,
}

/// A vehicle to insert; the store assigns its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVehicle {
    /// Human-readable name.
    pub name: String,
    /// Body type.
    pub kind: VehicleKind,
    /// Maximum load in litres.
    pub capacity_litres: f64,
    /// Kilometres per litre.
    pub fuel_efficiency_km_per_litre: Option<f64>,
    /// Tank size in litres.
    pub fuel_tank_litres: Option<f64>,
    /// Explicit start position.
    pub start: Option<Coord<f64>>,
}

impl From<Vehicle> for NewVehicle {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            name: vehicle.name,
            kind: vehicle.kind,
            capacity_litres: vehicle.capacity_litres,
            fuel_efficiency_km_per_litre: vehicle.fuel_efficiency_km_per_litre,
            fuel_tank_litres: vehicle.fuel_tank_litres,
            start: vehicle.start,
        }
    }
}

/// An optimisation run to record in the history.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    /// Session name.
    pub name: String,
    /// Solver that produced the plan.
    pub solver: String,
    /// Parameters the run used.
    pub parameters: serde_json::Value,
    /// Wall-clock solve time.
    pub execution_time: Duration,
    /// Plan quality score.
    pub quality_score: f64,
}

impl NewSession {
    /// Describe the run that produced `plan`.
    #[must_use]
    pub fn from_plan(
        name: impl Into<String>,
        plan: &RoutePlan,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            solver: plan.diagnostics.solver.clone(),
            parameters,
            execution_time: plan.diagnostics.solve_time,
            quality_score: plan.quality_score,
        }
    }
}

/// A recorded optimisation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecord {
    /// Session identifier.
    pub id: i64,
    /// Session name.
    pub name: String,
    /// Solver that produced the plan.
    pub solver: String,
    /// Parameters the run used.
    pub parameters: serde_json::Value,
    /// Wall-clock solve time in milliseconds.
    pub execution_time_ms: u64,
    /// Plan quality score.
    pub quality_score: f64,
    /// Creation timestamp, `YYYY-MM-DD HH:MM:SS` UTC.
    pub created_at: String,
}

/// One stop of a persisted route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStopDetail {
    /// Location visited.
    pub location_id: LocationId,
    /// Location name.
    pub name: String,
    /// Location address.
    pub address: String,
    /// Position in the route, starting at 1.
    pub visit_order: usize,
    /// Litres collected.
    pub demand_litres: f64,
    /// Collection urgency.
    pub priority: Priority,
    /// Location position.
    pub coordinate: Coord<f64>,
}

/// Summary of a persisted route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStatistics {
    /// Route identifier.
    pub route_id: RouteId,
    /// Route name.
    pub name: String,
    /// Vehicle driving the route.
    pub vehicle_id: VehicleId,
    /// Vehicle name.
    pub vehicle_name: String,
    /// Dispatch status, `planned` when first saved.
    pub status: String,
    /// Metres driven.
    pub total_distance_m: u64,
    /// Travel time.
    #[serde(with = "crate::plan::duration_secs")]
    pub total_duration: Duration,
    /// Litres collected.
    pub load_litres: f64,
    /// Estimated fuel in litres.
    pub fuel_litres: f64,
    /// Fuel notice recorded with the route.
    pub fuel_warning: Option<FuelWarning>,
    /// Plan quality score at save time.
    pub quality_score: f64,
    /// Creation timestamp.
    pub created_at: String,
    /// Stops in visit order.
    pub stops: Vec<RouteStopDetail>,
    /// Coordinates from the start through every stop.
    pub path: Vec<Coord<f64>>,
}

/// Route store backed by a single SQLite database.
pub struct SqliteRouteStore {
    connection: Connection,
}

impl fmt::Debug for SqliteRouteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteRouteStore")
            .field("path", &self.connection.path())
            .finish_non_exhaustive()
    }
}

impl SqliteRouteStore {
    /// Open or create the database at `path` and apply the schema.
    ///
    /// # Errors
    /// Returns [`SqliteRouteStoreError::OpenDatabase`] when the file cannot be
    /// opened and [`SqliteRouteStoreError::Database`] when migration fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SqliteRouteStoreError> {
        let path = path.as_ref();
        let connection =
            Connection::open(path).map_err(|source| SqliteRouteStoreError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_connection(connection)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns [`SqliteRouteStoreError::Database`] when SQLite fails.
    pub fn open_in_memory() -> Result<Self, SqliteRouteStoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> Result<Self, SqliteRouteStoreError> {
        migrate(&connection)?;
        Ok(Self { connection })
    }

    /// Insert a location and return its identifier.
    ///
    /// # Errors
    /// Returns [`SqliteRouteStoreError::Database`] when the insert fails.
    pub fn insert_location(
        &self,
        location: &NewLocation,
    ) -> Result<LocationId, SqliteRouteStoreError> {
        insert_location_row(&self.connection, location)
    }

    /// Insert `locations` in one transaction and return their identifiers.
    ///
    /// Either every row is stored or none is.
    ///
    /// # Errors
    /// Returns [`SqliteRouteStoreError::Database`] when any insert fails; the
    /// rows before it are rolled back.
    pub fn insert_locations(
        &self,
        locations: &[NewLocation],
    ) -> Result<Vec<LocationId>, SqliteRouteStoreError> {
        let transaction = self.connection.unchecked_transaction()?;
        let ids = locations
            .iter()
            .map(|location| insert_location_row(&transaction, location))
            .collect::<Result<Vec<_>, _>>()?;
        transaction.commit()?;
        log::debug!("inserted {} locations", ids.len());
        Ok(ids)
    }

    /// Store an exported route: its locations and one route visiting them.
    ///
    /// The vehicle is the available one named `vehicle_name`, falling back to
    /// the first available vehicle. The first location serves as the depot
    /// and the rest become stops in import order, measured with straight-line
    /// distances. Fewer than two locations store no route.
    ///
    /// # Errors
    /// Returns [`SqliteRouteStoreError::NoAvailableVehicle`] when no vehicle
    /// is available and [`SqliteRouteStoreError::Database`] when a write
    /// fails; nothing is stored in either case.
    pub fn import_route(
        &self,
        name: &str,
        vehicle_name: Option<&str>,
        locations: &[NewLocation],
    ) -> Result<RouteImport, SqliteRouteStoreError> {
        let available = self.query_vehicles("", &[])?;
        let vehicle = vehicle_name
            .and_then(|wanted| available.iter().find(|vehicle| vehicle.name == wanted))
            .or_else(|| available.first())
            .cloned()
            .ok_or(SqliteRouteStoreError::NoAvailableVehicle)?;
        let vehicle_id = vehicle.id;

        let transaction = self.connection.unchecked_transaction()?;
        let location_ids = locations
            .iter()
            .map(|location| insert_location_row(&transaction, location))
            .collect::<Result<Vec<_>, _>>()?;
        let route_id = if location_ids.len() >= 2 {
            let plan = imported_plan(&location_ids, locations, vehicle)?;
            write_plan(&transaction, name, &plan)?.first().copied()
        } else {
            None
        };
        transaction.commit()?;
        log::debug!(
            "imported {} locations for '{name}' on vehicle {vehicle_id}",
            location_ids.len()
        );
        Ok(RouteImport {
            location_ids,
            route_id,
            vehicle_id,
        })
    }

    /// Insert a vehicle and return its identifier.
    ///
    /// # Errors
    /// Returns [`SqliteRouteStoreError::Database`] when the insert fails.
    pub fn insert_vehicle(&self, vehicle: &NewVehicle) -> Result<VehicleId, SqliteRouteStoreError> {
        self.connection.execute(
            "INSERT INTO vehicles (name, kind, capacity_litres, fuel_efficiency_km_per_litre,
                                   fuel_tank_litres, start_lon, start_lat)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                vehicle.name,
                vehicle.kind.as_str(),
                vehicle.capacity_litres,
                vehicle.fuel_efficiency_km_per_litre,
                vehicle.fuel_tank_litres,
                vehicle.start.map(|start| start.x),
                vehicle.start.map(|start| start.y),
            ],
        )?;
        Ok(VehicleId(self.last_id()?))
    }

    fn last_id(&self) -> Result<u64, SqliteRouteStoreError> {
        Ok(self
            .connection
            .query_row("SELECT last_insert_rowid()", [], |row| row.get(0))?)
    }

    /// Mark a location as collectable or not.
    ///
    /// # Errors
    /// Returns [`SqliteRouteStoreError::MissingLocation`] for unknown ids.
    pub fn set_location_active(
        &self,
        id: LocationId,
        active: bool,
    ) -> Result<(), SqliteRouteStoreError> {
        let changed = self.connection.execute(
            "UPDATE locations SET is_active = ?1 WHERE id = ?2",
            params![active, id.0],
        )?;
        if changed == 0 {
            return Err(SqliteRouteStoreError::MissingLocation { id });
        }
        Ok(())
    }

    /// Mark a vehicle as available for routing or not.
    ///
    /// # Errors
    /// Returns [`SqliteRouteStoreError::MissingVehicle`] for unknown ids.
    pub fn set_vehicle_available(
        &self,
        id: VehicleId,
        available: bool,
    ) -> Result<(), SqliteRouteStoreError> {
        let changed = self.connection.execute(
            "UPDATE vehicles SET is_available = ?1 WHERE id = ?2",
            params![available, id.0],
        )?;
        if changed == 0 {
            return Err(SqliteRouteStoreError::MissingVehicle { id });
        }
        Ok(())
    }

    /// Persist every route of `plan` under `name`.
    ///
    /// Each vehicle route becomes one `planned` route row with its stops.
    /// The whole plan is written in a single transaction.
    ///
    /// # Errors
    /// Returns [`SqliteRouteStoreError::Database`] when a write fails, for
    /// example because a stop references an unknown location.
    pub fn save_plan(
        &self,
        name: &str,
        plan: &RoutePlan,
    ) -> Result<Vec<RouteId>, SqliteRouteStoreError> {
        let transaction = self.connection.unchecked_transaction()?;
        let ids = write_plan(&transaction, name, plan)?;
        transaction.commit()?;
        log::debug!("saved {} routes as '{name}'", ids.len());
        Ok(ids)
    }

    /// Record an optimisation run and return its identifier.
    ///
    /// # Errors
    /// Returns [`SqliteRouteStoreError::Json`] when the parameters cannot be
    /// encoded and [`SqliteRouteStoreError::Database`] when the insert fails.
    pub fn record_session(&self, session: &NewSession) -> Result<i64, SqliteRouteStoreError> {
        let millis = u64::try_from(session.execution_time.as_millis()).unwrap_or(u64::MAX);
        self.connection.execute(
            "INSERT INTO optimization_sessions (name, solver, parameters, execution_time_ms,
                 quality_score)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                session.name,
                session.solver,
                serde_json::to_string(&session.parameters)?,
                millis,
                session.quality_score,
            ],
        )?;
        Ok(self.connection.last_insert_rowid())
    }

    /// Return up to `limit` recorded runs, newest first.
    ///
    /// # Errors
    /// Returns [`SqliteRouteStoreError`] when reading or decoding fails.
    pub fn optimization_history(
        &self,
        limit: usize,
    ) -> Result<Vec<SessionRecord>, SqliteRouteStoreError> {
        let mut statement = self.connection.prepare(
            "SELECT id, name, solver, parameters, execution_time_ms, quality_score, created_at
             FROM optimization_sessions ORDER BY id DESC LIMIT ?1",
        )?;
        let mut rows = statement.query(params![limit])?;
        let mut sessions = Vec::new();
        while let Some(row) = rows.next()? {
            let parameters: String = row.get(3)?;
            sessions.push(SessionRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                solver: row.get(2)?,
                parameters: serde_json::from_str(&parameters)?,
                execution_time_ms: row.get(4)?,
                quality_score: row.get(5)?,
                created_at: row.get(6)?,
            });
        }
        Ok(sessions)
    }

    /// Summarise a persisted route with its stops.
    ///
    /// # Errors
    /// Returns [`SqliteRouteStoreError::MissingRoute`] for unknown ids.
    pub fn route_statistics(
        &self,
        route_id: RouteId,
    ) -> Result<RouteStatistics, SqliteRouteStoreError> {
        let header = self
            .connection
            .query_row(
                "SELECT r.name, r.vehicle_id, v.name, r.status, r.total_distance_m,
                        r.total_duration_secs, r.load_litres, r.fuel_litres, r.fuel_warning,
                        r.quality_score, r.created_at, r.path
                 FROM optimized_routes r JOIN vehicles v ON v.id = r.vehicle_id
                 WHERE r.id = ?1",
                params![route_id.0],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, u64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, u64>(4)?,
                        row.get::<_, u64>(5)?,
                        row.get::<_, f64>(6)?,
                        row.get::<_, f64>(7)?,
                        row.get::<_, Option<String>>(8)?,
                        row.get::<_, f64>(9)?,
                        row.get::<_, String>(10)?,
                        row.get::<_, String>(11)?,
                    ))
                },
            )
            .optional()?
            .ok_or(SqliteRouteStoreError::MissingRoute { id: route_id })?;
        let (
            name,
            vehicle_id,
            vehicle_name,
            status,
            total_distance_m,
            duration_secs,
            load_litres,
            fuel_litres,
            warning,
            quality_score,
            created_at,
            path,
        ) = header;

        Ok(RouteStatistics {
            route_id,
            name,
            vehicle_id: VehicleId(vehicle_id),
            vehicle_name,
            status,
            total_distance_m,
            total_duration: Duration::from_secs(duration_secs),
            load_litres,
            fuel_litres,
            fuel_warning: warning.as_deref().map(serde_json::from_str).transpose()?,
            quality_score,
            created_at,
            stops: self.route_stops(route_id)?,
            path: serde_json::from_str(&path)?,
        })
    }

    fn route_stops(&self, route_id: RouteId) -> Result<Vec<RouteStopDetail>, SqliteRouteStoreError> {
        let mut statement = self.connection.prepare(
            "SELECT s.location_id, l.name, l.address, s.visit_order, s.demand_litres,
                    l.priority, l.lon, l.lat
             FROM route_stops s JOIN locations l ON l.id = s.location_id
             WHERE s.route_id = ?1 ORDER BY s.visit_order",
        )?;
        let mut rows = statement.query(params![route_id.0])?;
        let mut stops = Vec::new();
        while let Some(row) = rows.next()? {
            stops.push(RouteStopDetail {
                location_id: LocationId(row.get(0)?),
                name: row.get(1)?,
                address: row.get(2)?,
                visit_order: row.get(3)?,
                demand_litres: row.get(4)?,
                priority: parse_text(row, 5, "priority")?,
                coordinate: Coord {
                    x: row.get(6)?,
                    y: row.get(7)?,
                },
            });
        }
        Ok(stops)
    }

    /// Delete a route and its stops.
    ///
    /// # Errors
    /// Returns [`SqliteRouteStoreError::MissingRoute`] for unknown ids.
    pub fn delete_route(&self, route_id: RouteId) -> Result<(), SqliteRouteStoreError> {
        let deleted = self
            .connection
            .execute("DELETE FROM optimized_routes WHERE id = ?1", params![route_id.0])?;
        if deleted == 0 {
            return Err(SqliteRouteStoreError::MissingRoute { id: route_id });
        }
        Ok(())
    }

    fn query_locations(
        &self,
        filter: &str,
        ids: &[u64],
    ) -> Result<Vec<Location>, SqliteRouteStoreError> {
        let query = format!(
            "SELECT id, name, address, lon, lat, kind, priority, demand_litres
             FROM locations WHERE is_active = 1 {filter} ORDER BY id"
        );
        let mut statement = self.connection.prepare(&query)?;
        let mut rows = statement.query(params_from_iter(ids.iter()))?;
        let mut locations = Vec::new();
        while let Some(row) = rows.next()? {
            locations.push(location_from_row(row)?);
        }
        Ok(locations)
    }

    fn query_vehicles(
        &self,
        filter: &str,
        ids: &[u64],
    ) -> Result<Vec<Vehicle>, SqliteRouteStoreError> {
        let query = format!(
            "SELECT id, name, kind, capacity_litres, fuel_efficiency_km_per_litre,
                    fuel_tank_litres, start_lon, start_lat
             FROM vehicles WHERE is_available = 1 {filter} ORDER BY id"
        );
        let mut statement = self.connection.prepare(&query)?;
        let mut rows = statement.query(params_from_iter(ids.iter()))?;
        let mut vehicles = Vec::new();
        while let Some(row) = rows.next()? {
            vehicles.push(vehicle_from_row(row)?);
        }
        Ok(vehicles)
    }
}

impl RecordStore for SqliteRouteStore {
    type Error = SqliteRouteStoreError;

    fn load_locations(&self, ids: &[LocationId]) -> Result<Vec<Location>, Self::Error> {
        if ids.is_empty() {
            return self.query_locations("", &[]);
        }
        let raw: Vec<u64> = ids.iter().map(|id| id.0).collect();
        let mut found = HashMap::with_capacity(raw.len());
        for chunk in raw.chunks(SQLITE_MAX_VARIABLE_NUMBER) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            for location in self.query_locations(&format!("AND id IN ({placeholders})"), chunk)? {
                found.insert(location.id, location);
            }
        }
        ids.iter()
            .map(|id| {
                found
                    .get(id)
                    .cloned()
                    .ok_or(SqliteRouteStoreError::MissingLocation { id: *id })
            })
            .collect()
    }

    fn load_vehicles(&self, ids: &[VehicleId]) -> Result<Vec<Vehicle>, Self::Error> {
        if ids.is_empty() {
            return self.query_vehicles("", &[]);
        }
        let raw: Vec<u64> = ids.iter().map(|id| id.0).collect();
        let mut found = HashMap::with_capacity(raw.len());
        for chunk in raw.chunks(SQLITE_MAX_VARIABLE_NUMBER) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            for vehicle in self.query_vehicles(&format!("AND id IN ({placeholders})"), chunk)? {
                found.insert(vehicle.id, vehicle);
            }
        }
        ids.iter()
            .map(|id| {
                found
                    .get(id)
                    .cloned()
                    .ok_or(SqliteRouteStoreError::MissingVehicle { id: *id })
            })
            .collect()
    }
}

fn insert_location_row(
    connection: &Connection,
    location: &NewLocation,
) -> Result<LocationId, SqliteRouteStoreError> {
    connection.execute(
        "INSERT INTO locations (name, address, lon, lat, kind, priority, demand_litres)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            location.name,
            location.address,
            location.coordinate.x,
            location.coordinate.y,
            location.kind.as_str(),
            location.priority.as_str(),
            location.demand_litres,
        ],
    )?;
    let id: u64 = connection.query_row("SELECT last_insert_rowid()", [], |row| row.get(0))?;
    Ok(LocationId(id))
}

/// Write each vehicle route of `plan` as a `planned` route with its stops.
fn write_plan(
    connection: &Connection,
    name: &str,
    plan: &RoutePlan,
) -> Result<Vec<RouteId>, SqliteRouteStoreError> {
    let mut ids = Vec::with_capacity(plan.routes.len());
    for route in &plan.routes {
        let warning = route
            .fuel
            .warning
            .map(|warning| serde_json::to_string(&warning))
            .transpose()?;
        connection.execute(
            "INSERT INTO optimized_routes (name, vehicle_id, total_distance_m,
                 total_duration_secs, load_litres, fuel_litres, fuel_warning,
                 quality_score, path)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                name,
                route.vehicle_id.0,
                route.distance_m,
                route.duration.as_secs(),
                route.load_litres,
                route.fuel.litres,
                warning,
                plan.quality_score,
                serde_json::to_string(&route.path)?,
            ],
        )?;
        let route_id = RouteId(connection.last_insert_rowid());

        let mut insert = connection.prepare(
            "INSERT INTO route_stops (route_id, location_id, visit_order, demand_litres,
                 distance_from_previous_m, travel_time_secs, cumulative_distance_m,
                 cumulative_time_secs)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for stop in &route.stops {
            insert.execute(params![
                route_id.0,
                stop.location_id.0,
                stop.visit_order,
                stop.demand_litres,
                stop.distance_from_previous_m,
                stop.travel_time_from_previous.as_secs(),
                stop.cumulative_distance_m,
                stop.cumulative_time.as_secs(),
            ])?;
        }
        ids.push(route_id);
    }
    Ok(ids)
}

/// A one-vehicle plan visiting `locations` in order from the first one.
fn imported_plan(
    ids: &[LocationId],
    locations: &[NewLocation],
    vehicle: Vehicle,
) -> Result<RoutePlan, SqliteRouteStoreError> {
    let stored = ids
        .iter()
        .zip(locations)
        .map(|(id, location)| Location {
            id: *id,
            name: location.name.clone(),
            address: location.address.clone(),
            coordinate: location.coordinate,
            kind: location.kind,
            priority: location.priority,
            demand_litres: location.demand_litres,
        })
        .collect();
    let mut request = RouteRequest::new(stored, vec![vehicle]);
    request.depot = ids.first().copied();
    let layout = RouteLayout::new(&request);
    let matrix = GeodesicMatrixProvider::default().route_matrix(layout.points())?;
    let visits: Vec<usize> = (1..ids.len()).collect();
    let diagnostics = Diagnostics {
        solver: IMPORT_SOLVER_NAME.to_owned(),
        ..Diagnostics::default()
    };
    Ok(PlanAssembler::new(&request, &layout, &matrix).plan(
        &[(0, visits)],
        Vec::new(),
        diagnostics,
    ))
}

fn parse_text<T: FromStr>(
    row: &Row<'_>,
    index: usize,
    column: &'static str,
) -> Result<T, SqliteRouteStoreError> {
    let value: String = row.get(index)?;
    value
        .parse()
        .map_err(|_| SqliteRouteStoreError::InvalidValue { column, value })
}

fn location_from_row(row: &Row<'_>) -> Result<Location, SqliteRouteStoreError> {
    Ok(Location {
        id: LocationId(row.get(0)?),
        name: row.get(1)?,
        address: row.get(2)?,
        coordinate: Coord {
            x: row.get(3)?,
            y: row.get(4)?,
        },
        kind: parse_text(row, 5, "kind")?,
        priority: parse_text(row, 6, "priority")?,
        demand_litres: row.get(7)?,
    })
}

fn vehicle_from_row(row: &Row<'_>) -> Result<Vehicle, SqliteRouteStoreError> {
    let start_lon: Option<f64> = row.get(6)?;
    let start_lat: Option<f64> = row.get(7)?;
    Ok(Vehicle {
        id: VehicleId(row.get(0)?),
        name: row.get(1)?,
        kind: parse_text(row, 2, "kind")?,
        capacity_litres: row.get(3)?,
        fuel_efficiency_km_per_litre: row.get(4)?,
        fuel_tank_litres: row.get(5)?,
        start: start_lon.zip(start_lat).map(|(x, y)| Coord { x, y }),
    })
}
