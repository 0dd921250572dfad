//! Table definitions for the route store.

use rusqlite::Connection;

/// Current schema version recorded in `PRAGMA user_version`.
pub(crate) const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS locations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    address TEXT NOT NULL DEFAULT '',
    lon REAL NOT NULL CHECK (lon BETWEEN -180 AND 180),
    lat REAL NOT NULL CHECK (lat BETWEEN -90 AND 90),
    kind TEXT NOT NULL DEFAULT 'bin',
    priority TEXT NOT NULL DEFAULT 'medium',
    demand_litres REAL NOT NULL DEFAULT 0 CHECK (demand_litres >= 0),
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS vehicles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    kind TEXT NOT NULL DEFAULT 'truck',
    capacity_litres REAL NOT NULL,
    fuel_efficiency_km_per_litre REAL,
    fuel_tank_litres REAL,
    start_lon REAL,
    start_lat REAL,
    is_available INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS optimized_routes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    vehicle_id INTEGER NOT NULL REFERENCES vehicles(id),
    status TEXT NOT NULL DEFAULT 'planned',
    total_distance_m INTEGER NOT NULL,
    total_duration_secs INTEGER NOT NULL,
    load_litres REAL NOT NULL,
    fuel_litres REAL NOT NULL,
    fuel_warning TEXT,
    quality_score REAL NOT NULL,
    path TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS route_stops (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    route_id INTEGER NOT NULL REFERENCES optimized_routes(id) ON DELETE CASCADE,
    location_id INTEGER NOT NULL REFERENCES locations(id),
    visit_order INTEGER NOT NULL,
    demand_litres REAL NOT NULL,
    distance_from_previous_m INTEGER NOT NULL,
    travel_time_secs INTEGER NOT NULL,
    cumulative_distance_m INTEGER NOT NULL,
    cumulative_time_secs INTEGER NOT NULL,
    UNIQUE (route_id, visit_order)
);

CREATE INDEX IF NOT EXISTS route_stops_route ON route_stops (route_id);

CREATE TABLE IF NOT EXISTS optimization_sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    solver TEXT NOT NULL,
    parameters TEXT NOT NULL,
    execution_time_ms INTEGER NOT NULL,
    quality_score REAL NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
";

/// Enable foreign keys and create any missing tables.
pub(crate) fn migrate(connection: &Connection) -> rusqlite::Result<()> {
    connection.pragma_update(None, "foreign_keys", true)?;
    connection.execute_batch(SCHEMA)?;
    connection.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}
