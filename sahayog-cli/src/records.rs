//! Commands that read or change the route database directly.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use sahayog_core::{
    DEFAULT_HISTORY_LIMIT, LocationId, NewLocation, RouteId, SqliteRouteStore,
    SqliteRouteStoreError, VehicleId,
};
use sahayog_data::import::read_locations;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::output::write_json;
use crate::solve::require_existing;
use crate::{
    ARG_DATABASE, ARG_IMPORT_FILE, ARG_ROUTE_ID, CliError, ENV_DELETE_DATABASE,
    ENV_DELETE_ROUTE_ID, ENV_HISTORY_DATABASE, ENV_IMPORT_DATABASE, ENV_IMPORT_FILE,
    ENV_STATS_DATABASE, ENV_STATS_ROUTE_ID,
};

/// An open route database that tags its errors with the file path.
#[derive(Debug)]
pub(crate) struct StoreHandle {
    path: Utf8PathBuf,
    store: SqliteRouteStore,
}

impl StoreHandle {
    fn open(path: &Utf8Path) -> Result<Self, CliError> {
        let store = SqliteRouteStore::open(path.as_std_path()).map_err(|source| {
            CliError::Store {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            store,
        })
    }

    /// Run one store operation, mapping its error.
    pub(crate) fn run<T>(
        &self,
        operation: impl FnOnce(&SqliteRouteStore) -> Result<T, SqliteRouteStoreError>,
    ) -> Result<T, CliError> {
        operation(&self.store).map_err(|source| CliError::Store {
            path: self.path.clone(),
            source,
        })
    }
}

/// Open a database that must already exist.
pub(crate) fn open_existing_store(path: &Utf8Path) -> Result<StoreHandle, CliError> {
    require_existing(path, ARG_DATABASE)?;
    StoreHandle::open(path)
}

fn require_database(
    database: Option<Utf8PathBuf>,
    env: &'static str,
) -> Result<Utf8PathBuf, CliError> {
    database.ok_or(CliError::MissingArgument {
        field: ARG_DATABASE,
        env,
    })
}

fn require_route_id(route_id: Option<i64>, env: &'static str) -> Result<RouteId, CliError> {
    route_id.map(RouteId).ok_or(CliError::MissingArgument {
        field: ARG_ROUTE_ID,
        env,
    })
}

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Import locations from a JSON file: an array of location \
                 objects, an exported route with stops, or an object with a \
                 path of [latitude, longitude] pairs. Rows without \
                 coordinates are skipped. An exported route is also saved \
                 as a route from its first location, driven by the \
                 available vehicle it names or else the first available \
                 one. Every row is stored or none is. The database is \
                 created when missing.",
    about = "Import locations from JSON"
)]
#[ortho_config(prefix = "SAHAYOG")]
pub(crate) struct ImportArgs {
    /// Path to the JSON import file.
    #[arg(value_name = "file")]
    #[serde(default)]
    pub(crate) file: Option<Utf8PathBuf>,
    /// Path to the SQLite route database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

/// What `import` prints.
#[derive(Debug, Serialize)]
struct ImportSummary {
    total_items: usize,
    imported: usize,
    skipped: usize,
    location_ids: Vec<LocationId>,
    route_name: Option<String>,
    route_id: Option<RouteId>,
    vehicle_id: Option<VehicleId>,
}

pub(crate) fn run_import(args: ImportArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let file = merged.file.ok_or(CliError::MissingArgument {
        field: ARG_IMPORT_FILE,
        env: ENV_IMPORT_FILE,
    })?;
    let database = require_database(merged.database, ENV_IMPORT_DATABASE)?;
    require_existing(&file, ARG_IMPORT_FILE)?;

    let report = read_locations(&file)?;
    sahayog_fs::ensure_parent_dir(&database).map_err(|source| CliError::InspectSourcePath {
        field: ARG_DATABASE,
        path: database.clone(),
        source,
    })?;
    let store = StoreHandle::open(&database)?;
    let total_items = report.total_items();
    let rows: Vec<NewLocation> = report.locations.into_iter().map(NewLocation::from).collect();
    let (location_ids, route_id, vehicle_id) = match report.route_name.as_deref() {
        Some(name) => {
            let import = store.run(|store| {
                store.import_route(name, report.vehicle_name.as_deref(), &rows)
            })?;
            (import.location_ids, import.route_id, Some(import.vehicle_id))
        }
        None => (store.run(|store| store.insert_locations(&rows))?, None, None),
    };
    if report.skipped > 0 {
        log::warn!("skipped {} of {total_items} rows in {file}", report.skipped);
    }

    write_json(
        writer,
        &ImportSummary {
            total_items,
            imported: location_ids.len(),
            skipped: report.skipped,
            location_ids,
            route_name: report.route_name,
            route_id,
            vehicle_id,
        },
    )
}

/// CLI arguments for the `history` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "List recent optimisation runs, newest first")]
#[ortho_config(prefix = "SAHAYOG")]
pub(crate) struct HistoryArgs {
    /// Path to the SQLite route database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Number of runs to list.
    #[arg(long, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

pub(crate) fn run_history(args: HistoryArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let database = require_database(merged.database, ENV_HISTORY_DATABASE)?;
    let limit = merged.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let store = open_existing_store(&database)?;
    let sessions = store.run(|store| store.optimization_history(limit))?;
    write_json(writer, &sessions)
}

/// CLI arguments for the `stats` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Show a saved route with its stops")]
#[ortho_config(prefix = "SAHAYOG")]
pub(crate) struct StatsArgs {
    /// Identifier of the saved route.
    #[arg(value_name = "route-id")]
    #[serde(default)]
    pub(crate) route_id: Option<i64>,
    /// Path to the SQLite route database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

pub(crate) fn run_stats(args: StatsArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let route_id = require_route_id(merged.route_id, ENV_STATS_ROUTE_ID)?;
    let database = require_database(merged.database, ENV_STATS_DATABASE)?;
    let store = open_existing_store(&database)?;
    let statistics = store.run(|store| store.route_statistics(route_id))?;
    write_json(writer, &statistics)
}

/// CLI arguments for the `delete` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Delete a saved route and its stops")]
#[ortho_config(prefix = "SAHAYOG")]
pub(crate) struct DeleteArgs {
    /// Identifier of the saved route.
    #[arg(value_name = "route-id")]
    #[serde(default)]
    pub(crate) route_id: Option<i64>,
    /// Path to the SQLite route database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

/// What `delete` prints.
#[derive(Debug, Serialize)]
struct DeleteSummary {
    deleted: RouteId,
}

pub(crate) fn run_delete(args: DeleteArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let route_id = require_route_id(merged.route_id, ENV_DELETE_ROUTE_ID)?;
    let database = require_database(merged.database, ENV_DELETE_DATABASE)?;
    let store = open_existing_store(&database)?;
    store.run(|store| store.delete_route(route_id))?;
    log::info!("deleted route {route_id}");
    write_json(writer, &DeleteSummary { deleted: route_id })
}
