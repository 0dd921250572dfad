//! Optimise command: plan stored records and save the result.

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use sahayog_core::{
    LocationId, NewSession, RecordStore, RouteId, RoutePlan, RouteRequest, VehicleId,
};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::output::write_json;
use crate::records::{StoreHandle, open_existing_store};
use crate::solve::{SolverBuilder, SolverChoice};
use crate::{
    ARG_DATABASE, ARG_LOCATIONS, ARG_OSRM_BASE_URL, ARG_ROUTE_NAME, ARG_SOLVER, ARG_VEHICLES,
    CliError, ENV_OPTIMIZE_DATABASE, ENV_OPTIMIZE_ROUTE_NAME,
};

/// CLI arguments for the `optimize` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load locations and vehicles from the route database, plan \
                 routes, save each vehicle route under the given name and \
                 record the run in the optimisation history. Omitting \
                 --locations or --vehicles selects every active location or \
                 available vehicle.",
    about = "Plan stored locations and save the routes"
)]
#[ortho_config(prefix = "SAHAYOG")]
pub(crate) struct OptimizeArgs {
    /// Path to the SQLite route database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Comma-separated location ids to visit.
    #[arg(long = ARG_LOCATIONS, value_name = "ids", value_delimiter = ',')]
    #[serde(default)]
    pub(crate) locations: Vec<u64>,
    /// Comma-separated vehicle ids to dispatch.
    #[arg(long = ARG_VEHICLES, value_name = "ids", value_delimiter = ',')]
    #[serde(default)]
    pub(crate) vehicles: Vec<u64>,
    /// Name recorded on the saved routes and the history entry.
    #[arg(long = ARG_ROUTE_NAME, value_name = "name")]
    #[serde(default)]
    pub(crate) route_name: Option<String>,
    /// Location vehicles without a start position depart from.
    #[arg(long, value_name = "id")]
    #[serde(default)]
    pub(crate) depot: Option<u64>,
    /// Longest route a vehicle may drive, in minutes.
    #[arg(long, value_name = "minutes")]
    #[serde(default)]
    pub(crate) max_duration_minutes: Option<u32>,
    /// End every route back at its start.
    #[arg(long)]
    #[serde(default)]
    pub(crate) return_to_start: bool,
    /// Solver backend: `vrp` (default) or `greedy`.
    #[arg(long = ARG_SOLVER, value_name = "name")]
    #[serde(default)]
    pub(crate) solver: Option<String>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
}

/// Resolved `optimize` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptimizeConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) locations: Vec<LocationId>,
    pub(crate) vehicles: Vec<VehicleId>,
    pub(crate) route_name: String,
    pub(crate) depot: Option<LocationId>,
    pub(crate) max_duration_minutes: Option<u32>,
    pub(crate) return_to_start: bool,
    pub(crate) choice: SolverChoice,
}

impl TryFrom<OptimizeArgs> for OptimizeConfig {
    type Error = CliError;

    fn try_from(args: OptimizeArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_OPTIMIZE_DATABASE,
        })?;
        let route_name = args
            .route_name
            .filter(|name| !name.trim().is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_ROUTE_NAME,
                env: ENV_OPTIMIZE_ROUTE_NAME,
            })?;
        let choice = SolverChoice::from_options(args.solver.as_deref(), args.osrm_base_url)?;
        Ok(Self {
            database,
            locations: args.locations.into_iter().map(LocationId).collect(),
            vehicles: args.vehicles.into_iter().map(VehicleId).collect(),
            route_name,
            depot: args.depot.map(LocationId),
            max_duration_minutes: args.max_duration_minutes,
            return_to_start: args.return_to_start,
            choice,
        })
    }
}

impl OptimizeConfig {
    /// Parameters recorded with the history entry.
    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "locations": self.locations,
            "vehicles": self.vehicles,
            "depot": self.depot,
            "max_duration_minutes": self.max_duration_minutes,
            "return_to_start": self.return_to_start,
            "osrm": self.choice.osrm_base_url.is_some(),
        })
    }
}

/// What `optimize` prints.
#[derive(Debug, Serialize)]
struct OptimizeOutput<'a> {
    session_id: i64,
    route_ids: Vec<RouteId>,
    plan: &'a RoutePlan,
}

pub(crate) fn run_optimize_with(
    args: OptimizeArgs,
    builder: &dyn SolverBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = OptimizeConfig::try_from(merged)?;
    let store = open_existing_store(&config.database)?;
    let request = build_request(&store, &config)?;
    request
        .validate_detailed()
        .map_err(CliError::InvalidRouteRequest)?;

    let solver = builder.build(&config.choice, &request)?;
    let plan = solver.solve(&request).map_err(CliError::Solve)?;
    let route_ids = store.run(|store| store.save_plan(&config.route_name, &plan))?;
    let session = NewSession::from_plan(config.route_name.clone(), &plan, config.parameters());
    let session_id = store.run(|store| store.record_session(&session))?;
    log::info!(
        "saved {} routes for '{}' as session {session_id}",
        route_ids.len(),
        config.route_name
    );

    write_json(
        writer,
        &OptimizeOutput {
            session_id,
            route_ids,
            plan: &plan,
        },
    )
}

/// Load the selected records, adding the depot when it was not selected.
fn build_request(store: &StoreHandle, config: &OptimizeConfig) -> Result<RouteRequest, CliError> {
    let mut locations = store.run(|store| store.load_locations(&config.locations))?;
    if let Some(depot) = config.depot
        && !locations.iter().any(|location| location.id == depot)
    {
        locations.extend(store.run(|store| store.load_locations(&[depot]))?);
    }
    let vehicles = store.run(|store| store.load_vehicles(&config.vehicles))?;

    let mut request = RouteRequest::new(locations, vehicles);
    request.depot = config.depot;
    request.max_route_minutes = config.max_duration_minutes;
    request.return_to_start = config.return_to_start;
    Ok(request)
}
