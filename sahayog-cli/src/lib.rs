//! Command-line interface for the Sahayog routing engine.
//!
//! `sahayog solve` plans an inline JSON request. The remaining commands work
//! against a SQLite route database: `optimize` plans stored locations with
//! stored vehicles and saves the routes, `import` loads location exports,
//! and `history`, `stats` and `delete` report on or remove saved work.
#![forbid(unsafe_code)]

mod error;
mod logging;
mod optimize;
mod output;
mod records;
mod solve;

use clap::{Parser, Subcommand};
use std::io::Write;

pub use error::CliError;
pub use logging::{DEFAULT_LOG_FILTER, init_logging};

use optimize::OptimizeArgs;
use records::{DeleteArgs, HistoryArgs, ImportArgs, StatsArgs};
use solve::{DefaultSolverBuilder, SolveArgs, SolverBuilder};

pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_REQUEST: &str = "request";
pub(crate) const ARG_ROUTE_ID: &str = "route-id";
pub(crate) const ARG_IMPORT_FILE: &str = "file";
pub(crate) const ARG_LOCATIONS: &str = "locations";
pub(crate) const ARG_VEHICLES: &str = "vehicles";
pub(crate) const ARG_ROUTE_NAME: &str = "route-name";
pub(crate) const ARG_SOLVER: &str = "solver";
pub(crate) const ARG_OSRM_BASE_URL: &str = "osrm-base-url";
pub(crate) const ENV_SOLVE_REQUEST: &str = "SAHAYOG_CMDS_SOLVE_REQUEST_PATH";
pub(crate) const ENV_OPTIMIZE_DATABASE: &str = "SAHAYOG_CMDS_OPTIMIZE_DATABASE";
pub(crate) const ENV_OPTIMIZE_ROUTE_NAME: &str = "SAHAYOG_CMDS_OPTIMIZE_ROUTE_NAME";
pub(crate) const ENV_IMPORT_DATABASE: &str = "SAHAYOG_CMDS_IMPORT_DATABASE";
pub(crate) const ENV_IMPORT_FILE: &str = "SAHAYOG_CMDS_IMPORT_FILE";
pub(crate) const ENV_HISTORY_DATABASE: &str = "SAHAYOG_CMDS_HISTORY_DATABASE";
pub(crate) const ENV_STATS_DATABASE: &str = "SAHAYOG_CMDS_STATS_DATABASE";
pub(crate) const ENV_STATS_ROUTE_ID: &str = "SAHAYOG_CMDS_STATS_ROUTE_ID";
pub(crate) const ENV_DELETE_DATABASE: &str = "SAHAYOG_CMDS_DELETE_DATABASE";
pub(crate) const ENV_DELETE_ROUTE_ID: &str = "SAHAYOG_CMDS_DELETE_ROUTE_ID";

/// Run the Sahayog CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns a [`CliError`] describing the first failure: argument parsing,
/// configuration, solving, database access or output.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    run_command(cli.command, &DefaultSolverBuilder, &mut stdout)
}

fn run_command(
    command: Command,
    builder: &dyn SolverBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        Command::Solve(args) => solve::run_solve_with(args, builder, writer),
        Command::Optimize(args) => optimize::run_optimize_with(args, builder, writer),
        Command::Import(args) => records::run_import(args, writer),
        Command::History(args) => records::run_history(args, writer),
        Command::Stats(args) => records::run_stats(args, writer),
        Command::Delete(args) => records::run_delete(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "sahayog",
    about = "Plan waste-collection routes for a vehicle fleet",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve a JSON route request and print the plan.
    Solve(SolveArgs),
    /// Plan stored locations with stored vehicles and save the routes.
    Optimize(OptimizeArgs),
    /// Import locations from a JSON export into the route database.
    Import(ImportArgs),
    /// List recent optimisation runs.
    History(HistoryArgs),
    /// Show a saved route with its stops.
    Stats(StatsArgs),
    /// Delete a saved route.
    Delete(DeleteArgs),
}

#[cfg(test)]
mod tests;
