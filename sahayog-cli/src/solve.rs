//! Solve command implementation for the Sahayog CLI.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use sahayog_core::{GeodesicMatrixProvider, MatrixProvider, RouteRequest, Solver};
use sahayog_data::routing::OsrmMatrixProvider;
use sahayog_fs::open_utf8_file;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Write};
use std::str::FromStr;

use crate::output::write_json;
use crate::{ARG_OSRM_BASE_URL, ARG_REQUEST, ARG_SOLVER, CliError, ENV_SOLVE_REQUEST};

/// Backend used to plan routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum SolverKind {
    /// Metaheuristic search through `vrp-core`.
    #[default]
    Vrp,
    /// Deterministic nearest-neighbour construction.
    Greedy,
}

impl FromStr for SolverKind {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vrp" => Ok(Self::Vrp),
            "greedy" => Ok(Self::Greedy),
            _ => Err(CliError::UnknownSolver { name: s.to_owned() }),
        }
    }
}

/// How to build the solver for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct SolverChoice {
    /// Backend to use.
    pub(crate) kind: SolverKind,
    /// OSRM service for road matrices; straight-line distances when absent.
    pub(crate) osrm_base_url: Option<String>,
}

impl SolverChoice {
    pub(crate) fn from_options(
        solver: Option<&str>,
        osrm_base_url: Option<String>,
    ) -> Result<Self, CliError> {
        let kind = solver.map(SolverKind::from_str).transpose()?.unwrap_or_default();
        Ok(Self {
            kind,
            osrm_base_url: osrm_base_url.filter(|url| !url.trim().is_empty()),
        })
    }
}

/// Builds a solver instance for the current invocation.
pub(crate) trait SolverBuilder {
    fn build(
        &self,
        choice: &SolverChoice,
        request: &RouteRequest,
    ) -> Result<Box<dyn Solver>, CliError>;
}

/// Builds the solvers compiled into this binary.
pub(crate) struct DefaultSolverBuilder;

impl SolverBuilder for DefaultSolverBuilder {
    fn build(
        &self,
        choice: &SolverChoice,
        request: &RouteRequest,
    ) -> Result<Box<dyn Solver>, CliError> {
        match &choice.osrm_base_url {
            Some(base_url) => {
                let provider = OsrmMatrixProvider::new(base_url.clone()).map_err(|source| {
                    CliError::BuildMatrixProvider {
                        base_url: base_url.clone(),
                        source,
                    }
                })?;
                boxed_solver(choice.kind, provider)
            }
            None => boxed_solver(
                choice.kind,
                GeodesicMatrixProvider::new(request.average_speed_kmh),
            ),
        }
    }
}

fn boxed_solver<M>(kind: SolverKind, provider: M) -> Result<Box<dyn Solver>, CliError>
where
    M: MatrixProvider + Send + Sync + 'static,
{
    match kind {
        #[cfg(feature = "solver-vrp")]
        SolverKind::Vrp => Ok(Box::new(sahayog_solver_vrp::VrpSolver::new(provider))),
        #[cfg(feature = "solver-greedy")]
        SolverKind::Greedy => Ok(Box::new(sahayog_solver_greedy::GreedySolver::new(
            provider,
        ))),
        #[cfg(not(feature = "solver-vrp"))]
        SolverKind::Vrp => Err(CliError::MissingFeature {
            feature: "solver-vrp",
            action: "the vrp solver",
        }),
        #[cfg(not(feature = "solver-greedy"))]
        SolverKind::Greedy => Err(CliError::MissingFeature {
            feature: "solver-greedy",
            action: "the greedy solver",
        }),
    }
}

/// CLI arguments for the `solve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Solve a route request given as JSON: locations, vehicles \
                 and optional depot, shift limit and return-to-start flag. \
                 Road matrices come from OSRM when a base URL is set and \
                 from straight-line distances otherwise.",
    about = "Solve a JSON route request"
)]
#[ortho_config(prefix = "SAHAYOG")]
pub(crate) struct SolveArgs {
    /// Path to a JSON file containing a route request.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Solver backend: `vrp` (default) or `greedy`.
    #[arg(long = ARG_SOLVER, value_name = "name")]
    #[serde(default)]
    pub(crate) solver: Option<String>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
}

impl SolveArgs {
    pub(crate) fn into_config(self) -> Result<SolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SolveConfig::try_from(merged)
    }
}

/// Resolved `solve` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SolveConfig {
    /// Path to the JSON request file.
    pub(crate) request_path: Utf8PathBuf,
    /// Solver selection.
    pub(crate) choice: SolverChoice,
}

impl TryFrom<SolveArgs> for SolveConfig {
    type Error = CliError;

    fn try_from(args: SolveArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_SOLVE_REQUEST,
        })?;
        let choice = SolverChoice::from_options(args.solver.as_deref(), args.osrm_base_url)?;
        Ok(Self {
            request_path,
            choice,
        })
    }
}

/// Fail unless `path` names an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match sahayog_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) if sahayog_fs::path_exists(path).unwrap_or(false) => {
            Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Ok(false) => Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub(crate) fn run_solve_with(
    args: SolveArgs,
    builder: &dyn SolverBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.request_path, ARG_REQUEST)?;
    let request = load_route_request(&config.request_path)?;
    request
        .validate_detailed()
        .map_err(CliError::InvalidRouteRequest)?;
    let solver = builder.build(&config.choice, &request)?;
    let plan = solver.solve(&request).map_err(CliError::Solve)?;
    log::info!(
        "solved {} locations: {} routes, status {}",
        request.visit_locations().count(),
        plan.routes.len(),
        plan.status.as_str()
    );
    write_json(writer, &plan)
}

/// Loads a JSON-encoded [`RouteRequest`] from disk.
pub(crate) fn load_route_request(path: &Utf8Path) -> Result<RouteRequest, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenRouteRequest {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseRouteRequest {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SolveConfig, CliError> {
    let merged = SolveArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SolveConfig::try_from(merged)
}
