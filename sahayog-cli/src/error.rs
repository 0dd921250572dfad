//! Error types emitted by the Sahayog CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use sahayog_core::{RouteRequestValidationError, SolveError, SqliteRouteStoreError};
use sahayog_data::import::ImportError;
use sahayog_data::routing::ProviderBuildError;
use thiserror::Error;

/// Errors emitted by the Sahayog CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The requested solver was not compiled into this build.
    #[error("{action} requires the `{feature}` feature to be enabled")]
    MissingFeature {
        feature: &'static str,
        action: &'static str,
    },
    /// The solver name is not recognised.
    #[error("unknown solver '{name}' (expected vrp or greedy)")]
    UnknownSolver { name: String },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the route request file failed.
    #[error("failed to open route request at {path:?}: {source}")]
    OpenRouteRequest {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Route request JSON could not be decoded.
    #[error("failed to parse route request JSON at {path:?}: {source}")]
    ParseRouteRequest {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The route request failed validation.
    #[error("route request failed validation: {0}")]
    InvalidRouteRequest(#[source] RouteRequestValidationError),
    /// Constructing the OSRM matrix provider failed.
    #[error("failed to build OSRM matrix provider for {base_url:?}: {source}")]
    BuildMatrixProvider {
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// The solver rejected the request.
    #[error("solver failed: {0}")]
    Solve(#[source] SolveError),
    /// Reading or writing the route database failed.
    #[error("route database {path:?}: {source}")]
    Store {
        path: Utf8PathBuf,
        #[source]
        source: SqliteRouteStoreError,
    },
    /// Importing locations failed.
    #[error(transparent)]
    Import(#[from] ImportError),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
