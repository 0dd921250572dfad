//! [`MatrixProvider`] backed by OSRM's Table API.
//!
//! # Architecture
//!
//! [`MatrixProvider`] is synchronous so solvers stay embeddable in plain
//! threads. This provider bridges the async HTTP call to that interface by
//! blocking on a Tokio runtime it owns.

use std::time::Duration;

use geo::Coord;
use reqwest::Client;
use sahayog_core::{MatrixError, MatrixProvider, RouteMatrix, UNREACHABLE_DISTANCE};
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::osrm::{TableResponse, TableRow};

/// Error type for [`OsrmMatrixProvider`] construction failures.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The configured base URL does not parse.
    #[error("invalid OSRM base URL '{url}': {source}")]
    InvalidBaseUrl {
        /// Configured value.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
}

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "sahayog-routing/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default OSRM routing profile.
const DEFAULT_PROFILE: &str = "driving";

/// Configuration for [`OsrmMatrixProvider`].
#[derive(Debug, Clone)]
pub struct OsrmConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Routing profile segment of the request path.
    pub profile: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_owned(),
            profile: DEFAULT_PROFILE.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl OsrmConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the routing profile, e.g. `"driving"` or `"truck"`.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Road distance and travel-time provider using the OSRM Table API.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the provider blocks on its own current-thread
/// runtime. Inside a multi-threaded runtime it uses that runtime's handle
/// with [`tokio::task::block_in_place`]. Inside a `current_thread` runtime
/// it falls back to its own runtime, which blocks the caller's executor for
/// the duration of the request.
pub struct OsrmMatrixProvider {
    client: Client,
    config: OsrmConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for OsrmMatrixProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsrmMatrixProvider")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl OsrmMatrixProvider {
    /// Create a provider for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(OsrmConfig::new(base_url))
    }

    /// Create a provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn with_config(config: OsrmConfig) -> Result<Self, ProviderBuildError> {
        Url::parse(&config.base_url).map_err(|source| ProviderBuildError::InvalidBaseUrl {
            url: config.base_url.clone(),
            source,
        })?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &OsrmConfig {
        &self.config
    }

    /// Build the Table API URL for `points`.
    ///
    /// The format is `{base_url}/table/v1/{profile}/{coordinates}` with
    /// semicolon-separated `lon,lat` pairs.
    fn build_table_url(&self, points: &[Coord<f64>]) -> String {
        let coords = points
            .iter()
            .map(|point| format!("{},{}", point.x, point.y))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/table/v1/{}/{}?annotations=duration,distance",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            coords
        )
    }

    async fn fetch_matrix_async(&self, points: &[Coord<f64>]) -> Result<RouteMatrix, MatrixError> {
        let url = self.build_table_url(points);
        log::debug!("requesting {}x{} matrix from {url}", points.len(), points.len());

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;
        let parsed = serde_json::from_str::<TableResponse>(&body);

        let table = match parsed {
            Ok(table) if status.is_success() || !table.is_ok() => table,
            _ if !status.is_success() => {
                return Err(MatrixError::Http {
                    url,
                    status: status.as_u16(),
                    message: status.canonical_reason().unwrap_or_default().to_owned(),
                });
            }
            Ok(table) => table,
            Err(err) => {
                return Err(MatrixError::Parse {
                    message: err.to_string(),
                });
            }
        };

        let matrix = convert_response(table)?;
        matrix.ensure_size(points.len())?;
        Ok(matrix)
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> MatrixError {
        if error.is_timeout() {
            return MatrixError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        MatrixError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

/// Convert an OSRM response into a [`RouteMatrix`].
///
/// Null, negative and non-finite cells mark unreachable pairs. Values are
/// rounded to whole metres and seconds.
fn convert_response(response: TableResponse) -> Result<RouteMatrix, MatrixError> {
    if !response.is_ok() {
        return Err(MatrixError::Service {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }

    let durations = response.durations.ok_or_else(|| MatrixError::Parse {
        message: "OSRM response missing durations array".to_owned(),
    })?;
    let distances = response.distances.ok_or_else(|| MatrixError::Parse {
        message: "OSRM response missing distances array".to_owned(),
    })?;

    let unreachable = durations
        .iter()
        .flatten()
        .filter(|cell| valid_cell(**cell).is_none())
        .count();
    if unreachable > 0 {
        log::warn!("OSRM reported {unreachable} unroutable point pairs");
    }

    RouteMatrix::new(
        convert_rows(distances, UNREACHABLE_DISTANCE, |metres| metres),
        convert_rows(durations, Duration::MAX, Duration::from_secs),
    )
}

fn convert_rows<T, F>(rows: Vec<TableRow>, unreachable: T, convert: F) -> Vec<Vec<T>>
where
    T: Copy,
    F: Fn(u64) -> T,
{
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| valid_cell(cell).map_or(unreachable, &convert))
                .collect()
        })
        .collect()
}

fn valid_cell(cell: Option<f64>) -> Option<u64> {
    cell.filter(|value| value.is_finite() && *value >= 0.0)
        .map(|value| value.round() as u64)
}

impl MatrixProvider for OsrmMatrixProvider {
    /// Fetch the matrix for `points`.
    ///
    /// When called from within an existing Tokio runtime, the runtime should
    /// be multi-threaded; a `current_thread` caller is blocked while the
    /// provider's own runtime runs the request.
    fn route_matrix(&self, points: &[Coord<f64>]) -> Result<RouteMatrix, MatrixError> {
        if points.is_empty() {
            return Err(MatrixError::EmptyInput);
        }

        let future = self.fetch_matrix_async(points);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}
