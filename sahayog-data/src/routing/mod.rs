//! Road matrices from an OSRM routing service.
//!
//! [`OsrmMatrixProvider`] implements [`sahayog_core::MatrixProvider`] on top
//! of OSRM's Table API, asking for both durations and distances in one
//! request. The trait is synchronous, so the provider blocks on its own
//! Tokio runtime while the HTTP call runs.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use geo::Coord;
//! use sahayog_core::MatrixProvider;
//! use sahayog_data::routing::{OsrmConfig, OsrmMatrixProvider};
//!
//! let config = OsrmConfig::new("http://localhost:5000")
//!     .with_profile("driving")
//!     .with_timeout(Duration::from_secs(60));
//! let provider = OsrmMatrixProvider::with_config(config)?;
//!
//! let matrix = provider.route_matrix(&[
//!     Coord { x: 73.85, y: 18.52 },
//!     Coord { x: 73.86, y: 18.53 },
//! ])?;
//! println!("{:?}", matrix.distance(0, 1));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod osrm;
mod provider;

pub use provider::{DEFAULT_USER_AGENT, OsrmConfig, OsrmMatrixProvider, ProviderBuildError};
