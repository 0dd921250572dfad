//! Data sources for the Sahayog routing engine.
//!
//! [`import`] turns location export files into records for the route store,
//! and [`routing`] fetches road distance and travel-time matrices from an
//! OSRM service.
#![forbid(unsafe_code)]

pub mod import;
pub mod routing;
