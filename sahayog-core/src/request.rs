//! Route optimisation requests and their validation rules.

use std::collections::HashSet;
use std::time::Duration;

use thiserror::Error;

use crate::{Location, LocationId, SolveError, Vehicle, VehicleId, is_valid_coordinate};

/// Average road speed assumed when none is supplied, in km/h.
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 30.0;

/// Largest demand or capacity a request may carry, in litres.
///
/// Solvers count loads in `i32` whole litres; any two values at or below
/// this bound still add up without overflow.
pub const MAX_LITRES: f64 = 1.0e9;

/// Parameters for a route optimisation.
///
/// Locations listed here are candidates for collection; the optional depot is
/// one of them and is never itself a visit. Vehicles without an explicit
/// start depart from the depot, or from the first location when no depot is
/// named.
///
/// # Examples
/// ```rust
/// use geo::Coord;
/// use sahayog_core::{Location, LocationId, RouteRequest, Vehicle, VehicleId};
///
/// let request = RouteRequest::new(
///     vec![
///         Location::new(LocationId(1), "North bin", Coord { x: 73.85, y: 18.52 }),
///         Location::new(LocationId(2), "South bin", Coord { x: 73.86, y: 18.50 }),
///     ],
///     vec![Vehicle::new(VehicleId(1), "Truck", 1_000.0)],
/// )
/// .with_max_route_minutes(90);
///
/// assert!(request.validate().is_ok());
/// assert_eq!(request.visit_locations().count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteRequest {
    /// Locations available for collection.
    pub locations: Vec<Location>,
    /// Vehicles available to serve them.
    pub vehicles: Vec<Vehicle>,
    /// Location vehicles without a start position depart from.
    #[cfg_attr(feature = "serde", serde(default))]
    pub depot: Option<LocationId>,
    /// Upper bound on each vehicle's route duration, in minutes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_route_minutes: Option<u32>,
    /// Whether routes end back at their start.
    #[cfg_attr(feature = "serde", serde(default))]
    pub return_to_start: bool,
    /// Speed used to derive travel times from distances.
    #[cfg_attr(feature = "serde", serde(default = "default_average_speed_kmh"))]
    pub average_speed_kmh: f64,
    /// Treat any unassigned location as an infeasible result.
    #[cfg_attr(feature = "serde", serde(default))]
    pub require_all: bool,
}

#[cfg(feature = "serde")]
const fn default_average_speed_kmh() -> f64 {
    DEFAULT_AVERAGE_SPEED_KMH
}

/// Reasons a [`RouteRequest`] is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteRequestValidationError {
    /// At least two locations are required.
    #[error("at least two locations are required, found {found}")]
    TooFewLocations {
        /// Number of locations supplied.
        found: usize,
    },
    /// No vehicle was supplied.
    #[error("at least one vehicle is required")]
    NoVehicles,
    /// A location lacks a valid coordinate.
    #[error("location {id} has an invalid coordinate")]
    InvalidCoordinate {
        /// Offending location.
        id: LocationId,
    },
    /// A vehicle start position is not a valid coordinate.
    #[error("vehicle {id} has an invalid start coordinate")]
    InvalidVehicleStart {
        /// Offending vehicle.
        id: VehicleId,
    },
    /// The same location id appears twice.
    #[error("location {id} is listed more than once")]
    DuplicateLocation {
        /// Repeated identifier.
        id: LocationId,
    },
    /// The same vehicle id appears twice.
    #[error("vehicle {id} is listed more than once")]
    DuplicateVehicle {
        /// Repeated identifier.
        id: VehicleId,
    },
    /// The depot is not one of the request locations.
    #[error("depot {id} is not among the request locations")]
    UnknownDepot {
        /// Requested depot identifier.
        id: LocationId,
    },
    /// A demand is negative, not finite or above [`MAX_LITRES`].
    #[error("location {id} has an invalid demand")]
    InvalidDemand {
        /// Offending location.
        id: LocationId,
    },
    /// A capacity is not positive or exceeds [`MAX_LITRES`].
    #[error("vehicle {id} must have a positive capacity of at most {MAX_LITRES} litres")]
    InvalidCapacity {
        /// Offending vehicle.
        id: VehicleId,
    },
    /// A fuel figure is negative or not finite.
    #[error("vehicle {id} has invalid fuel data")]
    InvalidFuelData {
        /// Offending vehicle.
        id: VehicleId,
    },
    /// The duration limit was zero.
    #[error("max route duration must be positive")]
    ZeroRouteDuration,
    /// The average speed is not a positive finite number.
    #[error("average speed must be positive")]
    InvalidSpeed,
}

impl RouteRequest {
    /// Construct an open-route request with default speed and no duration
    /// limit.
    #[must_use]
    pub const fn new(locations: Vec<Location>, vehicles: Vec<Vehicle>) -> Self {
        Self {
            locations,
            vehicles,
            depot: None,
            max_route_minutes: None,
            return_to_start: false,
            average_speed_kmh: DEFAULT_AVERAGE_SPEED_KMH,
            require_all: false,
        }
    }

    /// Name the depot location.
    #[must_use]
    pub const fn with_depot(mut self, depot: LocationId) -> Self {
        self.depot = Some(depot);
        self
    }

    /// Limit each route to `minutes`.
    #[must_use]
    pub const fn with_max_route_minutes(mut self, minutes: u32) -> Self {
        self.max_route_minutes = Some(minutes);
        self
    }

    /// Require routes to return to their start.
    #[must_use]
    pub const fn returning_to_start(mut self) -> Self {
        self.return_to_start = true;
        self
    }

    /// Report the plan as infeasible unless every location is served.
    #[must_use]
    pub const fn requiring_all(mut self) -> Self {
        self.require_all = true;
        self
    }

    /// The duration limit as a [`Duration`].
    #[must_use]
    pub fn max_route_duration(&self) -> Option<Duration> {
        self.max_route_minutes
            .map(|minutes| Duration::from_secs(u64::from(minutes) * 60))
    }

    /// Locations that must be visited, i.e. every location except the depot.
    pub fn visit_locations(&self) -> impl Iterator<Item = &Location> + '_ {
        self.locations
            .iter()
            .filter(move |location| Some(location.id) != self.depot)
    }

    /// Look up a location by identifier.
    #[must_use]
    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.iter().find(|location| location.id == id)
    }

    /// Validate the request, mapping failures into [`SolveError`].
    ///
    /// # Errors
    /// Returns [`SolveError::InvalidRequest`] wrapping the first rule that
    /// failed.
    pub fn validate(&self) -> Result<(), SolveError> {
        self.validate_detailed().map_err(SolveError::InvalidRequest)
    }

    /// Validate the request and report the first failing rule.
    ///
    /// # Errors
    /// Returns the [`RouteRequestValidationError`] describing the failure.
    pub fn validate_detailed(&self) -> Result<(), RouteRequestValidationError> {
        if self.locations.len() < 2 {
            return Err(RouteRequestValidationError::TooFewLocations {
                found: self.locations.len(),
            });
        }
        if self.vehicles.is_empty() {
            return Err(RouteRequestValidationError::NoVehicles);
        }
        self.validate_locations()?;
        self.validate_vehicles()?;
        if let Some(depot) = self.depot
            && self.location(depot).is_none()
        {
            return Err(RouteRequestValidationError::UnknownDepot { id: depot });
        }
        if self.max_route_minutes == Some(0) {
            return Err(RouteRequestValidationError::ZeroRouteDuration);
        }
        if !(self.average_speed_kmh.is_finite() && self.average_speed_kmh > 0.0) {
            return Err(RouteRequestValidationError::InvalidSpeed);
        }
        Ok(())
    }

    fn validate_locations(&self) -> Result<(), RouteRequestValidationError> {
        let mut seen = HashSet::with_capacity(self.locations.len());
        for location in &self.locations {
            if !seen.insert(location.id) {
                return Err(RouteRequestValidationError::DuplicateLocation { id: location.id });
            }
            location.validate_coordinate()?;
            if !(0.0..=MAX_LITRES).contains(&location.demand_litres) {
                return Err(RouteRequestValidationError::InvalidDemand { id: location.id });
            }
        }
        Ok(())
    }

    fn validate_vehicles(&self) -> Result<(), RouteRequestValidationError> {
        let mut seen = HashSet::with_capacity(self.vehicles.len());
        for vehicle in &self.vehicles {
            if !seen.insert(vehicle.id) {
                return Err(RouteRequestValidationError::DuplicateVehicle { id: vehicle.id });
            }
            if !(vehicle.capacity_litres > 0.0 && vehicle.capacity_litres <= MAX_LITRES) {
                return Err(RouteRequestValidationError::InvalidCapacity { id: vehicle.id });
            }
            let fuel_ok = [vehicle.fuel_efficiency_km_per_litre, vehicle.fuel_tank_litres]
                .into_iter()
                .flatten()
                .all(|value| value.is_finite() && value >= 0.0);
            if !fuel_ok {
                return Err(RouteRequestValidationError::InvalidFuelData { id: vehicle.id });
            }
            if let Some(start) = vehicle.start
                && !is_valid_coordinate(start)
            {
                return Err(RouteRequestValidationError::InvalidVehicleStart { id: vehicle.id });
            }
        }
        Ok(())
    }
}
