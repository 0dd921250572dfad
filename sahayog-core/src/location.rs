//! Collection locations visited by vehicle routes.

use std::fmt;

use geo::Coord;

use crate::RouteRequestValidationError;

/// Identifier of a stored or requested [`Location`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LocationId(pub u64);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of site a location is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LocationKind {
    /// A kerbside or communal waste bin.
    #[default]
    Bin,
    /// A staffed or shared collection point.
    CollectionPoint,
    /// A vehicle depot.
    Depot,
    /// A landfill or transfer station.
    Landfill,
}

impl LocationKind {
    /// Return the kind as a lowercase `&str`.
    ///
    /// # Examples
    /// ```
    /// use sahayog_core::LocationKind;
    ///
    /// assert_eq!(LocationKind::CollectionPoint.as_str(), "collection_point");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bin => "bin",
            Self::CollectionPoint => "collection_point",
            Self::Depot => "depot",
            Self::Landfill => "landfill",
        }
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LocationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bin" | "waste_bin" => Ok(Self::Bin),
            "collection_point" => Ok(Self::CollectionPoint),
            "depot" => Ok(Self::Depot),
            "landfill" => Ok(Self::Landfill),
            _ => Err(format!("unknown location kind '{s}'")),
        }
    }
}

/// Collection urgency of a location.
///
/// Ordered from least to most urgent so that `Priority::Urgent >
/// Priority::Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Priority {
    /// Can wait for the next scheduled run.
    Low,
    /// Normal collection cadence.
    #[default]
    Medium,
    /// Should be collected on the next route.
    High,
    /// Overflowing or hazardous.
    Urgent,
}

impl Priority {
    /// Return the priority as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(format!("unknown priority '{s}'")),
        }
    }
}

/// A place a vehicle visits to collect waste.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use sahayog_core::{Location, LocationId};
///
/// let location = Location::new(LocationId(7), "Market bin", Coord { x: 73.85, y: 18.52 })
///     .with_demand(120.0);
///
/// assert_eq!(location.id, LocationId(7));
/// assert!(location.validate_coordinate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    /// Unique identifier.
    pub id: LocationId,
    /// Human-readable name.
    pub name: String,
    /// Street address, possibly empty.
    #[cfg_attr(feature = "serde", serde(default))]
    pub address: String,
    /// Geospatial position.
    pub coordinate: Coord<f64>,
    /// Site category.
    #[cfg_attr(feature = "serde", serde(default))]
    pub kind: LocationKind,
    /// Collection urgency.
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: Priority,
    /// Estimated waste volume to collect, in litres.
    #[cfg_attr(feature = "serde", serde(default))]
    pub demand_litres: f64,
}

impl Location {
    /// Construct a medium-priority bin with zero demand.
    #[must_use]
    pub fn new(id: LocationId, name: impl Into<String>, coordinate: Coord<f64>) -> Self {
        Self {
            id,
            name: name.into(),
            address: String::new(),
            coordinate,
            kind: LocationKind::default(),
            priority: Priority::default(),
            demand_litres: 0.0,
        }
    }

    /// Set the estimated demand in litres.
    #[must_use]
    pub const fn with_demand(mut self, demand_litres: f64) -> Self {
        self.demand_litres = demand_litres;
        self
    }

    /// Set the collection priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the site kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: LocationKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the street address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Check that the coordinate is a finite WGS84 position.
    ///
    /// # Errors
    /// Returns [`RouteRequestValidationError::InvalidCoordinate`] naming this
    /// location otherwise.
    pub fn validate_coordinate(&self) -> Result<(), RouteRequestValidationError> {
        if is_valid_coordinate(self.coordinate) {
            Ok(())
        } else {
            Err(RouteRequestValidationError::InvalidCoordinate { id: self.id })
        }
    }
}

/// Check that `coordinate` holds a finite longitude in `[-180, 180]` and a
/// finite latitude in `[-90, 90]`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use sahayog_core::is_valid_coordinate;
///
/// assert!(is_valid_coordinate(Coord { x: 73.85, y: 18.52 }));
/// assert!(!is_valid_coordinate(Coord { x: 0.0, y: 91.0 }));
/// assert!(!is_valid_coordinate(Coord { x: f64::NAN, y: 0.0 }));
/// ```
#[must_use]
pub fn is_valid_coordinate(coordinate: Coord<f64>) -> bool {
    coordinate.x.is_finite()
        && coordinate.y.is_finite()
        && (-180.0..=180.0).contains(&coordinate.x)
        && (-90.0..=90.0).contains(&coordinate.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case(Coord { x: 180.0, y: 90.0 }, true)]
    #[case(Coord { x: -180.0, y: -90.0 }, true)]
    #[case(Coord { x: 180.1, y: 0.0 }, false)]
    #[case(Coord { x: 0.0, y: -90.5 }, false)]
    #[case(Coord { x: f64::INFINITY, y: 0.0 }, false)]
    fn coordinate_bounds(#[case] coordinate: Coord<f64>, #[case] expected: bool) {
        assert_eq!(is_valid_coordinate(coordinate), expected);
    }

    #[rstest]
    #[case::latitude(Coord { x: 73.85, y: 91.0 })]
    #[case::longitude(Coord { x: -181.0, y: 18.52 })]
    #[case::not_finite(Coord { x: f64::NAN, y: 18.52 })]
    fn validate_coordinate_names_the_location(#[case] coordinate: Coord<f64>) {
        let location = Location::new(LocationId(4), "Ghat bin", coordinate);
        assert_eq!(
            location.validate_coordinate(),
            Err(RouteRequestValidationError::InvalidCoordinate { id: LocationId(4) })
        );
    }

    #[rstest]
    fn priority_orders_by_urgency() {
        assert!(Priority::Urgent > Priority::High);
        assert!(Priority::Medium > Priority::Low);
    }

    #[rstest]
    fn kind_accepts_legacy_waste_bin_label() {
        assert_eq!(LocationKind::from_str("waste_bin"), Ok(LocationKind::Bin));
    }

    #[rstest]
    fn parsing_rejects_unknown_priority() {
        let err = Priority::from_str("whenever").expect_err("unknown priority");
        assert!(err.contains("unknown priority"));
    }
}
