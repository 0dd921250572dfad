//! Collection vehicles and their physical limits.

use std::fmt;

use geo::Coord;

/// Identifier of a stored or requested [`Vehicle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct VehicleId(pub u64);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Body type of a collection vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VehicleKind {
    /// General purpose truck.
    #[default]
    Truck,
    /// Light van.
    Van,
    /// Tractor with trailer.
    Tractor,
    /// Compactor truck.
    Compactor,
}

impl VehicleKind {
    /// Return the kind as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Truck => "truck",
            Self::Van => "van",
            Self::Tractor => "tractor",
            Self::Compactor => "compactor",
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VehicleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "truck" => Ok(Self::Truck),
            "van" => Ok(Self::Van),
            "tractor" => Ok(Self::Tractor),
            "compactor" => Ok(Self::Compactor),
            _ => Err(format!("unknown vehicle kind '{s}'")),
        }
    }
}

/// A vehicle available for collection routes.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use sahayog_core::{Vehicle, VehicleId};
///
/// let vehicle = Vehicle::new(VehicleId(1), "Compactor 1", 5_000.0)
///     .with_fuel_efficiency(4.5)
///     .with_start(Coord { x: 73.85, y: 18.52 });
///
/// assert_eq!(vehicle.capacity_litres, 5_000.0);
/// assert!(vehicle.start.is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vehicle {
    /// Unique identifier.
    pub id: VehicleId,
    /// Human-readable name.
    pub name: String,
    /// Body type.
    #[cfg_attr(feature = "serde", serde(default))]
    pub kind: VehicleKind,
    /// Maximum load in litres.
    pub capacity_litres: f64,
    /// Kilometres travelled per litre of fuel.
    #[cfg_attr(feature = "serde", serde(default))]
    pub fuel_efficiency_km_per_litre: Option<f64>,
    /// Fuel tank size in litres.
    #[cfg_attr(feature = "serde", serde(default))]
    pub fuel_tank_litres: Option<f64>,
    /// Where the vehicle begins its route, if not at the depot.
    #[cfg_attr(feature = "serde", serde(default))]
    pub start: Option<Coord<f64>>,
}

impl Vehicle {
    /// Construct a truck with the given capacity and no fuel data.
    #[must_use]
    pub fn new(id: VehicleId, name: impl Into<String>, capacity_litres: f64) -> Self {
        Self {
            id,
            name: name.into(),
            kind: VehicleKind::default(),
            capacity_litres,
            fuel_efficiency_km_per_litre: None,
            fuel_tank_litres: None,
            start: None,
        }
    }

    /// Set the fuel efficiency in km per litre.
    #[must_use]
    pub const fn with_fuel_efficiency(mut self, km_per_litre: f64) -> Self {
        self.fuel_efficiency_km_per_litre = Some(km_per_litre);
        self
    }

    /// Set the fuel tank size in litres.
    #[must_use]
    pub const fn with_fuel_tank(mut self, litres: f64) -> Self {
        self.fuel_tank_litres = Some(litres);
        self
    }

    /// Set an explicit start position.
    #[must_use]
    pub const fn with_start(mut self, start: Coord<f64>) -> Self {
        self.start = Some(start);
        self
    }

    /// Set the body type.
    #[must_use]
    pub const fn with_kind(mut self, kind: VehicleKind) -> Self {
        self.kind = kind;
        self
    }
}
