//! Fuel consumption estimates for planned routes.

use crate::Vehicle;

/// Litres per kilometre assumed when a vehicle has no efficiency figure.
pub const FALLBACK_LITRES_PER_KM: f64 = 0.1;

/// Share of the tank above which a route is flagged as heavy usage.
pub const HIGH_USAGE_RATIO: f64 = 0.8;

/// A notable fuel condition for a route.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum FuelWarning {
    /// The route needs more fuel than the tank holds.
    Shortage {
        /// Litres missing, rounded to two decimals.
        shortage_litres: f64,
    },
    /// The route uses most of the tank.
    HighUsage {
        /// Share of the tank used, in percent, rounded to one decimal.
        percent_of_tank: f64,
    },
}

/// Estimated fuel for one vehicle route.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FuelEstimate {
    /// Litres needed, rounded to two decimals.
    pub litres: f64,
    /// Tank size, when known.
    pub tank_litres: Option<f64>,
    /// Whether a full tank covers the route.
    pub sufficient: bool,
    /// Shortage or heavy usage notice.
    pub warning: Option<FuelWarning>,
}

impl FuelEstimate {
    /// Estimate the fuel `vehicle` burns over `distance_m` metres.
    ///
    /// # Examples
    /// ```
    /// use sahayog_core::{FuelEstimate, FuelWarning, Vehicle, VehicleId};
    ///
    /// let vehicle = Vehicle::new(VehicleId(1), "van", 800.0)
    ///     .with_fuel_efficiency(5.0)
    ///     .with_fuel_tank(4.0);
    /// let estimate = FuelEstimate::for_distance(25_000, &vehicle);
    /// assert_eq!(estimate.litres, 5.0);
    /// assert!(!estimate.sufficient);
    /// assert_eq!(
    ///     estimate.warning,
    ///     Some(FuelWarning::Shortage { shortage_litres: 1.0 })
    /// );
    /// ```
    #[must_use]
    pub fn for_distance(distance_m: u64, vehicle: &Vehicle) -> Self {
        let km = distance_m as f64 / 1_000.0;
        let litres = match vehicle.fuel_efficiency_km_per_litre {
            Some(efficiency) if efficiency > 0.0 => round_to(km / efficiency, 2),
            _ => round_to(km * FALLBACK_LITRES_PER_KM, 2),
        };
        let tank_litres = vehicle.fuel_tank_litres.filter(|tank| *tank > 0.0);

        let Some(tank) = tank_litres else {
            return Self {
                litres,
                tank_litres: None,
                sufficient: true,
                warning: None,
            };
        };

        let (sufficient, warning) = if litres > tank {
            (
                false,
                Some(FuelWarning::Shortage {
                    shortage_litres: round_to(litres - tank, 2),
                }),
            )
        } else if litres > tank * HIGH_USAGE_RATIO {
            (
                true,
                Some(FuelWarning::HighUsage {
                    percent_of_tank: round_to(litres / tank * 100.0, 1),
                }),
            )
        } else {
            (true, None)
        };

        Self {
            litres,
            tank_litres,
            sufficient,
            warning,
        }
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}
