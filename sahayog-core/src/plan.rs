//! Optimised route plans returned by solvers.

use std::time::Duration;

use geo::Coord;

use crate::{FuelEstimate, LocationId, VehicleId};

/// One visit on a vehicle route with running totals.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stop {
    /// Location visited.
    pub location_id: LocationId,
    /// Location name at planning time.
    pub name: String,
    /// Position in the route, starting at 1.
    pub visit_order: usize,
    /// Litres collected here.
    pub demand_litres: f64,
    /// Metres from the previous point.
    pub distance_from_previous_m: u64,
    /// Travel time from the previous point.
    #[cfg_attr(feature = "serde", serde(with = "duration_secs"))]
    pub travel_time_from_previous: Duration,
    /// Metres driven since the start.
    pub cumulative_distance_m: u64,
    /// Time elapsed since the start.
    #[cfg_attr(feature = "serde", serde(with = "duration_secs"))]
    pub cumulative_time: Duration,
}

/// Endpoint of a [`Segment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RouteNode {
    /// The vehicle's start point.
    Start,
    /// A request location.
    Location(LocationId),
}

/// A single leg between two consecutive route nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    /// Where the leg begins.
    pub from: RouteNode,
    /// Where the leg ends.
    pub to: RouteNode,
    /// Leg length in metres.
    pub distance_m: u64,
    /// Leg travel time.
    #[cfg_attr(feature = "serde", serde(with = "duration_secs"))]
    pub travel_time: Duration,
}

/// The ordered stops assigned to one vehicle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleRoute {
    /// Vehicle driving the route.
    pub vehicle_id: VehicleId,
    /// Visits in driving order.
    pub stops: Vec<Stop>,
    /// Legs in driving order, including the return leg when requested.
    pub segments: Vec<Segment>,
    /// Coordinates from the start through every stop.
    pub path: Vec<Coord<f64>>,
    /// Total metres driven.
    pub distance_m: u64,
    /// Total travel time.
    #[cfg_attr(feature = "serde", serde(with = "duration_secs"))]
    pub duration: Duration,
    /// Litres collected.
    pub load_litres: f64,
    /// Fuel estimate for the distance driven.
    pub fuel: FuelEstimate,
}

impl VehicleRoute {
    /// Identifiers of the visited locations in order.
    pub fn location_ids(&self) -> impl Iterator<Item = LocationId> + '_ {
        self.stops.iter().map(|stop| stop.location_id)
    }
}

/// Overall outcome of an optimisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PlanStatus {
    /// Every location is on a route.
    Complete,
    /// Some locations could not be served.
    Partial,
    /// No acceptable assignment exists.
    Infeasible,
}

impl PlanStatus {
    /// Return the status as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Partial => "partial",
            Self::Infeasible => "infeasible",
        }
    }
}

/// Why a location was left off every route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UnassignedReason {
    /// Its demand exceeds every vehicle's capacity.
    ExceedsCapacity,
    /// No vehicle can reach it within the duration limit.
    ExceedsDuration,
    /// No road connects it to any vehicle start.
    Unreachable,
    /// The solver did not fit it onto any route.
    NotRouted,
}

/// A location missing from the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnassignedLocation {
    /// The location left out.
    pub location_id: LocationId,
    /// Why it was left out.
    pub reason: UnassignedReason,
}

/// Solver bookkeeping attached to every plan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostics {
    /// Name of the solver that produced the plan.
    pub solver: String,
    /// Wall-clock time spent solving.
    #[cfg_attr(feature = "serde", serde(with = "duration_secs"))]
    pub solve_time: Duration,
    /// Number of locations handed to the solver.
    pub locations_considered: usize,
}

/// Result of a route optimisation.
///
/// Infeasibility is reported here rather than as an error: an
/// [`PlanStatus::Infeasible`] plan carries no routes and lists every location
/// as unassigned.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutePlan {
    /// Overall outcome.
    pub status: PlanStatus,
    /// Routes of vehicles with at least one stop.
    pub routes: Vec<VehicleRoute>,
    /// Locations not on any route.
    pub unassigned: Vec<UnassignedLocation>,
    /// Sum of route distances in metres.
    pub total_distance_m: u64,
    /// Sum of route durations.
    #[cfg_attr(feature = "serde", serde(with = "duration_secs"))]
    pub total_duration: Duration,
    /// Sum of route loads in litres.
    pub total_load_litres: f64,
    /// Heuristic quality in `0..=100`.
    pub quality_score: f64,
    /// Solver bookkeeping.
    pub diagnostics: Diagnostics,
}

impl RoutePlan {
    /// Build an infeasible plan listing `unassigned`.
    #[must_use]
    pub fn infeasible(unassigned: Vec<UnassignedLocation>, diagnostics: Diagnostics) -> Self {
        Self {
            status: PlanStatus::Infeasible,
            routes: Vec::new(),
            unassigned,
            total_distance_m: 0,
            total_duration: Duration::ZERO,
            total_load_litres: 0.0,
            quality_score: 0.0,
            diagnostics,
        }
    }

    /// Whether the plan can be dispatched.
    #[must_use]
    pub fn is_feasible(&self) -> bool {
        self.status != PlanStatus::Infeasible
    }

    /// Every location on a route, in route order.
    pub fn assigned_location_ids(&self) -> impl Iterator<Item = LocationId> + '_ {
        self.routes.iter().flat_map(VehicleRoute::location_ids)
    }

    /// The route driven by `vehicle_id`, if it has stops.
    #[must_use]
    pub fn route_for(&self, vehicle_id: VehicleId) -> Option<&VehicleRoute> {
        self.routes
            .iter()
            .find(|route| route.vehicle_id == vehicle_id)
    }

    /// Number of stops across all routes.
    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.routes.iter().map(|route| route.stops.len()).sum()
    }
}

/// Serialise a [`Duration`] as whole seconds.
#[cfg(feature = "serde")]
pub(crate) mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn infeasible_plan_has_no_routes() {
        let plan = RoutePlan::infeasible(
            vec![UnassignedLocation {
                location_id: LocationId(3),
                reason: UnassignedReason::ExceedsCapacity,
            }],
            Diagnostics::default(),
        );
        assert!(!plan.is_feasible());
        assert_eq!(plan.stop_count(), 0);
        assert_eq!(plan.assigned_location_ids().count(), 0);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn durations_serialise_as_seconds() {
        let segment = Segment {
            from: RouteNode::Start,
            to: RouteNode::Location(LocationId(4)),
            distance_m: 1_200,
            travel_time: Duration::from_secs(144),
        };
        let json = serde_json::to_value(segment).expect("serialise");
        assert_eq!(json["travel_time"], 144);
        assert_eq!(json["to"]["location"], 4);
        assert_eq!(json["from"], "start");
    }
}
