//! Turn solver assignments into [`RoutePlan`]s.

use std::collections::HashSet;
use std::time::Duration;

use crate::{
    Diagnostics, FuelEstimate, LocationId, PlanStatus, RouteLayout, RouteMatrix, RouteNode,
    RoutePlan, RouteRequest, Segment, Stop, UnassignedLocation, UnassignedReason, VehicleRoute,
    quality_score,
};

/// Builds routes and plans from ordered point indices.
///
/// Solvers hand over, per vehicle, the point indices of the locations it
/// visits in order. The assembler looks up legs in the matrix and fills in
/// running totals, fuel, plan totals and the quality score.
#[derive(Debug, Clone, Copy)]
pub struct PlanAssembler<'a> {
    request: &'a RouteRequest,
    layout: &'a RouteLayout,
    matrix: &'a RouteMatrix,
}

impl<'a> PlanAssembler<'a> {
    /// Create an assembler over a laid-out request and its matrix.
    #[must_use]
    pub const fn new(
        request: &'a RouteRequest,
        layout: &'a RouteLayout,
        matrix: &'a RouteMatrix,
    ) -> Self {
        Self {
            request,
            layout,
            matrix,
        }
    }

    /// Build the route of vehicle number `vehicle` visiting `visits` in order.
    ///
    /// Returns `None` when `visits` is empty or the vehicle is unknown.
    /// Indices that do not name a request location are skipped.
    #[must_use]
    pub fn route(&self, vehicle: usize, visits: &[usize]) -> Option<VehicleRoute> {
        let spec = self.request.vehicles.get(vehicle)?;
        let start = self.layout.start_index(vehicle)?;
        let start_coord = self.layout.point(start)?;

        let mut stops = Vec::with_capacity(visits.len());
        let mut segments = Vec::with_capacity(visits.len() + 1);
        let mut path = vec![start_coord];
        let mut previous = (start, RouteNode::Start);
        let mut distance_m: u64 = 0;
        let mut duration = Duration::ZERO;
        let mut load_litres = 0.0;

        for &index in visits {
            let Some(location) = self.request.locations.get(index) else {
                log::warn!("skipping point {index}: not a request location");
                continue;
            };
            let (leg_m, leg_time) = self.leg(previous.0, index);
            distance_m = distance_m.saturating_add(leg_m);
            duration = duration.saturating_add(leg_time);
            load_litres += location.demand_litres;

            let node = RouteNode::Location(location.id);
            segments.push(Segment {
                from: previous.1,
                to: node,
                distance_m: leg_m,
                travel_time: leg_time,
            });
            stops.push(Stop {
                location_id: location.id,
                name: location.name.clone(),
                visit_order: stops.len() + 1,
                demand_litres: location.demand_litres,
                distance_from_previous_m: leg_m,
                travel_time_from_previous: leg_time,
                cumulative_distance_m: distance_m,
                cumulative_time: duration,
            });
            path.push(location.coordinate);
            previous = (index, node);
        }

        if stops.is_empty() {
            return None;
        }

        if self.request.return_to_start {
            let (leg_m, leg_time) = self.leg(previous.0, start);
            distance_m = distance_m.saturating_add(leg_m);
            duration = duration.saturating_add(leg_time);
            segments.push(Segment {
                from: previous.1,
                to: RouteNode::Start,
                distance_m: leg_m,
                travel_time: leg_time,
            });
            path.push(start_coord);
        }

        Some(VehicleRoute {
            vehicle_id: spec.id,
            stops,
            segments,
            path,
            distance_m,
            duration,
            load_litres,
            fuel: FuelEstimate::for_distance(distance_m, spec),
        })
    }

    fn leg(&self, from: usize, to: usize) -> (u64, Duration) {
        (
            self.matrix.distance(from, to).unwrap_or_default(),
            self.matrix.duration(from, to).unwrap_or_default(),
        )
    }

    /// Assemble a plan from per-vehicle `assignments`.
    ///
    /// Each assignment pairs a vehicle's request position with its ordered
    /// visits. Visit locations missing from both the routes and `unassigned`
    /// are reported as [`UnassignedReason::NotRouted`].
    #[must_use]
    pub fn plan(
        &self,
        assignments: &[(usize, Vec<usize>)],
        mut unassigned: Vec<UnassignedLocation>,
        diagnostics: Diagnostics,
    ) -> RoutePlan {
        let routes: Vec<VehicleRoute> = assignments
            .iter()
            .filter_map(|(vehicle, visits)| self.route(*vehicle, visits))
            .collect();

        let mut accounted: HashSet<LocationId> = routes
            .iter()
            .flat_map(VehicleRoute::location_ids)
            .collect();
        accounted.extend(unassigned.iter().map(|entry| entry.location_id));
        for location in self.request.visit_locations() {
            if !accounted.contains(&location.id) {
                unassigned.push(UnassignedLocation {
                    location_id: location.id,
                    reason: UnassignedReason::NotRouted,
                });
            }
        }

        if routes.is_empty() || (self.request.require_all && !unassigned.is_empty()) {
            // An infeasible plan has no routes, so routed locations join the list.
            unassigned.extend(routes.iter().flat_map(VehicleRoute::location_ids).map(
                |location_id| UnassignedLocation {
                    location_id,
                    reason: UnassignedReason::NotRouted,
                },
            ));
            log::debug!(
                "plan infeasible: {} routes, {} unassigned",
                routes.len(),
                unassigned.len()
            );
            return RoutePlan::infeasible(unassigned, diagnostics);
        }

        let status = if unassigned.is_empty() {
            PlanStatus::Complete
        } else {
            PlanStatus::Partial
        };
        RoutePlan {
            status,
            total_distance_m: routes
                .iter()
                .fold(0_u64, |acc, route| acc.saturating_add(route.distance_m)),
            total_duration: routes
                .iter()
                .fold(Duration::ZERO, |acc, route| acc.saturating_add(route.duration)),
            total_load_litres: routes.iter().map(|route| route.load_litres).sum(),
            quality_score: quality_score(&routes),
            routes,
            unassigned,
            diagnostics,
        }
    }
}
