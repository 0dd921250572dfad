//! The planning steps every solver runs before and after its search.

use std::collections::HashSet;
use std::time::Duration;

use crate::{
    Diagnostics, Fleet, LocationId, MatrixProvider, PlanAssembler, RouteLayout, RouteMatrix,
    RoutePlan, RouteRequest, SolveError, UnassignedLocation, feasibility::demand_units,
    verify_plan,
};

/// A validated request with its matrix, fleet and servable locations.
///
/// Solvers search over [`PreparedRequest::candidates`] and hand their
/// per-vehicle visit orders back to [`PreparedRequest::finish`], which
/// assembles and verifies the plan.
#[derive(Debug)]
pub struct PreparedRequest<'a> {
    request: &'a RouteRequest,
    layout: RouteLayout,
    matrix: RouteMatrix,
    fleet: Fleet,
    unservable: Vec<UnassignedLocation>,
    candidates: Vec<usize>,
}

impl<'a> PreparedRequest<'a> {
    /// Validate `request`, fetch its matrix from `provider` and pre-check
    /// every location.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::InvalidRequest`] for malformed requests and
    /// [`SolveError::Matrix`] when the provider fails or returns a matrix
    /// of the wrong size.
    pub fn new<M>(request: &'a RouteRequest, provider: &M) -> Result<Self, SolveError>
    where
        M: MatrixProvider + ?Sized,
    {
        request.validate()?;
        let layout = RouteLayout::new(request);
        let matrix = provider.route_matrix(layout.points())?;
        matrix.ensure_size(layout.points().len())?;
        let fleet = Fleet::new(request, &layout);
        let unservable = crate::precheck(request, &layout, &matrix);
        let blocked: HashSet<LocationId> =
            unservable.iter().map(|entry| entry.location_id).collect();
        let candidates = layout
            .visit_indices()
            .iter()
            .copied()
            .filter(|index| {
                layout
                    .location_id(*index)
                    .is_some_and(|id| !blocked.contains(&id))
            })
            .collect();
        Ok(Self {
            request,
            layout,
            matrix,
            fleet,
            unservable,
            candidates,
        })
    }

    /// The request being planned.
    #[must_use]
    pub const fn request(&self) -> &RouteRequest {
        self.request
    }

    /// Point layout of the request.
    #[must_use]
    pub const fn layout(&self) -> &RouteLayout {
        &self.layout
    }

    /// Matrix over [`RouteLayout::points`].
    #[must_use]
    pub const fn matrix(&self) -> &RouteMatrix {
        &self.matrix
    }

    /// Vehicles with their start points and whole-litre capacities.
    #[must_use]
    pub const fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    /// Locations the pre-check ruled out.
    #[must_use]
    pub fn unservable(&self) -> &[UnassignedLocation] {
        &self.unservable
    }

    /// Point indices of the locations a solver should try to route.
    #[must_use]
    pub fn candidates(&self) -> &[usize] {
        &self.candidates
    }

    /// Whole-litre demand of the location at point `index`.
    #[must_use]
    pub fn demand(&self, index: usize) -> i32 {
        self.request
            .locations
            .get(index)
            .map_or(0, |location| demand_units(location.demand_litres))
    }

    /// Assemble `assignments` into a plan and check it.
    ///
    /// Visits reached over an unreachable leg, and trailing visits that
    /// push a route past the shift limit, are dropped first and end up
    /// reported as not routed.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::PlanViolation`] when the assembled plan breaks
    /// a feasibility rule.
    pub fn finish(
        self,
        solver: &str,
        assignments: Vec<(usize, Vec<usize>)>,
        solve_time: Duration,
    ) -> Result<RoutePlan, SolveError> {
        let repaired: Vec<(usize, Vec<usize>)> = assignments
            .into_iter()
            .map(|(vehicle, visits)| {
                let kept = self.repair_route(vehicle, visits);
                (vehicle, kept)
            })
            .collect();
        let diagnostics = Diagnostics {
            solver: solver.to_owned(),
            solve_time,
            locations_considered: self.candidates.len(),
        };
        let plan = PlanAssembler::new(self.request, &self.layout, &self.matrix).plan(
            &repaired,
            self.unservable,
            diagnostics,
        );
        verify_plan(self.request, &plan)?;
        log::debug!(
            "{solver} plan {}: {} routes, {} unassigned",
            plan.status.as_str(),
            plan.routes.len(),
            plan.unassigned.len()
        );
        Ok(plan)
    }

    fn repair_route(&self, vehicle: usize, visits: Vec<usize>) -> Vec<usize> {
        let Some(start) = self.layout.start_index(vehicle) else {
            return Vec::new();
        };
        let mut kept = Vec::with_capacity(visits.len());
        let mut previous = start;
        for visit in visits {
            if !self.matrix.is_reachable(previous, visit) {
                log::warn!("dropping visit {visit}: unreachable from point {previous}");
                continue;
            }
            kept.push(visit);
            previous = visit;
        }
        if self.request.return_to_start {
            while let Some(&last) = kept.last()
                && !self.matrix.is_reachable(last, start)
            {
                log::warn!("dropping visit {last}: no way back to the start");
                kept.pop();
            }
        }
        if let Some(limit) = self.request.max_route_duration() {
            while !kept.is_empty() && self.route_duration(start, &kept) > limit {
                if let Some(last) = kept.pop() {
                    log::warn!("dropping visit {last}: route exceeds the shift limit");
                }
            }
        }
        kept
    }

    fn route_duration(&self, start: usize, visits: &[usize]) -> Duration {
        let mut previous = start;
        let mut total = Duration::ZERO;
        for &visit in visits {
            let leg = self.matrix.duration(previous, visit).unwrap_or(Duration::MAX);
            total = total.saturating_add(leg);
            previous = visit;
        }
        if self.request.return_to_start {
            let leg = self.matrix.duration(previous, start).unwrap_or(Duration::MAX);
            total = total.saturating_add(leg);
        }
        total
    }
}
