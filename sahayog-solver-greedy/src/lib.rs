//! Deterministic nearest-neighbour solver.
//!
//! [`GreedySolver`] fills vehicles one at a time: from each vehicle's start it
//! keeps driving to the nearest unvisited location that still fits the
//! vehicle's remaining capacity and shift. It needs no search budget, always
//! returns the same plan for the same input, and serves as a fast baseline
//! next to the `vrp-core` backed solver.

#![forbid(unsafe_code)]

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use sahayog_core::{
    FleetVehicle, LocationId, MatrixProvider, PreparedRequest, Priority, RoutePlan, RouteRequest,
    SolveError, Solver,
};

/// Name recorded in plan diagnostics.
const SOLVER_NAME: &str = "greedy";

/// Nearest-neighbour solver over a [`MatrixProvider`].
///
/// Ties on distance go to the more urgent location, then to the lower id.
///
/// # Examples
/// ```
/// use sahayog_core::test_support::{UnitMatrixProvider, sample_request};
/// use sahayog_core::{PlanStatus, Solver};
/// use sahayog_solver_greedy::GreedySolver;
///
/// let plan = GreedySolver::new(UnitMatrixProvider)
///     .solve(&sample_request(3, 1))
///     .expect("solve");
/// assert_eq!(plan.status, PlanStatus::Complete);
/// ```
#[derive(Debug, Clone)]
pub struct GreedySolver<M>
where
    M: MatrixProvider,
{
    provider: M,
}

impl<M> GreedySolver<M>
where
    M: MatrixProvider,
{
    /// Construct a solver over `provider`.
    pub const fn new(provider: M) -> Self {
        Self { provider }
    }
}

impl<M> Solver for GreedySolver<M>
where
    M: MatrixProvider + Send + Sync,
{
    fn solve(&self, request: &RouteRequest) -> Result<RoutePlan, SolveError> {
        let started_at = Instant::now();
        let prepared = PreparedRequest::new(request, &self.provider)?;
        let mut remaining = prepared.candidates().to_vec();
        let mut assignments = Vec::new();
        for vehicle in prepared.fleet().vehicles() {
            if remaining.is_empty() {
                break;
            }
            let visits = fill_vehicle(&prepared, vehicle, &mut remaining);
            log::debug!("vehicle {} takes {} stops", vehicle.id, visits.len());
            if !visits.is_empty() {
                assignments.push((vehicle.index, visits));
            }
        }
        prepared.finish(SOLVER_NAME, assignments, started_at.elapsed())
    }
}

/// A location that fits the vehicle from its current position.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    distance_m: u64,
    priority: Priority,
    id: LocationId,
    arrival: Duration,
    load: i32,
}

impl Candidate {
    fn cmp_nearest(&self, other: &Self) -> Ordering {
        self.distance_m
            .cmp(&other.distance_m)
            .then_with(|| other.priority.cmp(&self.priority))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Where a vehicle is, how long it has driven and what it carries.
#[derive(Debug, Clone, Copy)]
struct Progress {
    position: usize,
    elapsed: Duration,
    load: i32,
}

fn fill_vehicle(
    prepared: &PreparedRequest<'_>,
    vehicle: &FleetVehicle,
    remaining: &mut Vec<usize>,
) -> Vec<usize> {
    let mut visits = Vec::new();
    let mut progress = Progress {
        position: vehicle.start,
        elapsed: Duration::ZERO,
        load: 0,
    };
    while let Some(next) = remaining
        .iter()
        .filter_map(|&index| evaluate(prepared, vehicle, progress, index))
        .min_by(Candidate::cmp_nearest)
    {
        visits.push(next.index);
        remaining.retain(|&index| index != next.index);
        progress = Progress {
            position: next.index,
            elapsed: next.arrival,
            load: next.load,
        };
    }
    visits
}

fn evaluate(
    prepared: &PreparedRequest<'_>,
    vehicle: &FleetVehicle,
    progress: Progress,
    index: usize,
) -> Option<Candidate> {
    let request = prepared.request();
    let matrix = prepared.matrix();
    let load = progress.load.checked_add(prepared.demand(index))?;
    if load > vehicle.capacity || !matrix.is_reachable(progress.position, index) {
        return None;
    }
    let arrival = progress
        .elapsed
        .checked_add(matrix.duration(progress.position, index)?)?;
    let committed = if request.return_to_start {
        if !matrix.is_reachable(index, vehicle.start) {
            return None;
        }
        arrival.checked_add(matrix.duration(index, vehicle.start)?)?
    } else {
        arrival
    };
    if request
        .max_route_duration()
        .is_some_and(|limit| committed > limit)
    {
        return None;
    }
    let location = request.locations.get(index)?;
    Some(Candidate {
        index,
        distance_m: matrix.distance(progress.position, index)?,
        priority: location.priority,
        id: location.id,
        arrival,
        load,
    })
}
