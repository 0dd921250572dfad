//! `vrp-core` modelling helpers for `VrpSolver`.
//!
//! This module converts the servable locations, the fleet and the route
//! matrix into a capacitated `vrp-core` problem, runs the solver, and
//! translates the resulting tours back into per-vehicle visit lists.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use sahayog_core::{Fleet, RouteMatrix, SolveError};
use vrp_core::models::common::{Location, Profile};
use vrp_core::models::problem::TravelTime;
use vrp_core::models::solution::Route as VrpRoute;
use vrp_core::prelude::*;

use crate::solver::VrpSolverConfig;

/// Cost charged for a leg the matrix marks unreachable. Large enough to
/// exceed any shift limit so time-constrained vehicles never take it.
const UNREACHABLE_COST: f64 = 1.0e12;

fn backend_error<E: Display>(err: E) -> SolveError {
    SolveError::Backend {
        message: err.to_string(),
    }
}

fn define_goal(
    transport: Arc<dyn TransportCost>,
    time_constrained: bool,
) -> GenericResult<GoalContext> {
    let minimize_unassigned = MinimizeUnassignedBuilder::new("min-unassigned").build()?;
    let capacity_feature = CapacityFeatureBuilder::<SingleDimLoad>::new("capacity").build()?;
    let transport_feature = TransportFeatureBuilder::new("min-distance")
        .set_transport_cost(transport)
        .set_time_constrained(time_constrained)
        .build_minimize_distance()?;

    GoalContextBuilder::with_features(&[minimize_unassigned, transport_feature, capacity_feature])?
        .build()
}

struct ProblemSpec<'a> {
    instance: &'a VrpInstance<'a>,
    transport: Arc<dyn TransportCost>,
    goal: GoalContext,
}

fn define_problem(spec: ProblemSpec<'_>) -> GenericResult<Problem> {
    let ProblemSpec {
        instance,
        transport,
        goal,
    } = spec;

    let jobs = instance
        .jobs
        .iter()
        .map(|&(location, demand)| {
            SingleBuilder::default()
                .id(format!("loc{location}").as_str())
                .demand(Demand::delivery(demand))
                .location(location)?
                .build_as_job()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let shift_end = instance.shift_limit.map(|limit| limit.as_secs_f64());
    let open_end = instance.matrix.size();
    let vehicles = instance
        .fleet
        .vehicles()
        .iter()
        .map(|vehicle| {
            let mut detail = VehicleDetailBuilder::default();
            detail = detail.set_start_location(vehicle.start).set_start_time(0.0);
            let end = if instance.return_to_start {
                vehicle.start
            } else {
                open_end
            };
            detail = detail.set_end_location(end);
            if let Some(end_time) = shift_end {
                detail = detail.set_end_time(end_time);
            }
            VehicleBuilder::default()
                .id(format!("vehicle{}", vehicle.index).as_str())
                .add_detail(detail.build()?)
                .capacity(SingleDimLoad::new(vehicle.capacity))
                .build()
        })
        .collect::<Result<Vec<_>, _>>()?;

    ProblemBuilder::default()
        .add_jobs(jobs.into_iter())
        .add_vehicles(vehicles.into_iter())
        .with_goal(goal)
        .with_transport_cost(transport)
        .build()
}

/// Matrix costs extended with one extra point, the open end.
///
/// Open routes finish at index `matrix.size()`. Every point reaches it for
/// free and it leads nowhere, so a tour's last leg costs nothing.
struct MatrixTransportCost {
    distances: Vec<Vec<f64>>,
    durations: Vec<Vec<f64>>,
}

impl MatrixTransportCost {
    fn new(matrix: &RouteMatrix) -> Self {
        let size = matrix.size();
        let open_end = size;
        let mut distances = Vec::with_capacity(size + 1);
        let mut durations = Vec::with_capacity(size + 1);
        for from in 0..=size {
            let (distance_row, duration_row) = (0..=size)
                .map(|to| match (from == open_end, to == open_end) {
                    (_, true) => (0.0, 0.0),
                    (true, false) => (UNREACHABLE_COST, UNREACHABLE_COST),
                    (false, false) => leg_cost(matrix, from, to),
                })
                .unzip();
            distances.push(distance_row);
            durations.push(duration_row);
        }
        Self {
            distances,
            durations,
        }
    }

    fn lookup(table: &[Vec<f64>], from: Location, to: Location) -> f64 {
        let result = table.get(from).and_then(|row| row.get(to)).copied();
        debug_assert!(result.is_some(), "Matrix lookup failed: from={from}, to={to}");
        result.unwrap_or(UNREACHABLE_COST)
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "route distances in metres stay far below 2^52"
)]
fn leg_cost(matrix: &RouteMatrix, from: usize, to: usize) -> (f64, f64) {
    if !matrix.is_reachable(from, to) {
        return (UNREACHABLE_COST, UNREACHABLE_COST);
    }
    (
        matrix.distance(from, to).map_or(UNREACHABLE_COST, |metres| metres as f64),
        matrix
            .duration(from, to)
            .map_or(UNREACHABLE_COST, |duration| duration.as_secs_f64()),
    )
}

impl TransportCost for MatrixTransportCost {
    // The trait signature includes `route` and `departure` parameters even
    // though this matrix-backed implementation does not use them.
    fn distance(
        &self,
        _route: &VrpRoute,
        from: Location,
        to: Location,
        _departure: TravelTime,
    ) -> Cost {
        Self::lookup(&self.distances, from, to)
    }

    fn duration(
        &self,
        _route: &VrpRoute,
        from: Location,
        to: Location,
        _departure: TravelTime,
    ) -> f64 {
        Self::lookup(&self.durations, from, to)
    }

    fn distance_approx(&self, _profile: &Profile, from: usize, to: usize) -> f64 {
        Self::lookup(&self.distances, from, to)
    }

    fn duration_approx(&self, _profile: &Profile, from: usize, to: usize) -> f64 {
        Self::lookup(&self.durations, from, to)
    }
}

/// Context for running a `vrp-core` solve with shared inputs.
pub(super) struct VrpSolveContext<'a> {
    config: &'a VrpSolverConfig,
}

/// The servable part of a request, in matrix indices.
pub(super) struct VrpInstance<'a> {
    matrix: &'a RouteMatrix,
    fleet: &'a Fleet,
    jobs: &'a [(usize, i32)],
    location_count: usize,
    return_to_start: bool,
    shift_limit: Option<Duration>,
}

impl<'a> VrpInstance<'a> {
    /// `jobs` pairs each location's point index with its demand in litres.
    /// Point indices below `location_count` are locations; the rest are
    /// vehicle starts.
    pub(super) const fn new(
        matrix: &'a RouteMatrix,
        fleet: &'a Fleet,
        jobs: &'a [(usize, i32)],
        location_count: usize,
    ) -> Self {
        Self {
            matrix,
            fleet,
            jobs,
            location_count,
            return_to_start: false,
            shift_limit: None,
        }
    }

    pub(super) const fn with_route_rules(
        mut self,
        return_to_start: bool,
        shift_limit: Option<Duration>,
    ) -> Self {
        self.return_to_start = return_to_start;
        self.shift_limit = shift_limit;
        self
    }
}

impl<'a> VrpSolveContext<'a> {
    /// Create a new solve context.
    pub(super) const fn new(config: &'a VrpSolverConfig) -> Self {
        Self { config }
    }

    /// Solve the instance and return each used vehicle's ordered visits.
    pub(super) fn solve(
        &self,
        instance: &VrpInstance<'_>,
    ) -> Result<Vec<(usize, Vec<usize>)>, SolveError> {
        let transport = Arc::new(MatrixTransportCost::new(instance.matrix));
        let goal = define_goal(transport.clone(), instance.shift_limit.is_some())
            .map_err(backend_error)?;
        let problem = Arc::new(
            define_problem(ProblemSpec {
                instance,
                transport,
                goal,
            })
            .map_err(backend_error)?,
        );

        let max_seconds = usize::try_from(self.config.solve_time_limit.as_secs())
            .unwrap_or(usize::MAX)
            .max(1);
        let environment = Environment {
            random: Arc::new(DefaultRandom::new_repeatable()),
            ..Environment::new_with_time_quota(Some(max_seconds))
        };
        let vrp_config = VrpConfigBuilder::new(problem.clone())
            .set_environment(Arc::new(environment))
            .prebuild()
            .map_err(backend_error)?
            .with_max_generations(Some(self.config.max_generations))
            .with_max_time(Some(max_seconds))
            .build()
            .map_err(backend_error)?;

        let solution = vrp_core::solver::Solver::new(problem, vrp_config)
            .solve()
            .map_err(backend_error)?;
        log::debug!(
            "vrp-core finished with {} routes and {} unassigned jobs",
            solution.routes.len(),
            solution.unassigned.len()
        );

        let mut assignments = Vec::new();
        for mut tour in solution.get_locations() {
            let Some(vehicle) = tour
                .next()
                .and_then(|start| instance.fleet.by_start(start))
            else {
                log::warn!("ignoring a vrp-core tour that does not begin at a vehicle start");
                continue;
            };
            // Drops the route's end: the vehicle start or the open end.
            let visits: Vec<usize> = tour
                .filter(|location| *location < instance.location_count)
                .collect();
            assignments.push((vehicle.index, visits));
        }
        Ok(assignments)
    }
}
