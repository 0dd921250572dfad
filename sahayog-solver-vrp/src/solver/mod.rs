//! `VrpSolver` implementation backed by `vrp-core`.

use std::time::{Duration, Instant};

use sahayog_core::{MatrixProvider, PreparedRequest, RoutePlan, SolveError, Solver};

use crate::vrp::{VrpInstance, VrpSolveContext};

/// Name recorded in plan diagnostics.
const SOLVER_NAME: &str = "vrp";

/// Configuration for [`VrpSolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VrpSolverConfig {
    /// Upper bound on `vrp-core` generations.
    pub max_generations: usize,
    /// Wall-clock budget for the search, rounded down to whole seconds with
    /// a floor of one second.
    pub solve_time_limit: Duration,
}

impl Default for VrpSolverConfig {
    fn default() -> Self {
        Self {
            max_generations: 200,
            solve_time_limit: Duration::from_secs(5),
        }
    }
}

/// Native solver using `vrp-core` to search for short, complete routes.
///
/// The solver is generic over its matrix source so callers can plug in
/// straight-line estimates, a road-network service or a fixed test matrix.
pub struct VrpSolver<M>
where
    M: MatrixProvider,
{
    provider: M,
    config: VrpSolverConfig,
}

impl<M> VrpSolver<M>
where
    M: MatrixProvider,
{
    /// Construct a solver using default configuration.
    pub fn new(provider: M) -> Self {
        Self::with_config(provider, VrpSolverConfig::default())
    }

    /// Construct a solver with explicit configuration.
    pub const fn with_config(provider: M, config: VrpSolverConfig) -> Self {
        Self { provider, config }
    }

    /// The configuration in use.
    pub const fn config(&self) -> &VrpSolverConfig {
        &self.config
    }
}

impl<M> Solver for VrpSolver<M>
where
    M: MatrixProvider + Send + Sync,
{
    fn solve(&self, request: &sahayog_core::RouteRequest) -> Result<RoutePlan, SolveError> {
        let started_at = Instant::now();
        let prepared = PreparedRequest::new(request, &self.provider)?;
        if prepared.candidates().is_empty() {
            log::debug!("no servable locations; skipping vrp-core");
            return prepared.finish(SOLVER_NAME, Vec::new(), started_at.elapsed());
        }

        let jobs = job_demands(&prepared);
        let instance = VrpInstance::new(
            prepared.matrix(),
            prepared.fleet(),
            &jobs,
            prepared.layout().location_count(),
        )
        .with_route_rules(request.return_to_start, request.max_route_duration());
        log::debug!(
            "modelling {} jobs for {} vehicles",
            jobs.len(),
            prepared.fleet().vehicles().len()
        );
        let assignments = VrpSolveContext::new(&self.config).solve(&instance)?;
        prepared.finish(SOLVER_NAME, assignments, started_at.elapsed())
    }
}

fn job_demands(prepared: &PreparedRequest<'_>) -> Vec<(usize, i32)> {
    prepared
        .candidates()
        .iter()
        .map(|&index| (index, prepared.demand(index)))
        .collect()
}
