//! The solver seam shared by every routing backend.
//!
//! Backends implement [`Solver`] and report failures through [`SolveError`].

use thiserror::Error;

use crate::{MatrixError, PlanViolation, RoutePlan, RouteRequest, RouteRequestValidationError};

/// Errors returned by [`Solver::solve`].
///
/// An infeasible assignment is not an error; it is reported as a
/// [`RoutePlan`] with [`PlanStatus::Infeasible`](crate::PlanStatus::Infeasible).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// Request parameters were invalid, e.g. fewer than two locations.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RouteRequestValidationError),
    /// The distance matrix could not be built.
    #[error("matrix lookup failed: {0}")]
    Matrix(#[from] MatrixError),
    /// The optimisation backend failed.
    #[error("solver backend failed: {message}")]
    Backend {
        /// Backend error text.
        message: String,
    },
    /// The solver produced a plan that breaks an invariant.
    #[error("solver produced an invalid plan: {0}")]
    PlanViolation(#[from] PlanViolation),
    /// The solver is not available in this build.
    #[error("solver not implemented")]
    NotImplemented,
}

/// Alias for the solver error type.
pub type Error = SolveError;

/// Assign locations to vehicles and order each vehicle's visits.
///
/// Implementations should return [`Error::InvalidRequest`] for invalid
/// parameters rather than panicking.
/// Solvers must be `Send + Sync` to operate safely across threads.
pub trait Solver: Send + Sync {
    /// Solve a request, producing a plan or an error.
    fn solve(&self, request: &RouteRequest) -> Result<RoutePlan, Error>;
}
