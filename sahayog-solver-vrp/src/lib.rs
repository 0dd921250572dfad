//! Capacitated vehicle routing solver for Sahayog.
//!
//! This crate provides [`VrpSolver`], the default implementation of the
//! [`Solver`](sahayog_core::Solver) trait. Each collection location becomes a
//! delivery job whose demand is its load in whole litres, and each vehicle
//! brings its capacity, start point and optional shift limit. The `vrp-core`
//! metaheuristics then search for routes that leave as few locations
//! unassigned as possible while keeping total distance low.
//!
//! Locations no vehicle could ever serve are removed by the shared
//! pre-check before the problem is modelled, so `vrp-core` only sees jobs
//! that have at least one feasible vehicle.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod solver;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;
mod vrp;

pub use solver::{VrpSolver, VrpSolverConfig};
