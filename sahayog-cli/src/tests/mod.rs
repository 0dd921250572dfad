//! Shared test harness modules for the Sahayog CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod helpers;
mod records_steps;
mod solve_steps;
