//! Behaviour-driven step definitions driving the solve CLI scenarios.

use super::helpers::{StubSolverBuilder, Workspace, sample_request, write_request, write_utf8};
use super::*;
use crate::solve::{DefaultSolverBuilder, run_solve_with};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use sahayog_core::{PlanStatus, RoutePlan, RouteRequestValidationError};
use camino::Utf8PathBuf;
use std::cell::RefCell;

struct SolveWorld {
    workspace: Workspace,
    include_request: RefCell<bool>,
    cli_args: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl SolveWorld {
    fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            include_request: RefCell::new(true),
            cli_args: RefCell::new(Vec::new()),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn request_path(&self) -> Utf8PathBuf {
        self.workspace.path("request.json")
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["sahayog".to_owned(), "solve".to_owned()];
        if *self.include_request.borrow() {
            argv.push(self.request_path().into_string());
        }
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn run(&self, builder: &dyn SolverBuilder) {
        let parsed = Cli::try_parse_from(self.build_command_line()).map_err(CliError::from);
        let outcome = parsed.and_then(|cli| match cli.command {
            Command::Solve(args) => {
                let mut buffer = self.stdout.borrow_mut();
                run_solve_with(args, builder, &mut *buffer)
            }
            other => panic!("expected solve command, found {other:?}"),
        });
        self.result.replace(Some(outcome));
    }

    fn plan(&self) -> RoutePlan {
        let borrowed = self.result.borrow();
        let result = borrowed.as_ref().expect("result recorded");
        if let Err(err) = result {
            panic!("expected success, found {err}");
        }
        let stdout = String::from_utf8(self.stdout.borrow().clone()).expect("stdout utf-8");
        serde_json::from_str(&stdout).expect("output should be a JSON route plan")
    }

    fn error<T>(&self, inspect: impl FnOnce(&CliError) -> T) -> T {
        let borrowed = self.result.borrow();
        let error = borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect_err("expected error");
        inspect(error)
    }
}

#[fixture]
fn world() -> SolveWorld {
    SolveWorld::new()
}

#[given("a route request with {count} bins exists on disk")]
fn route_request_exists(#[from(world)] world: &SolveWorld, count: u32) {
    write_request(&world.request_path(), &sample_request(count));
}

#[given("the route request contains invalid JSON")]
fn route_request_contains_invalid_json(#[from(world)] world: &SolveWorld) {
    write_utf8(&world.request_path(), b"{ not valid json");
}

#[given("I omit the route request path")]
fn omit_route_request_path(#[from(world)] world: &SolveWorld) {
    *world.include_request.borrow_mut() = false;
}

#[given("I select the {name} solver")]
fn select_solver(#[from(world)] world: &SolveWorld, name: String) {
    let name = name.trim_matches('"').to_owned();
    world
        .cli_args
        .borrow_mut()
        .extend([format!("--{ARG_SOLVER}"), name]);
}

#[when("I run the solve command")]
fn run_solve_command(#[from(world)] world: &SolveWorld) {
    world.run(&StubSolverBuilder);
}

#[when("I run the solve command with the built-in solvers")]
fn run_solve_command_with_builtin_solvers(#[from(world)] world: &SolveWorld) {
    world.run(&DefaultSolverBuilder);
}

#[then("the command succeeds and prints the stub plan")]
fn command_prints_stub_plan(#[from(world)] world: &SolveWorld) {
    let plan = world.plan();
    assert_eq!(plan, super::helpers::stub_plan());
}

#[then("the printed plan is complete with {stops} stops")]
fn printed_plan_is_complete(#[from(world)] world: &SolveWorld, stops: usize) {
    let plan = world.plan();
    assert_eq!(plan.status, PlanStatus::Complete);
    assert_eq!(plan.stop_count(), stops);
    assert!(plan.unassigned.is_empty());
    assert_eq!(plan.diagnostics.solver, "greedy");
    assert!(plan.total_distance_m > 0);
}

#[then("the command fails because the request JSON is invalid")]
fn command_fails_invalid_json(#[from(world)] world: &SolveWorld) {
    world.error(|error| match error {
        CliError::ParseRouteRequest { .. } => {}
        other => panic!("expected ParseRouteRequest, found {other:?}"),
    });
}

#[then("the command fails because the request has too few locations")]
fn command_fails_too_few_locations(#[from(world)] world: &SolveWorld) {
    world.error(|error| match error {
        CliError::InvalidRouteRequest(source) => {
            assert_eq!(
                *source,
                RouteRequestValidationError::TooFewLocations { found: 1 }
            );
        }
        other => panic!("expected InvalidRouteRequest, found {other:?}"),
    });
}

#[then("the command fails because the request path is missing")]
fn command_fails_missing_request_path(#[from(world)] world: &SolveWorld) {
    world.error(|error| match error {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_REQUEST),
        other => panic!("expected MissingArgument, found {other:?}"),
    });
}

#[then("the command fails naming the unknown solver {name}")]
fn command_fails_unknown_solver(#[from(world)] world: &SolveWorld, name: String) {
    let expected = name.trim_matches('"').to_owned();
    world.error(|error| match error {
        CliError::UnknownSolver { name } => assert_eq!(*name, expected),
        other => panic!("expected UnknownSolver, found {other:?}"),
    });
}

macro_rules! register_solve_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/solve_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: SolveWorld) {
            let _ = world;
        }
    };
}

register_solve_scenario!(solve_happy_path, "solving a request from JSON");
register_solve_scenario!(solve_with_greedy, "solving with the greedy backend");
register_solve_scenario!(solve_invalid_json, "rejecting invalid JSON input");
register_solve_scenario!(solve_single_location, "rejecting requests with a single location");
register_solve_scenario!(solve_missing_request, "rejecting missing request paths");
register_solve_scenario!(solve_unknown_solver, "rejecting unknown solvers");
