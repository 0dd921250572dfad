//! Behaviour-driven steps for the database-backed commands.

use super::helpers::{Workspace, write_utf8};
use super::*;
use crate::solve::DefaultSolverBuilder;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use sahayog_core::{NewVehicle, RecordStore, SqliteRouteStore, SqliteRouteStoreError};
use serde_json::Value;
use camino::Utf8PathBuf;
use std::cell::RefCell;

struct RecordsWorld {
    workspace: Workspace,
    route_ids: RefCell<Vec<i64>>,
    output: RefCell<Option<Value>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl RecordsWorld {
    fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            route_ids: RefCell::new(Vec::new()),
            output: RefCell::new(None),
            result: RefCell::new(None),
        }
    }

    fn database(&self) -> Utf8PathBuf {
        self.workspace.path("data/routes.db")
    }

    fn import_file(&self) -> Utf8PathBuf {
        self.workspace.path("locations.json")
    }

    fn run(&self, argv: &[&str]) {
        let mut full = vec!["sahayog".to_owned()];
        full.extend(argv.iter().map(|arg| (*arg).to_owned()));
        full.extend([format!("--{ARG_DATABASE}"), self.database().into_string()]);

        let mut stdout = Vec::new();
        let outcome = Cli::try_parse_from(full)
            .map_err(CliError::from)
            .and_then(|cli| run_command(cli.command, &DefaultSolverBuilder, &mut stdout));
        let output = outcome
            .is_ok()
            .then(|| serde_json::from_slice(&stdout).expect("command output should be JSON"));
        self.output.replace(output);
        self.result.replace(Some(outcome));
    }

    fn output(&self) -> Value {
        let borrowed = self.result.borrow();
        if let Some(Err(err)) = borrowed.as_ref() {
            panic!("expected success, found {err}");
        }
        self.output.borrow().clone().expect("command output recorded")
    }

    fn first_route_id(&self) -> String {
        self.route_ids
            .borrow()
            .first()
            .expect("a route was saved")
            .to_string()
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
fn world() -> RecordsWorld {
    RecordsWorld::new()
}

#[given("an import file with {valid} valid rows and {invalid} row without coordinates")]
fn import_file_exists(#[from(world)] world: &RecordsWorld, valid: u32, invalid: u32) {
    let mut rows: Vec<Value> = (1..=valid)
        .map(|n| {
            serde_json::json!({
                "name": format!("Bin {n}"),
                "latitude": 18.52,
                "longitude": 73.85 + f64::from(n) * 0.01,
                "estimated_waste_volume": 100,
            })
        })
        .collect();
    rows.extend((0..invalid).map(|_| serde_json::json!({ "name": "Lost bin" })));
    let payload = serde_json::to_vec(&rows).expect("serialise import rows");
    write_utf8(&world.import_file(), &payload);
}

#[given("an exported route {name} with {stops} stops")]
fn exported_route_exists(#[from(world)] world: &RecordsWorld, name: String, stops: u32) {
    let stops: Vec<Value> = (1..=stops)
        .map(|order| {
            serde_json::json!({
                "order": order,
                "latitude": 18.52,
                "longitude": 73.85 + f64::from(order) * 0.01,
            })
        })
        .collect();
    let route = serde_json::json!({
        "name": name.trim_matches('"'),
        "vehicle": "Truck 1",
        "stops": stops,
    });
    let payload = serde_json::to_vec(&route).expect("serialise exported route");
    write_utf8(&world.import_file(), &payload);
}

fn import(world: &RecordsWorld) {
    let file = world.import_file().into_string();
    world.run(&["import", file.as_str()]);
}

#[given("I import the file")]
fn file_imported(#[from(world)] world: &RecordsWorld) {
    import(world);
    world.output();
}

#[when("I import the file")]
fn import_the_file(#[from(world)] world: &RecordsWorld) {
    import(world);
}

#[given("a truck with {capacity} litres capacity is registered")]
fn truck_registered(#[from(world)] world: &RecordsWorld, capacity: f64) {
    sahayog_fs::ensure_parent_dir(&world.database()).expect("create database directory");
    let store = SqliteRouteStore::open(world.database().as_std_path()).expect("open database");
    store
        .insert_vehicle(&NewVehicle::from(sahayog_core::Vehicle::new(
            sahayog_core::VehicleId(0),
            "Truck 1",
            capacity,
        )))
        .expect("insert vehicle");
}

fn optimise(world: &RecordsWorld, name: &str) {
    let name = name.trim_matches('"');
    world.run(&[
        "optimize",
        "--route-name",
        name,
        "--solver",
        "greedy",
    ]);
    let output = world.output();
    let ids = output["route_ids"]
        .as_array()
        .expect("route ids array")
        .iter()
        .map(|id| id.as_i64().expect("numeric route id"))
        .collect();
    world.route_ids.replace(ids);
}

#[given("I optimise every location as {name}")]
fn locations_optimised(#[from(world)] world: &RecordsWorld, name: String) {
    optimise(world, &name);
}

#[when("I optimise every location as {name}")]
fn optimise_every_location(#[from(world)] world: &RecordsWorld, name: String) {
    optimise(world, &name);
}

#[when("I request statistics for the saved route")]
fn request_statistics(#[from(world)] world: &RecordsWorld) {
    let route_id = world.first_route_id();
    world.run(&["stats", route_id.as_str()]);
}

#[when("I delete the saved route")]
fn delete_saved_route(#[from(world)] world: &RecordsWorld) {
    let route_id = world.first_route_id();
    world.run(&["delete", route_id.as_str()]);
    let output = world.output();
    assert_eq!(output["deleted"].to_string(), route_id);
}

#[when("I list the history")]
fn list_history(#[from(world)] world: &RecordsWorld) {
    world.run(&["history"]);
}

#[then("the import reports {imported} imported and {skipped} skipped")]
fn import_reports_counts(#[from(world)] world: &RecordsWorld, imported: u64, skipped: u64) {
    let output = world.output();
    assert_eq!(output["imported"], imported);
    assert_eq!(output["skipped"], skipped);
    assert_eq!(output["total_items"], imported + skipped);
    assert!(world.database().exists(), "import should create the database");
}

#[then("the imported route {name} has {stops} stops")]
fn imported_route_has_stops(#[from(world)] world: &RecordsWorld, name: String, stops: usize) {
    let output = world.output();
    assert_eq!(output["route_name"], name.trim_matches('"'));
    assert_eq!(output["imported"], 3);
    let route_id = output["route_id"].as_i64().expect("route id");
    let store = SqliteRouteStore::open(world.database().as_std_path()).expect("open database");
    let stats = store
        .route_statistics(sahayog_core::RouteId(route_id))
        .expect("imported route statistics");
    assert_eq!(stats.name, name.trim_matches('"'));
    assert_eq!(stats.vehicle_name, "Truck 1");
    assert_eq!(stats.stops.len(), stops);
}

#[then("the optimisation saves {routes} route covering {stops} stops")]
fn optimisation_saves_routes(#[from(world)] world: &RecordsWorld, routes: usize, stops: usize) {
    assert_eq!(world.route_ids.borrow().len(), routes);
    let output = world.output();
    assert_eq!(output["plan"]["status"], "complete");
    let saved_stops: usize = output["plan"]["routes"]
        .as_array()
        .expect("routes array")
        .iter()
        .map(|route| route["stops"].as_array().map_or(0, Vec::len))
        .sum();
    assert_eq!(saved_stops, stops);
}

#[then("the history lists {name} first")]
fn history_lists_session(#[from(world)] world: &RecordsWorld, name: String) {
    world.run(&["history"]);
    let output = world.output();
    let sessions = output.as_array().expect("history array");
    let first = sessions.first().expect("at least one session");
    assert_eq!(first["name"], name.trim_matches('"'));
    assert_eq!(first["solver"], "greedy");
}

#[then("the statistics describe {name} with {stops} stops")]
fn statistics_describe_route(#[from(world)] world: &RecordsWorld, name: String, stops: usize) {
    let output = world.output();
    assert_eq!(output["name"], name.trim_matches('"'));
    assert_eq!(output["status"], "planned");
    assert_eq!(output["stops"].as_array().map_or(0, Vec::len), stops);
}

#[then("the command fails because the route is missing")]
fn command_fails_missing_route(#[from(world)] world: &RecordsWorld) {
    world.error(|error| match error {
        CliError::Store {
            source: SqliteRouteStoreError::MissingRoute { .. },
            ..
        } => {}
        other => panic!("expected MissingRoute, found {other:?}"),
    });
}

#[then("the command fails because no vehicle is available")]
fn command_fails_without_vehicle(#[from(world)] world: &RecordsWorld) {
    world.error(|error| match error {
        CliError::Store {
            source: SqliteRouteStoreError::NoAvailableVehicle,
            ..
        } => {}
        other => panic!("expected NoAvailableVehicle, found {other:?}"),
    });
}

#[then("the database holds no locations")]
fn database_holds_no_locations(#[from(world)] world: &RecordsWorld) {
    let store = SqliteRouteStore::open(world.database().as_std_path()).expect("open database");
    assert!(store.load_locations(&[]).expect("load locations").is_empty());
}

#[then("the command fails because the database is missing")]
fn command_fails_missing_database(#[from(world)] world: &RecordsWorld) {
    world.error(|error| match error {
        CliError::MissingSourceFile { field, .. } => assert_eq!(*field, ARG_DATABASE),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    });
}

macro_rules! register_records_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/records_commands.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: RecordsWorld) {
            let _ = world;
        }
    };
}

register_records_scenario!(import_creates_database, "importing locations creates the database");
register_records_scenario!(route_import_saves_route, "importing an exported route saves it");
register_records_scenario!(
    route_import_without_vehicle,
    "importing a route without vehicles stores nothing"
);
register_records_scenario!(optimise_saves_routes, "optimising imported locations saves the routes");
register_records_scenario!(stats_report_route, "reporting a saved route");
register_records_scenario!(delete_removes_route, "deleting a saved route");
register_records_scenario!(history_requires_database, "history requires an existing database");
