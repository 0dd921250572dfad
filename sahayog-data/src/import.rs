//! Location import from JSON exports.
//!
//! Three document shapes are accepted:
//!
//! - an array of location objects with `name`, `address`, `latitude`,
//!   `longitude`, `location_type`, `priority` and `estimated_waste_volume`;
//! - an exported route object whose `stops` array lists visited locations;
//! - an object whose `path` holds `[latitude, longitude]` pairs.
//!
//! Rows without usable coordinates are skipped with a warning and counted in
//! the [`ImportReport`]; only a document of some other shape is an error.
//!
//! # Examples
//! ```
//! use sahayog_data::import::{ImportShape, parse_locations};
//!
//! let report = parse_locations(
//!     r#"[{"name": "Market bin", "latitude": 18.52, "longitude": 73.85},
//!         {"name": "No coordinates"}]"#,
//! )?;
//! assert_eq!(report.shape, ImportShape::Locations);
//! assert_eq!(report.locations.len(), 1);
//! assert_eq!(report.skipped, 1);
//! # Ok::<(), sahayog_data::import::ImportError>(())
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use geo::Coord;
use sahayog_core::{LocationKind, NewLocation, Priority, is_valid_coordinate};
use serde_json::{Map, Value};
use thiserror::Error;

/// Name given to array rows that carry none.
const DEFAULT_LOCATION_NAME: &str = "Imported Location";
/// Route name used when an exported route carries none.
const DEFAULT_ROUTE_NAME: &str = "Imported Route";

/// Errors raised while importing locations.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The import file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that failed to open or read.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid JSON.
    #[error("invalid import JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The document is valid JSON in none of the accepted shapes.
    #[error("JSON must be an array of locations")]
    UnsupportedShape,
}

/// Which document shape an import was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportShape {
    /// A plain array of location objects.
    Locations,
    /// An exported route with a `stops` array.
    RouteStops,
    /// An exported route with a `path` of coordinate pairs.
    RoutePath,
}

/// A location read from an import document.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedLocation {
    /// Display name.
    pub name: String,
    /// Street address, possibly empty.
    pub address: String,
    /// Position with `x` as longitude and `y` as latitude.
    pub coordinate: Coord<f64>,
    /// Site category.
    pub kind: LocationKind,
    /// Collection urgency.
    pub priority: Priority,
    /// Estimated waste volume in litres.
    pub demand_litres: f64,
}

impl From<ImportedLocation> for NewLocation {
    fn from(location: ImportedLocation) -> Self {
        Self {
            name: location.name,
            address: location.address,
            coordinate: location.coordinate,
            kind: location.kind,
            priority: location.priority,
            demand_litres: location.demand_litres,
        }
    }
}

/// Outcome of parsing an import document.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    /// Shape the document was read as.
    pub shape: ImportShape,
    /// Rows that parsed into locations, in document order.
    pub locations: Vec<ImportedLocation>,
    /// Rows dropped for missing or invalid fields.
    pub skipped: usize,
    /// Route name for exported routes.
    pub route_name: Option<String>,
    /// Vehicle name recorded on an exported route.
    pub vehicle_name: Option<String>,
}

impl ImportReport {
    /// Number of rows the document held.
    #[must_use]
    pub const fn total_items(&self) -> usize {
        self.locations.len() + self.skipped
    }
}

/// Read and parse the import document at `path`.
///
/// # Errors
///
/// Returns [`ImportError::Read`] when the file cannot be read, and the
/// errors of [`parse_locations`] otherwise.
pub fn read_locations(path: &Utf8Path) -> Result<ImportReport, ImportError> {
    let contents = sahayog_fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_owned(),
        source,
    })?;
    parse_locations(&contents)
}

/// Parse an import document held in memory.
///
/// # Errors
///
/// Returns [`ImportError::Json`] for malformed JSON and
/// [`ImportError::UnsupportedShape`] for documents in none of the accepted
/// shapes.
pub fn parse_locations(json: &str) -> Result<ImportReport, ImportError> {
    let document: Value = serde_json::from_str(json)?;
    match document {
        Value::Array(rows) => Ok(collect_rows(ImportShape::Locations, &rows, location_row)),
        Value::Object(route) => parse_route(&route),
        _ => Err(ImportError::UnsupportedShape),
    }
}

fn parse_route(route: &Map<String, Value>) -> Result<ImportReport, ImportError> {
    let mut report = if let Some(Value::Array(stops)) = route.get("stops") {
        collect_rows(ImportShape::RouteStops, stops, |_, stop| stop_row(stop))
    } else if let Some(Value::Array(path)) = route.get("path") {
        collect_rows(ImportShape::RoutePath, path, path_row)
    } else {
        return Err(ImportError::UnsupportedShape);
    };
    report.route_name = Some(
        text(route, "name").map_or_else(|| DEFAULT_ROUTE_NAME.to_owned(), str::to_owned),
    );
    report.vehicle_name = text(route, "vehicle").map(str::to_owned);
    Ok(report)
}

fn collect_rows<F>(shape: ImportShape, rows: &[Value], mut parse: F) -> ImportReport
where
    F: FnMut(usize, &Value) -> Result<ImportedLocation, String>,
{
    let mut locations = Vec::with_capacity(rows.len());
    let mut skipped = 0;
    for (index, row) in rows.iter().enumerate() {
        match parse(index, row) {
            Ok(location) => locations.push(location),
            Err(reason) => {
                log::warn!("skipping import row {}: {reason}", index + 1);
                skipped += 1;
            }
        }
    }
    ImportReport {
        shape,
        locations,
        skipped,
        route_name: None,
        vehicle_name: None,
    }
}

fn location_row(_index: usize, row: &Value) -> Result<ImportedLocation, String> {
    let fields = row.as_object().ok_or("row is not an object")?;
    let coordinate = coordinate(fields.get("latitude"), fields.get("longitude"))?;
    let kind = match text(fields, "location_type") {
        Some(kind) => kind.parse()?,
        None => LocationKind::Bin,
    };
    let priority = match text(fields, "priority") {
        Some(priority) => priority.parse()?,
        None => Priority::Medium,
    };
    let demand_litres = match fields.get("estimated_waste_volume") {
        None | Some(Value::Null) => 0.0,
        Some(value) => number(value)
            .filter(|litres| *litres >= 0.0)
            .ok_or("estimated_waste_volume must be a non-negative number")?,
    };
    Ok(ImportedLocation {
        name: text(fields, "name").unwrap_or(DEFAULT_LOCATION_NAME).to_owned(),
        address: text(fields, "address").unwrap_or_default().to_owned(),
        coordinate,
        kind,
        priority,
        demand_litres,
    })
}

fn stop_row(stop: &Value) -> Result<ImportedLocation, String> {
    let fields = stop.as_object().ok_or("stop is not an object")?;
    let coordinate = coordinate(fields.get("latitude"), fields.get("longitude"))?;
    let name = text(fields, "name").map_or_else(
        || {
            let order = fields.get("order").map(display_value).unwrap_or_default();
            format!("Imported Stop {order}").trim_end().to_owned()
        },
        str::to_owned,
    );
    Ok(collection_point(
        name,
        text(fields, "address").unwrap_or_default().to_owned(),
        coordinate,
    ))
}

fn path_row(index: usize, point: &Value) -> Result<ImportedLocation, String> {
    let pair = point
        .as_array()
        .filter(|pair| pair.len() >= 2)
        .ok_or("path entry is not a [latitude, longitude] pair")?;
    let coordinate = coordinate(pair.first(), pair.get(1))?;
    Ok(collection_point(
        format!("Imported Point {}", index + 1),
        String::new(),
        coordinate,
    ))
}

fn collection_point(name: String, address: String, coordinate: Coord<f64>) -> ImportedLocation {
    ImportedLocation {
        name,
        address,
        coordinate,
        kind: LocationKind::CollectionPoint,
        priority: Priority::Medium,
        demand_litres: 0.0,
    }
}

fn coordinate(latitude: Option<&Value>, longitude: Option<&Value>) -> Result<Coord<f64>, String> {
    let (Some(lat), Some(lng)) = (
        latitude.and_then(number),
        longitude.and_then(number),
    ) else {
        return Err("missing latitude or longitude".to_owned());
    };
    let coord = Coord { x: lng, y: lat };
    if is_valid_coordinate(coord) {
        Ok(coord)
    } else {
        Err(format!("coordinate ({lat}, {lng}) is out of range"))
    }
}

/// Numbers may arrive as JSON numbers or numeric strings.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
    .filter(|number| number.is_finite())
}

/// Non-empty string field.
fn text<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
