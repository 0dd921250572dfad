//! Index layout of route points handed to matrix providers and solvers.
//!
//! Points `0..L` are the request locations in request order. They are
//! followed by one start point per vehicle, in vehicle order.

use std::collections::HashMap;

use geo::Coord;

use crate::{LocationId, RouteRequest};

/// Mapping between request records and matrix indices.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use sahayog_core::{Location, LocationId, RouteLayout, RouteRequest, Vehicle, VehicleId};
///
/// let request = RouteRequest::new(
///     vec![
///         Location::new(LocationId(10), "depot", Coord { x: 73.80, y: 18.50 }),
///         Location::new(LocationId(11), "bin", Coord { x: 73.85, y: 18.52 }),
///     ],
///     vec![Vehicle::new(VehicleId(1), "truck", 100.0)],
/// )
/// .with_depot(LocationId(10));
///
/// let layout = RouteLayout::new(&request);
/// assert_eq!(layout.points().len(), 3);
/// assert_eq!(layout.visit_indices(), &[1]);
/// assert_eq!(layout.start_index(0), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLayout {
    points: Vec<Coord<f64>>,
    location_ids: Vec<LocationId>,
    positions: HashMap<LocationId, usize>,
    visits: Vec<usize>,
    starts: Vec<usize>,
}

impl RouteLayout {
    /// Lay out the points of `request`.
    ///
    /// Vehicles without an explicit start use the depot coordinate, or the
    /// first location's coordinate when no depot is named.
    #[must_use]
    pub fn new(request: &RouteRequest) -> Self {
        let mut points: Vec<Coord<f64>> = request
            .locations
            .iter()
            .map(|location| location.coordinate)
            .collect();
        let location_ids: Vec<LocationId> =
            request.locations.iter().map(|location| location.id).collect();
        let positions = location_ids
            .iter()
            .enumerate()
            .map(|(index, id)| (*id, index))
            .collect();
        let visits = request
            .locations
            .iter()
            .enumerate()
            .filter(|(_, location)| Some(location.id) != request.depot)
            .map(|(index, _)| index)
            .collect();

        let default_start = request
            .depot
            .and_then(|depot| request.location(depot))
            .or_else(|| request.locations.first())
            .map(|location| location.coordinate);

        let mut starts = Vec::with_capacity(request.vehicles.len());
        for vehicle in &request.vehicles {
            let Some(start) = vehicle.start.or(default_start) else {
                continue;
            };
            starts.push(points.len());
            points.push(start);
        }

        Self {
            points,
            location_ids,
            positions,
            visits,
            starts,
        }
    }

    /// Every route point, locations first.
    #[must_use]
    pub fn points(&self) -> &[Coord<f64>] {
        &self.points
    }

    /// Number of request locations at the front of [`Self::points`].
    #[must_use]
    pub fn location_count(&self) -> usize {
        self.location_ids.len()
    }

    /// Indices of the locations that must be visited.
    #[must_use]
    pub fn visit_indices(&self) -> &[usize] {
        &self.visits
    }

    /// Point index each vehicle departs from, in vehicle order.
    #[must_use]
    pub fn start_indices(&self) -> &[usize] {
        &self.starts
    }

    /// Point index vehicle number `vehicle` departs from.
    #[must_use]
    pub fn start_index(&self, vehicle: usize) -> Option<usize> {
        self.starts.get(vehicle).copied()
    }

    /// Location identifier at `index`, or `None` for start points.
    #[must_use]
    pub fn location_id(&self, index: usize) -> Option<LocationId> {
        self.location_ids.get(index).copied()
    }

    /// Point index of location `id`.
    #[must_use]
    pub fn index_of(&self, id: LocationId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Coordinate of the point at `index`.
    #[must_use]
    pub fn point(&self, index: usize) -> Option<Coord<f64>> {
        self.points.get(index).copied()
    }
}
