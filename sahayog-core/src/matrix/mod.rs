//! Distance and travel-time matrices between route points.
//!
//! The [`MatrixProvider`] trait abstracts the retrieval of pairwise road
//! distances and travel times between coordinates. Callers supply a slice of
//! points and receive a square [`RouteMatrix`].
//!
//! Errors are returned when inputs are invalid, e.g. an empty slice.

mod error;
mod geodesic;

use std::time::Duration;

use geo::Coord;

pub use error::MatrixError;
pub use geodesic::GeodesicMatrixProvider;

/// Distance, in metres, marking a pair of points with no connecting road.
pub const UNREACHABLE_DISTANCE: u64 = u64::MAX;

/// Square matrices of distances (metres) and travel times between points.
///
/// `distance(i, j)` is the road distance from point `i` to point `j`.
/// Unreachable pairs hold [`UNREACHABLE_DISTANCE`] and [`Duration::MAX`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use sahayog_core::RouteMatrix;
///
/// let matrix = RouteMatrix::from_fn(2, |from, to| {
///     if from == to { (0, Duration::ZERO) } else { (1_000, Duration::from_secs(120)) }
/// });
/// assert_eq!(matrix.size(), 2);
/// assert_eq!(matrix.distance(0, 1), Some(1_000));
/// assert_eq!(matrix.duration(1, 0), Some(Duration::from_secs(120)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatrix {
    distances: Vec<Vec<u64>>,
    durations: Vec<Vec<Duration>>,
}

impl RouteMatrix {
    /// Build a matrix from row-major distance and duration tables.
    ///
    /// # Errors
    /// Returns [`MatrixError::DimensionMismatch`] when either table is not
    /// square or the two tables differ in size.
    pub fn new(
        distances: Vec<Vec<u64>>,
        durations: Vec<Vec<Duration>>,
    ) -> Result<Self, MatrixError> {
        let size = distances.len();
        if durations.len() != size {
            return Err(MatrixError::DimensionMismatch {
                expected: size,
                found: durations.len(),
            });
        }
        let ragged = distances
            .iter()
            .map(Vec::len)
            .chain(durations.iter().map(Vec::len))
            .find(|len| *len != size);
        if let Some(found) = ragged {
            return Err(MatrixError::DimensionMismatch {
                expected: size,
                found,
            });
        }
        Ok(Self {
            distances,
            durations,
        })
    }

    /// Build an `n x n` matrix by evaluating `cell(from, to)` for each pair.
    pub fn from_fn<F>(size: usize, mut cell: F) -> Self
    where
        F: FnMut(usize, usize) -> (u64, Duration),
    {
        let mut distances = Vec::with_capacity(size);
        let mut durations = Vec::with_capacity(size);
        for from in 0..size {
            let (distance_row, duration_row): (Vec<u64>, Vec<Duration>) =
                (0..size).map(|to| cell(from, to)).unzip();
            distances.push(distance_row);
            durations.push(duration_row);
        }
        Self {
            distances,
            durations,
        }
    }

    /// Number of points covered by the matrix.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.distances.len()
    }

    /// Distance in metres from `from` to `to`, or `None` when out of range.
    #[must_use]
    pub fn distance(&self, from: usize, to: usize) -> Option<u64> {
        self.distances.get(from)?.get(to).copied()
    }

    /// Travel time from `from` to `to`, or `None` when out of range.
    #[must_use]
    pub fn duration(&self, from: usize, to: usize) -> Option<Duration> {
        self.durations.get(from)?.get(to).copied()
    }

    /// Whether a road connects `from` to `to`.
    #[must_use]
    pub fn is_reachable(&self, from: usize, to: usize) -> bool {
        self.distance(from, to)
            .is_some_and(|distance| distance != UNREACHABLE_DISTANCE)
            && self
                .duration(from, to)
                .is_some_and(|duration| duration != Duration::MAX)
    }

    /// Confirm the matrix covers exactly `expected` points.
    ///
    /// # Errors
    /// Returns [`MatrixError::DimensionMismatch`] when the sizes differ.
    pub const fn ensure_size(&self, expected: usize) -> Result<(), MatrixError> {
        if self.size() == expected {
            Ok(())
        } else {
            Err(MatrixError::DimensionMismatch {
                expected,
                found: self.size(),
            })
        }
    }

    /// Row-major distance table.
    #[must_use]
    pub fn distances(&self) -> &[Vec<u64>] {
        &self.distances
    }

    /// Row-major travel-time table.
    #[must_use]
    pub fn durations(&self) -> &[Vec<Duration>] {
        &self.durations
    }
}

/// Fetch pairwise distances and travel times for a set of points.
///
/// Implementers must return a square `n×n` matrix where `n == points.len()`.
/// Points are WGS84 coordinates with `x = longitude` and `y = latitude`.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use geo::Coord;
/// use sahayog_core::{MatrixError, MatrixProvider, RouteMatrix};
///
/// struct UnitProvider;
///
/// impl MatrixProvider for UnitProvider {
///     fn route_matrix(&self, points: &[Coord<f64>]) -> Result<RouteMatrix, MatrixError> {
///         if points.is_empty() {
///             return Err(MatrixError::EmptyInput);
///         }
///         Ok(RouteMatrix::from_fn(points.len(), |from, to| {
///             if from == to { (0, Duration::ZERO) } else { (1, Duration::from_secs(1)) }
///         }))
///     }
/// }
///
/// let matrix = UnitProvider.route_matrix(&[Coord { x: 0.0, y: 0.0 }])?;
/// assert_eq!(matrix.size(), 1);
/// # Ok::<(), MatrixError>(())
/// ```
pub trait MatrixProvider {
    /// Return the matrix for `points`.
    ///
    /// Implementations must return `Err(MatrixError::EmptyInput)` when
    /// `points` is empty.
    fn route_matrix(&self, points: &[Coord<f64>]) -> Result<RouteMatrix, MatrixError>;
}

impl<T: MatrixProvider + ?Sized> MatrixProvider for &T {
    fn route_matrix(&self, points: &[Coord<f64>]) -> Result<RouteMatrix, MatrixError> {
        (**self).route_matrix(points)
    }
}

impl<T: MatrixProvider + ?Sized> MatrixProvider for Box<T> {
    fn route_matrix(&self, points: &[Coord<f64>]) -> Result<RouteMatrix, MatrixError> {
        (**self).route_matrix(points)
    }
}
