use thiserror::Error;

/// Errors from [`crate::matrix::MatrixProvider::route_matrix`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// No route points were provided.
    ///
    /// The provider requires at least one point to compute a matrix. Callers
    /// should pre-filter input to avoid this condition.
    #[error("at least one route point is required")]
    EmptyInput,
    /// The provider returned a matrix of the wrong size.
    #[error("expected a {expected}x{expected} matrix, found {found} rows")]
    DimensionMismatch {
        /// Number of points requested.
        expected: usize,
        /// Number of rows (or a row length) actually returned.
        found: usize,
    },
    /// The routing service could not be reached.
    #[error("network error calling {url}: {message}")]
    Network {
        /// Request URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The routing service did not answer in time.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Configured timeout.
        timeout_secs: u64,
    },
    /// The routing service answered with an HTTP error status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },
    /// The routing service reported a domain error.
    #[error("routing service error {code}: {message}")]
    Service {
        /// Service status code.
        code: String,
        /// Service message.
        message: String,
    },
    /// The routing service response could not be decoded.
    #[error("failed to parse routing response: {message}")]
    Parse {
        /// Decoder error description.
        message: String,
    },
}
