//! OSRM Table API response types.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#table-service>

use serde::Deserialize;

/// Matrix row where `None` marks a pair OSRM could not route.
pub type TableRow = Vec<Option<f64>>;

/// OSRM Table API response.
///
/// The `code` field is `"Ok"` on success; other codes such as
/// `"InvalidQuery"` or `"NoTable"` carry a `message`.
#[derive(Debug, Deserialize)]
pub struct TableResponse {
    /// Status code from OSRM.
    pub code: String,

    /// Error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Travel times in seconds, present when durations were requested.
    pub durations: Option<Vec<TableRow>>,

    /// Road distances in metres, present when distances were requested.
    pub distances: Option<Vec<TableRow>>,
}

impl TableResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}
