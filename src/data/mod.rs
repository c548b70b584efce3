//! Upstream data acquisition.
//!
//! - `bls`: live BLS timeseries API client and response parsing
//! - `replay`: serve a previously saved upstream response from disk

pub mod bls;
pub mod replay;

pub use bls::{BlsClient, FetchError, parse_response};
pub use replay::ResponseFileSource;

use crate::domain::{Observation, YearWindow};

/// Anything that can produce the normalized observation table for a window.
pub trait SeriesSource {
    /// Fetch and normalize, reporting why a fetch failed.
    fn fetch_observations(&self, window: YearWindow) -> Result<Vec<Observation>, FetchError>;

    /// Short human-readable description (URL or file path) for logs and headers.
    fn describe(&self) -> String;

    /// Fetch, degrading any failure to an empty table.
    ///
    /// Callers must read an empty table as "data unavailable".
    fn fetch_data(&self, window: YearWindow) -> Vec<Observation> {
        match self.fetch_observations(window) {
            Ok(rows) => rows,
            Err(err) => {
                tracing::error!(source = %self.describe(), %window, error = %err, "Error fetching data; returning empty table");
                Vec::new()
            }
        }
    }
}
