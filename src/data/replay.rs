//! Replay a saved BLS response body from disk.
//!
//! Useful offline and for reproducing a dashboard exactly: save the JSON the
//! API returned, then point `--response-file` at it.

use std::path::PathBuf;

use crate::data::bls::{FetchError, parse_response};
use crate::data::SeriesSource;
use crate::domain::{Observation, SeriesCatalog, YearWindow};

pub struct ResponseFileSource {
    path: PathBuf,
    catalog: SeriesCatalog,
}

impl ResponseFileSource {
    pub fn new(path: PathBuf, catalog: SeriesCatalog) -> Self {
        Self { path, catalog }
    }
}

impl SeriesSource for ResponseFileSource {
    fn fetch_observations(&self, window: YearWindow) -> Result<Vec<Observation>, FetchError> {
        let body = std::fs::read_to_string(&self.path).map_err(|e| FetchError::Read {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        // The live API filters by year; a saved body may cover a wider span.
        let mut rows = parse_response(&body, &self.catalog)?;
        rows.retain(|o| window.contains(o.year));
        tracing::info!(path = %self.path.display(), rows = rows.len(), %window, "Loaded saved BLS response");
        Ok(rows)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("econ-dash-{}-{name}", std::process::id()));
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn replay_filters_to_requested_window() {
        let body = r#"{
            "status": "REQUEST_SUCCEEDED",
            "Results": {"series": [{"seriesID": "LNS14000000", "data": [
                {"year": "2019", "period": "M12", "value": "3.6"},
                {"year": "2020", "period": "M01", "value": "3.5"},
                {"year": "2021", "period": "M01", "value": "6.4"}
            ]}]}
        }"#;
        let path = write_temp("window.json", body);
        let source = ResponseFileSource::new(path.clone(), SeriesCatalog::builtin().clone());

        let rows = source
            .fetch_observations(YearWindow { start_year: 2020, end_year: 2020 })
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].year, 2020);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_degrades_to_empty_table() {
        let source = ResponseFileSource::new(
            PathBuf::from("/nonexistent/econ-dash/response.json"),
            SeriesCatalog::builtin().clone(),
        );
        let window = YearWindow { start_year: 2020, end_year: 2021 };
        assert!(matches!(source.fetch_observations(window), Err(FetchError::Read { .. })));
        assert!(source.fetch_data(window).is_empty());
    }
}
