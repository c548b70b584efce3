//! Shared "refresh pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! source fetch -> normalized table -> change metrics
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use chrono::{DateTime, Local};

use crate::data::{BlsClient, FetchError, ResponseFileSource, SeriesSource};
use crate::domain::{DashConfig, EnrichedObservation, LatestSnapshot, Observation, SeriesCatalog, YearWindow};
use crate::error::AppError;
use crate::transform::{calculate_changes, latest_metrics, series_names};

/// All computed outputs of a single refresh.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub window: YearWindow,
    /// Where the data came from (API URL or file path).
    pub source: String,
    pub fetched_at: DateTime<Local>,
    /// Raw observation count before enrichment.
    pub n_observations: usize,
    pub table: Vec<EnrichedObservation>,
    /// Why the fetch failed, when it did.
    pub failure: Option<String>,
}

impl RunOutput {
    /// An empty table means "data unavailable", never "no error".
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn latest(&self, series_name: &str) -> Option<LatestSnapshot> {
        latest_metrics(&self.table, series_name)
    }

    pub fn series_names(&self) -> Vec<&str> {
        series_names(&self.table)
    }
}

/// Run fetch -> transform once, propagating fetch failures.
pub fn try_refresh(source: &dyn SeriesSource, window: YearWindow) -> Result<RunOutput, FetchError> {
    let observations = source.fetch_observations(window)?;
    Ok(enrich(source, window, observations, None))
}

/// Run fetch -> transform once; a failed fetch yields an empty table whose
/// `failure` carries the reason. Each call builds a fresh table.
pub fn run_refresh(source: &dyn SeriesSource, window: YearWindow) -> RunOutput {
    match source.fetch_observations(window) {
        Ok(observations) => enrich(source, window, observations, None),
        Err(err) => {
            tracing::error!(source = %source.describe(), %window, error = %err, "Error fetching data; returning empty table");
            enrich(source, window, Vec::new(), Some(err.to_string()))
        }
    }
}

fn enrich(
    source: &dyn SeriesSource,
    window: YearWindow,
    observations: Vec<Observation>,
    failure: Option<String>,
) -> RunOutput {
    let table = if observations.is_empty() {
        Vec::new()
    } else {
        calculate_changes(&observations)
    };

    if table.is_empty() {
        tracing::warn!(source = %source.describe(), %window, "Refresh produced no data");
    } else {
        tracing::info!(rows = table.len(), series = series_names(&table).len(), "Refresh complete");
    }

    RunOutput {
        window,
        source: source.describe(),
        fetched_at: Local::now(),
        n_observations: observations.len(),
        table,
        failure,
    }
}

/// Resolve the catalog: `--catalog` file if given, else the built-in one.
pub fn load_catalog(config: &DashConfig) -> Result<SeriesCatalog, AppError> {
    match &config.catalog_path {
        Some(path) => SeriesCatalog::from_json_file(path),
        None => Ok(SeriesCatalog::builtin().clone()),
    }
}

/// Build the data source for this run (saved response or live API).
pub fn build_source(config: &DashConfig, catalog: SeriesCatalog) -> Result<Box<dyn SeriesSource>, AppError> {
    match &config.response_file {
        Some(path) => Ok(Box::new(ResponseFileSource::new(path.clone(), catalog))),
        None => Ok(Box::new(BlsClient::from_env(catalog, config.timeout)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource {
        body: &'static str,
    }

    impl SeriesSource for FixedSource {
        fn fetch_observations(&self, _window: YearWindow) -> Result<Vec<Observation>, FetchError> {
            crate::data::parse_response(self.body, SeriesCatalog::builtin())
        }

        fn describe(&self) -> String {
            "fixture".to_string()
        }
    }

    const BODY: &str = r#"{
        "status": "REQUEST_SUCCEEDED",
        "Results": {"series": [
            {"seriesID": "LNS14000000", "data": [
                {"year": "2024", "period": "M03", "value": "3.4"},
                {"year": "2024", "period": "M02", "value": "3.6"},
                {"year": "2024", "period": "M01", "value": "3.5"}
            ]},
            {"seriesID": "CES0500000003", "data": [
                {"year": "2024", "period": "M01", "value": "34.55"}
            ]}
        ]}
    }"#;

    fn window() -> YearWindow {
        YearWindow { start_year: 2024, end_year: 2024 }
    }

    #[test]
    fn refresh_enriches_every_row() {
        let run = run_refresh(&FixedSource { body: BODY }, window());
        assert_eq!(run.n_observations, 4);
        assert_eq!(run.table.len(), 4);
        assert_eq!(run.source, "fixture");

        let latest = run.latest("Unemployment Rate").unwrap();
        assert!((latest.value - 3.4).abs() < 1e-12);
        assert!(latest.mom_change.is_some_and(|d| (d + 0.2).abs() < 1e-9));
        assert!(run.latest("CPI (Seasonally Adjusted)").is_none());
    }

    #[test]
    fn refresh_is_idempotent() {
        let source = FixedSource { body: BODY };
        let a = run_refresh(&source, window());
        let b = run_refresh(&source, window());
        assert_eq!(a.table, b.table);
    }

    #[test]
    fn shape_error_yields_empty_output() {
        let source = FixedSource {
            body: r#"{"status": "REQUEST_NOT_SUCCESSFUL", "message": ["No Data"]}"#,
        };
        let run = run_refresh(&source, window());
        assert!(run.is_empty());
        assert_eq!(run.n_observations, 0);
        assert!(run.series_names().is_empty());
    }

    struct FailingSource;

    impl SeriesSource for FailingSource {
        fn fetch_observations(&self, _window: YearWindow) -> Result<Vec<Observation>, FetchError> {
            Err(FetchError::Shape)
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    #[test]
    fn failed_fetch_keeps_its_reason() {
        let run = run_refresh(&FailingSource, window());
        assert!(run.is_empty());
        assert_eq!(run.failure.as_deref(), Some("response has no Results.series array"));

        let ok = run_refresh(&FixedSource { body: BODY }, window());
        assert!(ok.failure.is_none());
    }

    #[test]
    fn try_refresh_propagates_fetch_error() {
        assert!(matches!(try_refresh(&FailingSource, window()), Err(FetchError::Shape)));
        let run = try_refresh(&FixedSource { body: BODY }, window()).unwrap();
        assert_eq!(run.table.len(), 4);
    }
}
