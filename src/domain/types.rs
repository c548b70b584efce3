//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the fetch -> transform pipeline
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Inclusive range of calendar years requested from upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearWindow {
    pub start_year: i32,
    pub end_year: i32,
}

impl YearWindow {
    /// Length of the default trailing window, including the current year.
    pub const TRAILING_YEARS: i32 = 10;

    /// Default trailing window ending in the year of `today`.
    pub fn trailing(today: NaiveDate) -> Self {
        let end_year = today.year();
        Self {
            start_year: end_year - (Self::TRAILING_YEARS - 1),
            end_year,
        }
    }

    /// Apply optional overrides on top of the trailing defaults.
    ///
    /// Each bound defaults independently: `start = year(today) - 9`,
    /// `end = year(today)`.
    pub fn resolve(start_year: Option<i32>, end_year: Option<i32>, today: NaiveDate) -> Result<Self, AppError> {
        let defaults = Self::trailing(today);
        let window = Self {
            start_year: start_year.unwrap_or(defaults.start_year),
            end_year: end_year.unwrap_or(defaults.end_year),
        };
        if window.start_year > window.end_year {
            return Err(AppError::config(format!(
                "Invalid year window: start year {} is after end year {}.",
                window.start_year, window.end_year
            )));
        }
        Ok(window)
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start_year..=self.end_year).contains(&year)
    }
}

impl std::fmt::Display for YearWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start_year, self.end_year)
    }
}

/// One normalized monthly observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub series_id: String,
    pub series_name: String,
    /// First day of the observation month.
    pub date: NaiveDate,
    pub value: f64,
    pub year: i32,
    /// Calendar month, 1..=12.
    pub month: u32,
}

/// Observation plus lag-based change metrics within its own series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedObservation {
    #[serde(flatten)]
    pub observation: Observation,
    /// `value[t] - value[t-1]`; `None` on the first row of a series.
    pub mom_change: Option<f64>,
    /// `(value[t] / value[t-1] - 1) * 100`.
    pub mom_pct_change: Option<f64>,
    /// `(value[t] / value[t-12] - 1) * 100`; `None` on the first 12 rows of a series.
    pub yoy_pct_change: Option<f64>,
}

/// The newest row of one series, as shown on metric cards.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestSnapshot {
    pub series_id: String,
    pub series_name: String,
    pub date: NaiveDate,
    pub value: f64,
    pub mom_change: Option<f64>,
    pub mom_pct_change: Option<f64>,
    pub yoy_pct_change: Option<f64>,
}

impl From<&EnrichedObservation> for LatestSnapshot {
    fn from(row: &EnrichedObservation) -> Self {
        Self {
            series_id: row.observation.series_id.clone(),
            series_name: row.observation.series_name.clone(),
            date: row.observation.date,
            value: row.observation.value,
            mom_change: row.mom_change,
            mom_pct_change: row.mom_pct_change,
            yoy_pct_change: row.yoy_pct_change,
        }
    }
}

/// Which column of the enriched table to chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeColumn {
    /// Raw series level.
    Value,
    /// Month-over-month absolute change.
    Mom,
    /// Month-over-month percent change.
    MomPct,
    /// Year-over-year percent change.
    Yoy,
}

impl ChangeColumn {
    pub fn get(self, row: &EnrichedObservation) -> Option<f64> {
        match self {
            ChangeColumn::Value => Some(row.observation.value),
            ChangeColumn::Mom => row.mom_change,
            ChangeColumn::MomPct => row.mom_pct_change,
            ChangeColumn::Yoy => row.yoy_pct_change,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChangeColumn::Value => "value",
            ChangeColumn::Mom => "MoM change",
            ChangeColumn::MomPct => "MoM % change",
            ChangeColumn::Yoy => "YoY % change",
        }
    }

    /// Change columns read better as bars; levels as lines.
    pub fn is_bar(self) -> bool {
        matches!(self, ChangeColumn::Mom)
    }
}

/// Run configuration collected from CLI args and environment.
#[derive(Debug, Clone)]
pub struct DashConfig {
    pub window: YearWindow,
    /// Optional JSON catalog replacing the built-in one.
    pub catalog_path: Option<PathBuf>,
    /// Replay a saved upstream response instead of calling the API.
    pub response_file: Option<PathBuf>,
    pub timeout: Duration,
    /// Minimum age before a cached refresh is replaced.
    pub cache_ttl: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_window_covers_ten_years_including_current() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let window = YearWindow::trailing(today);
        assert_eq!(window.start_year, 2017);
        assert_eq!(window.end_year, 2026);
    }

    #[test]
    fn resolve_overrides_each_bound_independently() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let window = YearWindow::resolve(Some(2020), None, today).unwrap();
        assert_eq!(window, YearWindow { start_year: 2020, end_year: 2026 });

        let window = YearWindow::resolve(None, Some(2024), today).unwrap();
        assert_eq!(window, YearWindow { start_year: 2017, end_year: 2024 });
    }

    #[test]
    fn resolve_rejects_inverted_window() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let err = YearWindow::resolve(Some(2025), Some(2020), today).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
    }
}
