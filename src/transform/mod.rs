//! Period-over-period change metrics over the normalized observation table.
//!
//! All lags are taken by row offset within one series after sorting that
//! series by date, never by calendar arithmetic and never across series.

use std::collections::BTreeMap;

use crate::domain::{EnrichedObservation, LatestSnapshot, Observation};

/// Offset used for year-over-year comparisons on monthly data.
pub const YOY_LAG: usize = 12;

/// Add MoM / MoM% / YoY% columns to every observation.
///
/// Output is grouped by series name (ascending) and date-ordered within each
/// series. Row count and (series name, date) identity are preserved.
pub fn calculate_changes(observations: &[Observation]) -> Vec<EnrichedObservation> {
    let mut partitions: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
    for obs in observations {
        partitions.entry(obs.series_name.as_str()).or_default().push(obs);
    }

    let mut out = Vec::with_capacity(observations.len());
    for (_, mut rows) in partitions {
        rows.sort_by_key(|o| o.date);
        let values: Vec<f64> = rows.iter().map(|o| o.value).collect();

        for (i, obs) in rows.into_iter().enumerate() {
            let current = values[i];
            let prev = lagged(&values, i, 1);
            let year_ago = lagged(&values, i, YOY_LAG);
            out.push(EnrichedObservation {
                observation: obs.clone(),
                mom_change: prev.map(|p| current - p),
                mom_pct_change: prev.and_then(|p| pct_change(current, p)),
                yoy_pct_change: year_ago.and_then(|p| pct_change(current, p)),
            });
        }
    }
    out
}

fn lagged(values: &[f64], i: usize, lag: usize) -> Option<f64> {
    i.checked_sub(lag).map(|j| values[j])
}

/// `(current / previous - 1) * 100`, undefined when the base is zero.
fn pct_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    let pct = (current / previous - 1.0) * 100.0;
    pct.is_finite().then_some(pct)
}

/// Newest row of `series_name`, or `None` when the series has no rows.
///
/// Selects the maximum date explicitly, so the result does not depend on the
/// table's order. Ties resolve to the last such row in table order.
pub fn latest_metrics(table: &[EnrichedObservation], series_name: &str) -> Option<LatestSnapshot> {
    table
        .iter()
        .filter(|r| r.observation.series_name == series_name)
        .max_by_key(|r| r.observation.date)
        .map(LatestSnapshot::from)
}

/// Rows of one series (exact name match), in date order.
pub fn series_slice<'a>(table: &'a [EnrichedObservation], series_name: &str) -> Vec<&'a EnrichedObservation> {
    let mut rows: Vec<&EnrichedObservation> = table
        .iter()
        .filter(|r| r.observation.series_name == series_name)
        .collect();
    rows.sort_by_key(|r| r.observation.date);
    rows
}

/// Distinct series names in order of first appearance.
pub fn series_names(table: &[EnrichedObservation]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for row in table {
        let name = row.observation.series_name.as_str();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}
