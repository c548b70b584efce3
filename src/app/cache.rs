//! Time-based cache around the refresh pipeline.
//!
//! The pipeline itself keeps no state between calls; this cache lives at the
//! caller (the TUI) and limits how often upstream is hit.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app::pipeline::RunOutput;
use crate::domain::YearWindow;

/// One hour.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

struct CacheEntry {
    window: YearWindow,
    refreshed_at: Instant,
    output: Arc<RunOutput>,
}

pub struct RefreshCache {
    ttl: Duration,
    entry: Option<CacheEntry>,
}

impl RefreshCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// Cached output for `window` if younger than the TTL, otherwise run
    /// `refresh` and cache its result.
    ///
    /// Empty outputs are returned but never cached, so the next call retries.
    pub fn get_or_refresh<F>(&mut self, window: YearWindow, now: Instant, refresh: F) -> Arc<RunOutput>
    where
        F: FnOnce() -> RunOutput,
    {
        if let Some(entry) = &self.entry {
            let age = now.saturating_duration_since(entry.refreshed_at);
            if entry.window == window && age < self.ttl {
                tracing::debug!(age_secs = age.as_secs(), "Cache hit");
                return Arc::clone(&entry.output);
            }
            tracing::debug!(age_secs = age.as_secs(), ttl_secs = self.ttl.as_secs(), "Cache expired");
        }

        let output = Arc::new(refresh());
        if output.is_empty() {
            self.entry = None;
        } else {
            self.entry = Some(CacheEntry {
                window,
                refreshed_at: now,
                output: Arc::clone(&output),
            });
        }
        output
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Age of the cached output, if any.
    pub fn age(&self, now: Instant) -> Option<Duration> {
        self.entry
            .as_ref()
            .map(|e| now.saturating_duration_since(e.refreshed_at))
    }
}

impl Default for RefreshCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use chrono::{Local, NaiveDate};

    use super::*;
    use crate::domain::{EnrichedObservation, Observation};

    fn output(window: YearWindow, rows: usize) -> RunOutput {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let row = EnrichedObservation {
            observation: Observation {
                series_id: "LNS14000000".to_string(),
                series_name: "Unemployment Rate".to_string(),
                date,
                value: 3.7,
                year: 2024,
                month: 1,
            },
            mom_change: None,
            mom_pct_change: None,
            yoy_pct_change: None,
        };
        RunOutput {
            window,
            source: "test".to_string(),
            fetched_at: Local::now(),
            n_observations: rows,
            table: vec![row; rows],
            failure: None,
        }
    }

    #[test]
    fn reuses_output_within_ttl() {
        let window = YearWindow { start_year: 2020, end_year: 2024 };
        let mut cache = RefreshCache::new(Duration::from_secs(60));
        let calls = Cell::new(0);
        let t0 = Instant::now();

        cache.get_or_refresh(window, t0, || {
            calls.set(calls.get() + 1);
            output(window, 1)
        });
        cache.get_or_refresh(window, t0 + Duration::from_secs(59), || {
            calls.set(calls.get() + 1);
            output(window, 1)
        });
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.age(t0 + Duration::from_secs(10)), Some(Duration::from_secs(10)));

        cache.get_or_refresh(window, t0 + Duration::from_secs(61), || {
            calls.set(calls.get() + 1);
            output(window, 1)
        });
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn window_change_and_invalidate_force_refresh() {
        let a = YearWindow { start_year: 2020, end_year: 2024 };
        let b = YearWindow { start_year: 2015, end_year: 2024 };
        let mut cache = RefreshCache::default();
        let calls = Cell::new(0);
        let t0 = Instant::now();
        let refresh = |w: YearWindow| {
            calls.set(calls.get() + 1);
            output(w, 2)
        };

        cache.get_or_refresh(a, t0, || refresh(a));
        cache.get_or_refresh(b, t0, || refresh(b));
        assert_eq!(calls.get(), 2);

        cache.invalidate();
        assert!(cache.age(t0).is_none());
        cache.get_or_refresh(b, t0, || refresh(b));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn empty_output_is_not_cached() {
        let window = YearWindow { start_year: 2020, end_year: 2024 };
        let mut cache = RefreshCache::default();
        let t0 = Instant::now();

        let first = cache.get_or_refresh(window, t0, || output(window, 0));
        assert!(first.is_empty());
        assert!(cache.age(t0).is_none());

        let second = cache.get_or_refresh(window, t0, || output(window, 3));
        assert_eq!(second.table.len(), 3);
    }
}
