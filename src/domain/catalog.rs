//! Series catalog: which BLS series we request and how they are labelled.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const UNEMPLOYMENT_RATE: &str = "LNS14000000";
pub const TOTAL_NONFARM: &str = "CES0000000001";
pub const AVG_HOURLY_EARNINGS: &str = "CES0500000003";
pub const CPI_SA: &str = "CUSR0000SA0";

const BUILTIN_SERIES: [(&str, &str); 4] = [
    (UNEMPLOYMENT_RATE, "Unemployment Rate"),
    (TOTAL_NONFARM, "Total Nonfarm Employment"),
    (AVG_HOURLY_EARNINGS, "Average Hourly Earnings"),
    (CPI_SA, "CPI (Seasonally Adjusted)"),
];

static BUILTIN: LazyLock<SeriesCatalog> = LazyLock::new(|| SeriesCatalog {
    entries: BUILTIN_SERIES
        .iter()
        .map(|&(id, name)| SeriesEntry {
            id: id.to_string(),
            name: name.to_string(),
        })
        .collect(),
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesEntry {
    pub id: String,
    pub name: String,
}

/// Ordered, read-only mapping from series id to display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesCatalog {
    entries: Vec<SeriesEntry>,
}

impl SeriesCatalog {
    /// The catalog used when no `--catalog` file is given.
    pub fn builtin() -> &'static SeriesCatalog {
        &BUILTIN
    }

    pub fn new(entries: Vec<SeriesEntry>) -> Result<Self, AppError> {
        if entries.is_empty() {
            return Err(AppError::config("Series catalog is empty."));
        }
        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.id.trim().is_empty() || entry.name.trim().is_empty() {
                return Err(AppError::config("Series catalog entries need a non-empty id and name."));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(AppError::config(format!("Duplicate series id '{}' in catalog.", entry.id)));
            }
        }
        Ok(Self { entries })
    }

    /// Parse a catalog from JSON: `[{"id": "...", "name": "..."}, ...]`.
    pub fn from_json_str(raw: &str) -> Result<Self, AppError> {
        let entries: Vec<SeriesEntry> =
            serde_json::from_str(raw).map_err(|e| AppError::config(format!("Invalid catalog JSON: {e}")))?;
        Self::new(entries)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path)
            .map_err(|e| AppError::config(format!("Failed to open catalog '{}': {e}", path.display())))?;
        let entries: Vec<SeriesEntry> = serde_json::from_reader(file)
            .map_err(|e| AppError::config(format!("Invalid catalog JSON '{}': {e}", path.display())))?;
        Self::new(entries)
    }

    pub fn entries(&self) -> &[SeriesEntry] {
        &self.entries
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }

    pub fn name_for(&self, id: &str) -> Option<&str> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.name.as_str())
    }

    /// Display name for `id`, falling back to the raw id for unknown series.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.name_for(id).unwrap_or(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
