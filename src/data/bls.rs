//! BLS public timeseries API integration.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::data::SeriesSource;
use crate::domain::{Observation, SeriesCatalog, YearWindow};
use crate::error::AppError;

const DEFAULT_API_URL: &str = "https://api.bls.gov/publicAPI/v1/timeseries/data/";
const STATUS_SUCCEEDED: &str = "REQUEST_SUCCEEDED";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a fetch produced no table.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("request failed with status {0}")]
    Status(StatusCode),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("response has no Results.series array")]
    Shape,
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },
}

pub struct BlsClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    catalog: SeriesCatalog,
}

impl BlsClient {
    pub fn new(
        catalog: SeriesCatalog,
        api_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key,
            catalog,
        })
    }

    /// Build a client from `.env` / environment.
    ///
    /// `BLS_API_URL` overrides the endpoint; `BLS_API_KEY` is sent as the
    /// registration key when present. Neither is required.
    pub fn from_env(catalog: SeriesCatalog, timeout: Duration) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_url = std::env::var("BLS_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_key = std::env::var("BLS_API_KEY").ok().filter(|v| !v.trim().is_empty());
        Self::new(catalog, api_url, api_key, timeout)
    }

    fn request_body(&self, window: YearWindow) -> RequestBody {
        RequestBody {
            seriesid: self.catalog.ids(),
            startyear: window.start_year.to_string(),
            endyear: window.end_year.to_string(),
            registrationkey: self.api_key.clone(),
        }
    }
}

impl SeriesSource for BlsClient {
    fn fetch_observations(&self, window: YearWindow) -> Result<Vec<Observation>, FetchError> {
        let body = self.request_body(window);
        tracing::info!(
            url = %self.api_url,
            series = body.seriesid.len(),
            %window,
            "Requesting BLS series"
        );

        let resp = self.client.post(&self.api_url).json(&body).send()?;

        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status()));
        }

        let text = resp.text()?;
        let rows = parse_response(&text, &self.catalog)?;
        tracing::info!(rows = rows.len(), "Parsed BLS response");
        Ok(rows)
    }

    fn describe(&self) -> String {
        self.api_url.clone()
    }
}

#[derive(Debug, Serialize)]
struct RequestBody {
    seriesid: Vec<String>,
    startyear: String,
    endyear: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    registrationkey: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SeriesBlock {
    #[serde(rename = "seriesID")]
    series_id: String,
    #[serde(default)]
    data: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct DataItem {
    year: String,
    period: String,
    value: String,
}

/// Parse a raw BLS response body into the normalized observation table.
///
/// A non-success `status` is logged and parsing continues over whatever
/// series are present. Rows are sorted by (series name, date) and
/// deduplicated on that key, keeping the first occurrence.
pub fn parse_response(body: &str, catalog: &SeriesCatalog) -> Result<Vec<Observation>, FetchError> {
    let root: Value = serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    let status = root.get("status").and_then(Value::as_str).unwrap_or("");
    if status != STATUS_SUCCEEDED {
        tracing::warn!(
            status,
            messages = ?upstream_messages(&root),
            "BLS returned a non-success status; parsing whatever is present"
        );
    }

    let series = root
        .get("Results")
        .and_then(|r| r.get("series"))
        .and_then(Value::as_array)
        .ok_or(FetchError::Shape)?;

    let mut out = Vec::new();
    let mut dropped = 0usize;
    for entry in series {
        let block = match SeriesBlock::deserialize(entry) {
            Ok(block) => block,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed series entry");
                continue;
            }
        };
        let series_name = catalog.display_name(&block.series_id).to_string();

        for item in &block.data {
            match observation_from_item(&block.series_id, &series_name, item) {
                Some(obs) => out.push(obs),
                None => dropped += 1,
            }
        }
    }

    if dropped > 0 {
        tracing::debug!(dropped, "Dropped non-monthly or unparseable observations");
    }

    sort_and_dedup(&mut out);
    Ok(out)
}

fn observation_from_item(series_id: &str, series_name: &str, item: &Value) -> Option<Observation> {
    let item = DataItem::deserialize(item).ok()?;
    let month = parse_period(&item.period)?;
    let year = item.year.trim().parse::<i32>().ok()?;
    let date = month_start(year, month)?;
    let value = parse_value(&item.value)?;
    Some(Observation {
        series_id: series_id.to_string(),
        series_name: series_name.to_string(),
        date,
        value,
        year,
        month,
    })
}

/// Month number for a monthly period code (`M01`..`M12`); `None` for annual
/// averages (`M13`) and every other code.
pub fn parse_period(code: &str) -> Option<u32> {
    let digits = code.strip_prefix('M')?;
    if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month = digits.parse::<u32>().ok()?;
    (1..=12).contains(&month).then_some(month)
}

pub fn month_start(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() {
        Some(v)
    } else {
        None
    }
}

fn upstream_messages(root: &Value) -> Vec<String> {
    match root.get("message") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn sort_and_dedup(rows: &mut Vec<Observation>) {
    rows.sort_by(|a, b| a.series_name.cmp(&b.series_name).then(a.date.cmp(&b.date)));
    rows.dedup_by(|later, earlier| later.series_name == earlier.series_name && later.date == earlier.date);
}
