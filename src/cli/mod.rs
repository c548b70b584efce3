//! Command-line parsing for the BLS labor-market dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fetch/transform pipeline.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::ChangeColumn;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "econ", version, about = "US labor-market dashboard (BLS-based)")]
pub struct Cli {
    /// Write logs to this file (the TUI discards logs otherwise).
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch all catalog series, print metric cards, and optionally export the table.
    Fetch(FetchArgs),
    /// Print the latest snapshot for every series (or one series).
    Latest(LatestArgs),
    /// Render an ASCII trend chart for one series.
    Plot(PlotArgs),
    /// Launch the interactive dashboard.
    Tui(SourceArgs),
}

/// Where the data comes from and which window to request.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// First year of the window (default: current year - 9).
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Last year of the window (default: current year).
    #[arg(long)]
    pub end_year: Option<i32>,

    /// JSON catalog of series to request: `[{"id": "...", "name": "..."}]`.
    #[arg(long, value_name = "JSON")]
    pub catalog: Option<PathBuf>,

    /// Replay a saved BLS response instead of calling the API.
    #[arg(long, value_name = "JSON")]
    pub response_file: Option<PathBuf>,

    /// HTTP request timeout in seconds.
    #[arg(long, default_value_t = crate::data::bls::DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Minimum seconds between upstream refreshes in the TUI.
    #[arg(long, default_value_t = crate::app::cache::DEFAULT_TTL.as_secs())]
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print the newest N rows of the raw table (0 = none).
    #[arg(long, default_value_t = 0)]
    pub rows: usize,

    /// Export the enriched table to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the enriched table to JSON (readable by `econ plot --table`).
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct LatestArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Exact series name (default: every catalog series).
    #[arg(long)]
    pub series: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Exact series name to chart.
    #[arg(long)]
    pub series: String,

    /// Column to chart.
    #[arg(long, value_enum, default_value_t = ChangeColumn::Value)]
    pub column: ChangeColumn,

    /// Table JSON produced by `econ fetch --export-json` (skips fetching).
    #[arg(long, value_name = "JSON")]
    pub table: Option<PathBuf>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}
