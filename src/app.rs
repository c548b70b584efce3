//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - runs the fetch -> transform pipeline
//! - prints cards/tables/plots
//! - writes optional exports

use std::time::Duration;

use chrono::Local;
use clap::Parser;

use crate::cli::{Command, FetchArgs, LatestArgs, PlotArgs, SourceArgs};
use crate::domain::{DashConfig, SeriesCatalog, YearWindow};
use crate::error::{AppError, DATA_UNAVAILABLE};
use crate::logging::LogTarget;
use crate::report::CardStyle;

pub mod cache;
pub mod pipeline;

use pipeline::RunOutput;

/// Entry point for the `econ` binary.
pub fn run() -> Result<(), AppError> {
    // `econ` and `econ --start-year 2015` behave like `econ tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let target = if matches!(cli.command, Command::Tui(_)) {
        LogTarget::Discard
    } else {
        LogTarget::Stderr
    };
    crate::logging::init(target, cli.log_file.as_deref())?;

    match cli.command {
        Command::Fetch(args) => handle_fetch(args),
        Command::Latest(args) => handle_latest(args),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => handle_tui(args),
    }
}

pub fn dash_config_from_args(args: &SourceArgs) -> Result<DashConfig, AppError> {
    let window = YearWindow::resolve(args.start_year, args.end_year, Local::now().date_naive())?;
    Ok(DashConfig {
        window,
        catalog_path: args.catalog.clone(),
        response_file: args.response_file.clone(),
        timeout: Duration::from_secs(args.timeout_secs.max(1)),
        cache_ttl: Duration::from_secs(args.cache_ttl_secs),
    })
}

/// Fetch + transform once; a fetch error or an empty table is reported as
/// "data unavailable", with the reason when there is one.
fn refresh_or_fail(config: &DashConfig) -> Result<(RunOutput, SeriesCatalog), AppError> {
    let catalog = pipeline::load_catalog(config)?;
    let source = pipeline::build_source(config, catalog.clone())?;
    let run = pipeline::try_refresh(source.as_ref(), config.window)?;
    if run.is_empty() {
        return Err(AppError::data(DATA_UNAVAILABLE));
    }
    Ok((run, catalog))
}

fn handle_fetch(args: FetchArgs) -> Result<(), AppError> {
    let config = dash_config_from_args(&args.source)?;
    let (run, catalog) = refresh_or_fail(&config)?;

    println!("{}", crate::report::format_run_header(&run));
    let cards = crate::report::metric_cards(&run, &catalog);
    println!("{}", crate::report::format_cards(&cards));

    if args.rows > 0 {
        println!("{}", crate::report::format_table(&run.table, args.rows));
    }

    // Optional exports.
    if let Some(path) = &args.export {
        crate::io::write_table_csv(path, &run.table)?;
        tracing::info!(path = %path.display(), rows = run.table.len(), "Wrote CSV export");
    }
    if let Some(path) = &args.export_json {
        crate::io::write_table_json(path, &run)?;
        tracing::info!(path = %path.display(), rows = run.table.len(), "Wrote table JSON");
    }

    Ok(())
}

fn handle_latest(args: LatestArgs) -> Result<(), AppError> {
    let config = dash_config_from_args(&args.source)?;
    let (run, catalog) = refresh_or_fail(&config)?;

    let snapshots = match &args.series {
        Some(name) => {
            let snapshot = run
                .latest(name)
                .ok_or_else(|| AppError::data(format!("No data for series '{name}'.")))?;
            vec![snapshot]
        }
        None => crate::report::metric_cards(&run, &catalog)
            .iter()
            .filter_map(|card| run.latest(&card.label))
            .collect(),
    };

    for snapshot in snapshots {
        let style = CardStyle::for_series(&snapshot.series_id);
        println!("{}", snapshot.series_name);
        for line in style.detail_lines(&snapshot) {
            println!("  {line}");
        }
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let run = match &args.table {
        Some(path) => crate::io::read_table_json(path)?.into_run(),
        None => {
            let config = dash_config_from_args(&args.source)?;
            refresh_or_fail(&config)?.0
        }
    };

    let rows = crate::transform::series_slice(&run.table, &args.series);
    if rows.is_empty() {
        return Err(AppError::data(format!(
            "No rows for series '{}'. Available: {}",
            args.series,
            run.series_names().join(", ")
        )));
    }

    let plot = crate::plot::render_series_plot(&args.series, &rows, args.column, args.width, args.height);
    println!("{plot}");
    Ok(())
}

fn handle_tui(args: SourceArgs) -> Result<(), AppError> {
    let config = dash_config_from_args(&args)?;
    crate::tui::run(config)
}

/// Rewrite argv so `econ` defaults to `econ tui`.
///
/// Rules:
/// - `econ`                        -> `econ tui`
/// - `econ --start-year 2015 ...`  -> `econ tui --start-year 2015 ...`
/// - `econ --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fetch" | "latest" | "plot" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_launches_tui() {
        assert_eq!(rewrite_args(argv(&["econ"])), argv(&["econ", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["econ", "--start-year", "2015"])),
            argv(&["econ", "tui", "--start-year", "2015"])
        );
    }

    #[test]
    fn explicit_subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["econ", "fetch"])), argv(&["econ", "fetch"]));
        assert_eq!(rewrite_args(argv(&["econ", "--help"])), argv(&["econ", "--help"]));
    }

    #[test]
    fn cli_parses_fetch_window() {
        let cli = crate::cli::Cli::parse_from(argv(&[
            "econ", "fetch", "--start-year", "2018", "--end-year", "2020", "--rows", "5",
        ]));
        let Command::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        let config = dash_config_from_args(&args.source).unwrap();
        assert_eq!(config.window, YearWindow { start_year: 2018, end_year: 2020 });
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(args.rows, 5);
    }
}
