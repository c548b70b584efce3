//! Ratatui-based terminal dashboard.
//!
//! Metric cards for every series on top, then one tab per series (chart and
//! notes) plus a raw-data tab. The dashboard only reads the enriched table;
//! refreshes go through `RefreshCache` so upstream is hit at most once per TTL.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap},
    Terminal,
};

use crate::app::cache::RefreshCache;
use crate::app::pipeline::{self, RunOutput};
use crate::data::SeriesSource;
use crate::domain::{ChangeColumn, DashConfig, SeriesCatalog};
use crate::error::AppError;
use crate::report::{CardStyle, MetricCard, fmt_num, metric_cards};

mod plotters_chart;

use plotters_chart::{ChartBounds, ChartKind, SeriesChart};

/// Feb-Apr 2020 (NBER), shaded on level charts.
const RECESSION: [(i32, u32); 2] = [(2020, 2), (2020, 4)];

/// Start the TUI.
pub fn run(config: DashConfig) -> Result<(), AppError> {
    let catalog = pipeline::load_catalog(&config)?;
    let source = pipeline::build_source(&config, catalog.clone())?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, catalog, source);
    terminal
        .draw(|f| app.draw(f))
        .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
    app.refresh(false);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// One dashboard tab: a series view or the raw table.
#[derive(Debug, Clone, PartialEq)]
struct DashTab {
    title: String,
    series: Option<(String, CardStyle)>,
}

struct App {
    config: DashConfig,
    catalog: SeriesCatalog,
    source: Box<dyn SeriesSource>,
    cache: RefreshCache,
    run: Option<Arc<RunOutput>>,
    tab: usize,
    raw_offset: usize,
    status: String,
}

impl App {
    fn new(config: DashConfig, catalog: SeriesCatalog, source: Box<dyn SeriesSource>) -> Self {
        let cache = RefreshCache::new(config.cache_ttl);
        Self {
            config,
            catalog,
            source,
            cache,
            run: None,
            tab: 0,
            raw_offset: 0,
            status: "Fetching latest data from BLS...".to_string(),
        }
    }

    fn refresh(&mut self, force: bool) {
        if force {
            self.cache.invalidate();
        }
        let window = self.config.window;
        let now = Instant::now();
        let was_cached = self.cache.age(now).is_some();

        let source = self.source.as_ref();
        let run = self
            .cache
            .get_or_refresh(window, now, || pipeline::run_refresh(source, window));

        self.status = if let Some(reason) = &run.failure {
            format!("Failed to load data: {reason}. Press r to retry.")
        } else if run.is_empty() {
            "Failed to load data: no observations returned. Press r to retry.".to_string()
        } else if was_cached {
            format!(
                "Using cached data from {} (refreshes at most every {} min).",
                run.fetched_at.format("%H:%M"),
                self.config.cache_ttl.as_secs() / 60
            )
        } else {
            format!("Loaded {} rows at {}.", run.table.len(), run.fetched_at.format("%H:%M:%S"))
        };
        self.raw_offset = 0;
        self.run = Some(run);
        self.tab = self.tab.min(self.tabs().len() - 1);
    }

    fn tabs(&self) -> Vec<DashTab> {
        let mut tabs: Vec<DashTab> = self
            .catalog
            .entries()
            .iter()
            .map(|e| {
                let style = CardStyle::for_series(&e.id);
                DashTab {
                    title: style.tab_title().unwrap_or(e.name.as_str()).to_string(),
                    series: Some((e.name.clone(), style)),
                }
            })
            .collect();
        tabs.sort_by_key(|t| t.series.as_ref().map_or(usize::MAX, |(_, style)| tab_rank(*style)));

        // Series outside the catalog still get a card, so they get a tab too.
        if let Some(run) = &self.run {
            for name in run.series_names() {
                if self.catalog.entries().iter().any(|e| e.name == name) {
                    continue;
                }
                let style = run
                    .latest(name)
                    .map_or(CardStyle::Generic, |s| CardStyle::for_series(&s.series_id));
                tabs.push(DashTab {
                    title: name.to_string(),
                    series: Some((name.to_string(), style)),
                });
            }
        }
        tabs.push(DashTab {
            title: "Raw data".to_string(),
            series: None,
        });
        tabs
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code, terminal)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key<B: ratatui::backend::Backend>(
        &mut self,
        code: KeyCode,
        terminal: &mut Terminal<B>,
    ) -> Result<bool, AppError> {
        let n_tabs = self.tabs().len();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Right | KeyCode::Tab => {
                self.tab = (self.tab + 1) % n_tabs;
                self.raw_offset = 0;
            }
            KeyCode::Left | KeyCode::BackTab => {
                self.tab = (self.tab + n_tabs - 1) % n_tabs;
                self.raw_offset = 0;
            }
            KeyCode::Char(c @ '1'..='9') => {
                let idx = (c as usize) - ('1' as usize);
                if idx < n_tabs {
                    self.tab = idx;
                    self.raw_offset = 0;
                }
            }
            KeyCode::Down => self.raw_offset = self.raw_offset.saturating_add(1),
            KeyCode::Up => self.raw_offset = self.raw_offset.saturating_sub(1),
            KeyCode::PageDown => self.raw_offset = self.raw_offset.saturating_add(20),
            KeyCode::PageUp => self.raw_offset = self.raw_offset.saturating_sub(20),
            KeyCode::Char(c @ ('r' | 'R')) => {
                self.status = "Fetching latest data from BLS...".to_string();
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                self.refresh(c == 'R');
            }
            _ => {}
        }
        Ok(false)
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(5),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_cards(frame, chunks[1]);
        self.draw_tabs(frame, chunks[2]);
        self.draw_body(frame, chunks[3]);
        self.draw_footer(frame, chunks[4]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let details = match &self.run {
            Some(run) => format!(
                " | window {} | {} rows | as of {}",
                run.window,
                run.table.len(),
                run.fetched_at.format("%Y-%m-%d %H:%M")
            ),
            None => format!(" | window {}", self.config.window),
        };
        let line = Line::from(vec![
            Span::styled("econ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" - US Economic Dashboard (Bureau of Labor Statistics)"),
            Span::styled(details, Style::default().fg(Color::Gray)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_cards(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cards: Vec<MetricCard> = match &self.run {
            Some(run) => metric_cards(run, &self.catalog),
            None => Vec::new(),
        };
        if cards.is_empty() {
            let p = Paragraph::new("No metrics available.")
                .style(Style::default().fg(Color::Gray))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(p, area);
            return;
        }

        let n = cards.len() as u32;
        let constraints: Vec<Constraint> = (0..n).map(|_| Constraint::Ratio(1, n)).collect();
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        for (card, rect) in cards.iter().zip(cols.iter()) {
            let delta_style = match card.delta.as_deref() {
                Some(d) if d.starts_with('-') => Style::default().fg(Color::Red),
                Some(_) => Style::default().fg(Color::Green),
                None => Style::default().fg(Color::Gray),
            };
            let lines = vec![
                Line::from(Span::styled(
                    card.value.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(card.delta.clone().unwrap_or_else(|| "-".to_string()), delta_style)),
            ];
            let p = Paragraph::new(Text::from(lines))
                .block(Block::default().title(card.label.clone()).borders(Borders::ALL));
            frame.render_widget(p, *rect);
        }
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let titles: Vec<Line> = self.tabs().into_iter().map(|t| Line::from(t.title)).collect();
        let tabs = Tabs::new(titles)
            .select(self.tab)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_widget(tabs, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let run = match &self.run {
            Some(run) if !run.is_empty() => run,
            Some(run) => {
                let reason = run.failure.as_deref().unwrap_or("no observations returned");
                let msg = Paragraph::new(vec![
                    Line::from(crate::error::DATA_UNAVAILABLE),
                    Line::from(format!("Reason: {reason}")),
                    Line::from("Press r to retry."),
                ])
                .wrap(Wrap { trim: true })
                .style(Style::default().fg(Color::Red))
                .block(Block::default().title("Data unavailable").borders(Borders::ALL));
                frame.render_widget(msg, area);
                return;
            }
            None => {
                let msg = Paragraph::new("Waiting for data...")
                    .style(Style::default().fg(Color::Yellow))
                    .block(Block::default().borders(Borders::ALL));
                frame.render_widget(msg, area);
                return;
            }
        };

        let tabs = self.tabs();
        let tab = &tabs[self.tab.min(tabs.len() - 1)];
        match &tab.series {
            Some((name, style)) => self.draw_series_tab(frame, area, run, name, *style),
            None => self.draw_raw_table(frame, area, run),
        }
    }

    fn draw_series_tab(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: &RunOutput, name: &str, style: CardStyle) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(67), Constraint::Percentage(33)])
            .split(area);

        let column = style.chart_column();
        let block = Block::default()
            .title(format!("{} ({})", style.chart_title(), name))
            .borders(Borders::ALL);
        let inner = block.inner(chunks[0]);
        frame.render_widget(block, chunks[0]);
        frame.render_widget(Clear, inner);

        match chart_series(run, name, column) {
            Some((points, bounds)) => {
                let widget = SeriesChart {
                    points: &points,
                    kind: if column.is_bar() { ChartKind::Bars } else { ChartKind::Line },
                    bounds,
                    shade: (column == ChangeColumn::Value).then(recession_span).flatten(),
                    y_desc: style.y_label(),
                };
                frame.render_widget(widget, inner);
            }
            None => {
                let msg = Paragraph::new(format!("No {} data for this series.", column.label()))
                    .style(Style::default().fg(Color::Yellow));
                frame.render_widget(msg, inner);
            }
        }

        let mut lines: Vec<Line> = style.blurb().iter().map(|s| Line::from(*s)).collect();
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        match run.latest(name) {
            Some(snapshot) => {
                for detail in style.detail_lines(&snapshot) {
                    lines.push(Line::from(Span::styled(detail, Style::default().add_modifier(Modifier::BOLD))));
                }
            }
            None => lines.push(Line::from(Span::styled(
                "No data for this series.",
                Style::default().fg(Color::Yellow),
            ))),
        }
        let info = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .block(Block::default().title("About").borders(Borders::ALL));
        frame.render_widget(info, chunks[1]);
    }

    fn draw_raw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: &RunOutput) {
        let mut rows: Vec<_> = run.table.iter().collect();
        rows.sort_by(|a, b| {
            b.observation
                .date
                .cmp(&a.observation.date)
                .then_with(|| a.observation.series_name.cmp(&b.observation.series_name))
        });

        let visible = area.height.saturating_sub(3) as usize;
        let offset = self.raw_offset.min(rows.len().saturating_sub(1));
        let body: Vec<Row> = rows
            .iter()
            .skip(offset)
            .take(visible)
            .map(|r| {
                Row::new(vec![
                    Cell::from(r.observation.date.to_string()),
                    Cell::from(r.observation.series_name.clone()),
                    Cell::from(format!("{:.3}", r.observation.value)),
                    Cell::from(fmt_num(r.mom_change, 3)),
                    Cell::from(fmt_num(r.mom_pct_change, 2)),
                    Cell::from(fmt_num(r.yoy_pct_change, 2)),
                ])
            })
            .collect();

        let header = Row::new(vec!["Date", "Series", "Value", "MoM", "MoM %", "YoY %"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        let widths = [
            Constraint::Length(10),
            Constraint::Min(24),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(8),
        ];
        let table = Table::new(body, widths).header(header).block(
            Block::default()
                .title(format!("Raw data ({} rows, from {})", rows.len(), offset + 1))
                .borders(Borders::ALL),
        );
        frame.render_widget(table, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ tab  ↑/↓ scroll  r refresh  R force  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Headline tabs first, in dashboard order; other series keep catalog order.
fn tab_rank(style: CardStyle) -> usize {
    match style {
        CardStyle::Rate => 0,
        CardStyle::Index => 1,
        CardStyle::Thousands => 2,
        CardStyle::Dollars => 3,
        CardStyle::Generic => 4,
    }
}

/// Points and bounds for one series column, or `None` if nothing is defined.
fn chart_series(run: &RunOutput, name: &str, column: ChangeColumn) -> Option<(Vec<(f64, f64)>, ChartBounds)> {
    let points: Vec<(f64, f64)> = crate::transform::series_slice(&run.table, name)
        .into_iter()
        .filter_map(|r| column.get(r).map(|v| (fractional_year(r.observation.date), v)))
        .collect();
    let (first, last) = (points.first()?, points.last()?);

    let x = if last.0 > first.0 {
        (first.0, last.0)
    } else {
        (first.0 - 0.5, last.0 + 0.5)
    };

    let zero = if column.is_bar() { Some(0.0) } else { None };
    let (mut y_min, mut y_max) = points
        .iter()
        .map(|&(_, y)| y)
        .chain(zero)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)));
    if y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }
    let pad = ((y_max - y_min) * 0.05).max(1e-12);

    Some((points, ChartBounds { x, y: (y_min - pad, y_max + pad) }))
}

fn fractional_year(d: NaiveDate) -> f64 {
    d.year() as f64 + d.month0() as f64 / 12.0
}

fn recession_span() -> Option<(f64, f64)> {
    let [(y0, m0), (y1, m1)] = RECESSION;
    let start = NaiveDate::from_ymd_opt(y0, m0, 1)?;
    let end = NaiveDate::from_ymd_opt(y1, m1, 1)?;
    Some((fractional_year(start), fractional_year(end)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use crate::domain::{EnrichedObservation, Observation, YearWindow};

    fn run_with(values: &[(u32, f64, Option<f64>)]) -> RunOutput {
        let table = values
            .iter()
            .map(|&(month, value, mom)| EnrichedObservation {
                observation: Observation {
                    series_id: "CES0000000001".to_string(),
                    series_name: "Total Nonfarm Employment".to_string(),
                    date: NaiveDate::from_ymd_opt(2024, month, 1).unwrap(),
                    value,
                    year: 2024,
                    month,
                },
                mom_change: mom,
                mom_pct_change: None,
                yoy_pct_change: None,
            })
            .collect::<Vec<_>>();
        RunOutput {
            window: YearWindow { start_year: 2024, end_year: 2024 },
            source: "test".to_string(),
            fetched_at: Local::now(),
            n_observations: table.len(),
            table,
            failure: None,
        }
    }

    #[test]
    fn bar_bounds_include_zero() {
        let run = run_with(&[(1, 158_000.0, None), (2, 158_300.0, Some(300.0)), (3, 158_450.0, Some(150.0))]);
        let (points, bounds) = chart_series(&run, "Total Nonfarm Employment", ChangeColumn::Mom).unwrap();
        assert_eq!(points.len(), 2);
        assert!((bounds.x.0 - (2024.0 + 1.0 / 12.0)).abs() < 1e-9);
        assert!(bounds.y.0 < 0.0 && bounds.y.1 > 300.0);
    }

    #[test]
    fn undefined_column_has_no_chart() {
        let run = run_with(&[(1, 158_000.0, None)]);
        assert!(chart_series(&run, "Total Nonfarm Employment", ChangeColumn::Yoy).is_none());
        assert!(chart_series(&run, "Unknown", ChangeColumn::Value).is_none());
    }

    fn offline_app() -> App {
        let config = DashConfig {
            window: YearWindow { start_year: 2024, end_year: 2024 },
            catalog_path: None,
            response_file: None,
            timeout: Duration::from_secs(1),
            cache_ttl: Duration::from_secs(60),
        };
        let catalog = SeriesCatalog::builtin().clone();
        let source = crate::data::ResponseFileSource::new("/nonexistent/response.json".into(), catalog.clone());
        App::new(config, catalog, Box::new(source))
    }

    #[test]
    fn tabs_follow_dashboard_order() {
        let app = offline_app();
        let titles: Vec<String> = app.tabs().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, ["Unemployment", "Inflation (CPI)", "Jobs", "Earnings", "Raw data"]);
    }

    #[test]
    fn series_outside_catalog_get_a_tab() {
        let mut app = offline_app();
        let mut run = run_with(&[(1, 10.0, None)]);
        for row in &mut run.table {
            row.observation.series_id = "XYZ123".to_string();
            row.observation.series_name = "XYZ123".to_string();
        }
        app.run = Some(Arc::new(run));

        let tabs = app.tabs();
        assert_eq!(tabs.len(), 6);
        assert_eq!(tabs[4].title, "XYZ123");
        assert_eq!(tabs[4].series, Some(("XYZ123".to_string(), CardStyle::Generic)));
        assert_eq!(tabs[5].title, "Raw data");
    }

    #[test]
    fn failed_refresh_shows_reason() {
        let mut app = offline_app();
        app.refresh(false);

        let run = app.run.as_ref().unwrap();
        assert!(run.is_empty());
        let reason = run.failure.as_deref().unwrap();
        assert!(reason.contains("/nonexistent/response.json"));
        assert!(app.status.contains(reason));
        assert!(app.status.contains("Press r to retry"));
    }

    #[test]
    fn recession_span_is_early_2020() {
        let (s0, s1) = recession_span().unwrap();
        assert!((s0 - (2020.0 + 1.0 / 12.0)).abs() < 1e-9);
        assert!((s1 - (2020.0 + 3.0 / 12.0)).abs() < 1e-9);
    }
}
