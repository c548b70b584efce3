//! Formatted terminal output: metric cards, series details, raw table.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - the CLI and the TUI show the same numbers the same way

use crate::app::pipeline::RunOutput;
use crate::domain::{
    AVG_HOURLY_EARNINGS, CPI_SA, ChangeColumn, EnrichedObservation, LatestSnapshot, SeriesCatalog, TOTAL_NONFARM,
    UNEMPLOYMENT_RATE,
};

/// How one series is displayed on cards, detail panes and charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardStyle {
    /// Percent level; delta in percentage points from MoM.
    Rate,
    /// Headcount in thousands; delta is MoM jobs added/lost.
    Thousands,
    /// Dollar level; delta is YoY %.
    Dollars,
    /// Price index; delta is YoY % (inflation).
    Index,
    /// Anything not in the reference catalog.
    Generic,
}

impl CardStyle {
    pub fn for_series(series_id: &str) -> Self {
        match series_id {
            UNEMPLOYMENT_RATE => CardStyle::Rate,
            TOTAL_NONFARM => CardStyle::Thousands,
            AVG_HOURLY_EARNINGS => CardStyle::Dollars,
            CPI_SA => CardStyle::Index,
            _ => CardStyle::Generic,
        }
    }

    pub fn format_value(self, v: f64) -> String {
        match self {
            CardStyle::Rate => format!("{v:.1}%"),
            CardStyle::Thousands => format!("{} k", group_thousands(v, false)),
            CardStyle::Dollars => format!("${v:.2}"),
            CardStyle::Index => format!("{v:.1}"),
            CardStyle::Generic => format!("{v:.2}"),
        }
    }

    /// Card delta, or `None` when the needed lag is undefined.
    pub fn format_delta(self, s: &LatestSnapshot) -> Option<String> {
        match self {
            CardStyle::Rate => s.mom_change.map(|d| format!("{d:+.1} pp")),
            CardStyle::Thousands => s.mom_change.map(|d| format!("{} k", group_thousands(d, true))),
            CardStyle::Dollars | CardStyle::Index => s.yoy_pct_change.map(|d| format!("{d:+.1}% (YoY)")),
            CardStyle::Generic => s.mom_change.map(|d| format!("{d:+.2}")),
        }
    }

    /// Column the series is usually charted by.
    pub fn chart_column(self) -> ChangeColumn {
        match self {
            CardStyle::Rate | CardStyle::Generic => ChangeColumn::Value,
            CardStyle::Thousands => ChangeColumn::Mom,
            CardStyle::Dollars | CardStyle::Index => ChangeColumn::Yoy,
        }
    }

    pub fn tab_title(self) -> Option<&'static str> {
        match self {
            CardStyle::Rate => Some("Unemployment"),
            CardStyle::Thousands => Some("Jobs"),
            CardStyle::Dollars => Some("Earnings"),
            CardStyle::Index => Some("Inflation (CPI)"),
            CardStyle::Generic => None,
        }
    }

    pub fn chart_title(self) -> &'static str {
        match self {
            CardStyle::Rate => "Unemployment Rate",
            CardStyle::Thousands => "Monthly Job Gains/Losses (Nonfarm Payrolls)",
            CardStyle::Dollars => "Wage Growth (YoY % Change in Avg Hourly Earnings)",
            CardStyle::Index => "Inflation Rate (CPI YoY % Change)",
            CardStyle::Generic => "Series level",
        }
    }

    pub fn y_label(self) -> &'static str {
        match self {
            CardStyle::Rate => "Rate (%)",
            CardStyle::Thousands => "Change (thousands)",
            CardStyle::Dollars | CardStyle::Index => "YoY change (%)",
            CardStyle::Generic => "value",
        }
    }

    /// Short explanatory text for the detail pane.
    pub fn blurb(self) -> &'static [&'static str] {
        match self {
            CardStyle::Rate => &[
                "Unemployed as a percentage of the labor force.",
                "A low rate generally indicates a tight labor market.",
                "Spikes usually correspond to recessions.",
            ],
            CardStyle::Thousands => &[
                "Payroll workers excluding proprietors, private household",
                "employees, unpaid volunteers, farm employees and the",
                "unincorporated self-employed. Positive bars are job growth.",
            ],
            CardStyle::Dollars => &[
                "Average hourly earnings of all employees on private",
                "nonfarm payrolls.",
            ],
            CardStyle::Index => &[
                "Consumer Price Index for all urban consumers.",
                "YoY change is the commonly cited inflation rate.",
                "The Federal Reserve targets 2% average inflation.",
            ],
            CardStyle::Generic => &[],
        }
    }

    /// Per-series detail lines (current value, change, as-of month).
    pub fn detail_lines(self, s: &LatestSnapshot) -> Vec<String> {
        let mut out = Vec::new();
        match self {
            CardStyle::Rate => {
                out.push(format!("Current Rate: {}", self.format_value(s.value)));
                out.push(format!("Change from last month: {}", fmt_opt(s.mom_change.map(|d| format!("{d:+.1} pp")))));
            }
            CardStyle::Index => {
                out.push(format!("Current Index: {}", self.format_value(s.value)));
                out.push(format!("Inflation Rate (YoY): {}", fmt_opt(s.yoy_pct_change.map(|d| format!("{d:.1}%")))));
            }
            CardStyle::Thousands => {
                out.push(format!("Total Employment: {}", self.format_value(s.value)));
                out.push(format!(
                    "Jobs Added/Lost (Last Month): {}",
                    fmt_opt(s.mom_change.map(|d| format!("{} k", group_thousands(d, true))))
                ));
            }
            CardStyle::Dollars => {
                out.push(format!("Avg Hourly Earnings: {}", self.format_value(s.value)));
                out.push(format!("Wage Growth (YoY): {}", fmt_opt(s.yoy_pct_change.map(|d| format!("{d:.1}%")))));
            }
            CardStyle::Generic => {
                out.push(format!("Latest: {}", self.format_value(s.value)));
                out.push(format!("MoM: {}", fmt_opt(s.mom_change.map(|d| format!("{d:+.2}")))));
                out.push(format!("YoY: {}", fmt_opt(s.yoy_pct_change.map(|d| format!("{d:+.1}%")))));
            }
        }
        out.push(format!("Data as of: {}", s.date.format("%B %Y")));
        out
    }
}

/// One rendered metric card.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricCard {
    pub label: String,
    pub value: String,
    pub delta: Option<String>,
    pub style: CardStyle,
}

/// Cards for every catalog series present in the run, in catalog order,
/// followed by any other series found in the table.
///
/// Series without rows produce no card.
pub fn metric_cards(run: &RunOutput, catalog: &SeriesCatalog) -> Vec<MetricCard> {
    let mut names: Vec<&str> = catalog.entries().iter().map(|e| e.name.as_str()).collect();
    for name in run.series_names() {
        if !names.contains(&name) {
            names.push(name);
        }
    }

    names
        .into_iter()
        .filter_map(|name| run.latest(name))
        .map(|s| {
            let style = CardStyle::for_series(&s.series_id);
            MetricCard {
                label: s.series_name.clone(),
                value: style.format_value(s.value),
                delta: style.format_delta(&s),
                style,
            }
        })
        .collect()
}

/// Header block for a run (window, source, size).
pub fn format_run_header(run: &RunOutput) -> String {
    let mut out = String::new();
    out.push_str("=== econ - US Labor Market (BLS) ===\n");
    out.push_str(&format!("Window: {} | Source: {}\n", run.window, run.source));
    out.push_str(&format!(
        "Fetched: {} | Observations: {} | Series: {}\n",
        run.fetched_at.format("%Y-%m-%d %H:%M:%S"),
        run.n_observations,
        run.series_names().len()
    ));
    out
}

/// Cards as aligned text lines.
pub fn format_cards(cards: &[MetricCard]) -> String {
    let label_w = cards.iter().map(|c| c.label.len()).max().unwrap_or(0);
    let value_w = cards.iter().map(|c| c.value.len()).max().unwrap_or(0);

    let mut out = String::new();
    for card in cards {
        out.push_str(&format!(
            "{:<label_w$}  {:>value_w$}  {}\n",
            card.label,
            card.value,
            card.delta.as_deref().unwrap_or("-"),
        ));
    }
    out
}

/// Raw-data table sorted by date descending, then series name ascending.
///
/// `limit = 0` prints every row.
pub fn format_table(table: &[EnrichedObservation], limit: usize) -> String {
    let mut rows: Vec<&EnrichedObservation> = table.iter().collect();
    rows.sort_by(|a, b| {
        b.observation
            .date
            .cmp(&a.observation.date)
            .then_with(|| a.observation.series_name.cmp(&b.observation.series_name))
    });
    if limit > 0 {
        rows.truncate(limit);
    }

    let name_w = rows
        .iter()
        .map(|r| r.observation.series_name.len())
        .max()
        .unwrap_or(6)
        .max(6);

    let mut out = String::new();
    out.push_str(&format!(
        "{:<10}  {:<name_w$}  {:>12}  {:>10}  {:>8}  {:>8}\n",
        "date", "series", "value", "mom", "mom_%", "yoy_%"
    ));
    for r in rows {
        out.push_str(&format!(
            "{:<10}  {:<name_w$}  {:>12.3}  {:>10}  {:>8}  {:>8}\n",
            r.observation.date,
            r.observation.series_name,
            r.observation.value,
            fmt_num(r.mom_change, 3),
            fmt_num(r.mom_pct_change, 2),
            fmt_num(r.yoy_pct_change, 2),
        ));
    }
    out
}

/// Round to an integer and insert `,` thousands separators.
pub fn group_thousands(v: f64, signed: bool) -> String {
    let rounded = v.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0.0 {
        "-"
    } else if signed {
        "+"
    } else {
        ""
    };
    format!("{sign}{grouped}")
}

/// Fixed-decimal number, or `-` when undefined.
pub fn fmt_num(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(v) => format!("{v:.decimals$}"),
        None => "-".to_string(),
    }
}

fn fmt_opt(v: Option<String>) -> String {
    v.unwrap_or_else(|| "n/a".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, NaiveDate};
    use crate::domain::{Observation, YearWindow};

    fn row(id: &str, name: &str, month: u32, value: f64, mom: Option<f64>, yoy: Option<f64>) -> EnrichedObservation {
        EnrichedObservation {
            observation: Observation {
                series_id: id.to_string(),
                series_name: name.to_string(),
                date: NaiveDate::from_ymd_opt(2024, month, 1).unwrap(),
                value,
                year: 2024,
                month,
            },
            mom_change: mom,
            mom_pct_change: None,
            yoy_pct_change: yoy,
        }
    }

    fn run(table: Vec<EnrichedObservation>) -> RunOutput {
        RunOutput {
            window: YearWindow { start_year: 2015, end_year: 2024 },
            source: "test".to_string(),
            fetched_at: Local::now(),
            n_observations: table.len(),
            table,
            failure: None,
        }
    }

    #[test]
    fn group_thousands_basic() {
        assert_eq!(group_thousands(158_234.4, false), "158,234");
        assert_eq!(group_thousands(303.0, true), "+303");
        assert_eq!(group_thousands(-1_234.6, true), "-1,235");
        assert_eq!(group_thousands(999.0, false), "999");
        assert_eq!(group_thousands(1_000_000.0, false), "1,000,000");
    }

    #[test]
    fn cards_follow_series_styles() {
        let table = vec![
            row(UNEMPLOYMENT_RATE, "Unemployment Rate", 3, 3.9, Some(0.1), None),
            row(TOTAL_NONFARM, "Total Nonfarm Employment", 3, 158_200.0, Some(303.0), None),
            row(AVG_HOURLY_EARNINGS, "Average Hourly Earnings", 3, 34.69, Some(0.12), Some(4.1)),
            row(CPI_SA, "CPI (Seasonally Adjusted)", 3, 312.2, Some(1.0), None),
        ];
        let cards = metric_cards(&run(table), SeriesCatalog::builtin());
        assert_eq!(cards.len(), 4);

        assert_eq!(cards[0].label, "Unemployment Rate");
        assert_eq!(cards[0].value, "3.9%");
        assert_eq!(cards[0].delta.as_deref(), Some("+0.1 pp"));

        assert_eq!(cards[1].value, "158,200 k");
        assert_eq!(cards[1].delta.as_deref(), Some("+303 k"));

        assert_eq!(cards[2].value, "$34.69");
        assert_eq!(cards[2].delta.as_deref(), Some("+4.1% (YoY)"));

        // No YoY history yet: card renders without a delta.
        assert_eq!(cards[3].value, "312.2");
        assert_eq!(cards[3].delta, None);
    }

    #[test]
    fn missing_series_produce_no_card() {
        let table = vec![
            row(UNEMPLOYMENT_RATE, "Unemployment Rate", 1, 3.7, None, None),
            row("XYZ", "XYZ", 1, 12.0, None, None),
        ];
        let cards = metric_cards(&run(table), SeriesCatalog::builtin());
        let labels: Vec<&str> = cards.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Unemployment Rate", "XYZ"]);
        assert_eq!(cards[1].style, CardStyle::Generic);
    }

    #[test]
    fn table_sorted_newest_first() {
        let table = vec![
            row(UNEMPLOYMENT_RATE, "Unemployment Rate", 1, 3.7, None, None),
            row(CPI_SA, "CPI (Seasonally Adjusted)", 2, 310.0, Some(0.5), None),
            row(UNEMPLOYMENT_RATE, "Unemployment Rate", 2, 3.9, Some(0.2), None),
        ];
        let txt = format_table(&table, 2);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2024-02-01  CPI"));
        assert!(lines[2].starts_with("2024-02-01  Unemployment Rate"));
    }

    #[test]
    fn detail_lines_include_as_of_month() {
        let r = row(UNEMPLOYMENT_RATE, "Unemployment Rate", 3, 3.9, Some(0.1), None);
        let lines = CardStyle::Rate.detail_lines(&LatestSnapshot::from(&r));
        assert_eq!(
            lines,
            vec![
                "Current Rate: 3.9%".to_string(),
                "Change from last month: +0.1 pp".to_string(),
                "Data as of: March 2024".to_string(),
            ]
        );
    }
}
