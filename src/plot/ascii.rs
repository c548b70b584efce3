//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observations: `o`, joined by a `-` line (levels and percent columns)
//! - bars: `|` from a `-` zero baseline (MoM change)
//!
//! The x axis is months since year 0, so consecutive months are exactly one
//! unit apart.

use chrono::{Datelike, NaiveDate};

use crate::domain::{ChangeColumn, EnrichedObservation};

/// Render one series column as a line or bar chart.
///
/// `rows` should be a single series; rows whose column is undefined are skipped.
pub fn render_series_plot(
    series_name: &str,
    rows: &[&EnrichedObservation],
    column: ChangeColumn,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let mut points: Vec<(NaiveDate, f64)> = rows
        .iter()
        .filter_map(|r| column.get(r).map(|v| (r.observation.date, v)))
        .collect();
    points.sort_by_key(|(d, _)| *d);

    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return format!("Plot: {series_name} {} | no data\n", column.label());
    };
    let (d0, d1) = (first.0, last.0);

    let xy: Vec<(f64, f64)> = points.iter().map(|&(d, v)| (month_index(d), v)).collect();
    let (x_min, x_max) = widen(month_index(d0), month_index(d1));

    let bars = column.is_bar();
    let (y_min, y_max) = y_range(&xy, bars);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    if bars {
        draw_bars(&mut grid, &xy, x_min, x_max, y_min, y_max);
    } else {
        draw_curve(&mut grid, &xy, x_min, x_max, y_min, y_max);
        for &(x, y) in &xy {
            let col = map_x(x, x_min, x_max, width);
            let row = map_y(y, y_min, y_max, height);
            grid[row][col] = 'o';
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {series_name} {} | {}..{} | y=[{y_min:.2}, {y_max:.2}]\n",
        column.label(),
        d0.format("%Y-%m"),
        d1.format("%Y-%m"),
    ));

    for row in grid {
        let line: String = row.into_iter().collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

fn month_index(d: NaiveDate) -> f64 {
    (d.year() as f64) * 12.0 + (d.month0() as f64)
}

fn widen(min: f64, max: f64) -> (f64, f64) {
    if max > min { (min, max) } else { (min - 1.0, max + 1.0) }
}

fn y_range(xy: &[(f64, f64)], include_zero: bool) -> (f64, f64) {
    let mut min_y = if include_zero { 0.0 } else { f64::INFINITY };
    let mut max_y = if include_zero { 0.0 } else { f64::NEG_INFINITY };
    for &(_, y) in xy {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    widen(min_y, max_y)
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], xy: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    if xy.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in xy {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

fn draw_bars(grid: &mut [Vec<char>], xy: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();
    let base = map_y(0.0, y_min, y_max, height);

    for cell in grid[base].iter_mut() {
        *cell = '-';
    }

    for &(x, y) in xy {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        for r in row.min(base)..=row.max(base) {
            grid[r][col] = '|';
        }
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;

    fn rows(values: &[(u32, f64, Option<f64>)]) -> Vec<EnrichedObservation> {
        values
            .iter()
            .map(|&(month, value, mom)| EnrichedObservation {
                observation: Observation {
                    series_id: "T".to_string(),
                    series_name: "Test".to_string(),
                    date: NaiveDate::from_ymd_opt(2024, month, 1).unwrap(),
                    value,
                    year: 2024,
                    month,
                },
                mom_change: mom,
                mom_pct_change: None,
                yoy_pct_change: None,
            })
            .collect()
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let table = rows(&[(1, 10.0, None), (2, 20.0, Some(10.0)), (3, 0.0, Some(-20.0))]);
        let refs: Vec<&EnrichedObservation> = table.iter().collect();

        let txt = render_series_plot("Test", &refs, ChangeColumn::Value, 10, 5);
        let expected = concat!(
            "Plot: Test value | 2024-01..2024-03 | y=[-1.00, 21.00]\n",
            "    -o\n",
            "  --  -\n",
            "o-     -\n",
            "        -\n",
            "         o\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn bars_hang_from_zero_baseline() {
        let table = rows(&[(1, 10.0, None), (2, 12.0, Some(2.0)), (3, 11.0, Some(-1.0))]);
        let refs: Vec<&EnrichedObservation> = table.iter().collect();

        let txt = render_series_plot("Test", &refs, ChangeColumn::Mom, 10, 5);
        let lines: Vec<&str> = txt.lines().collect();
        assert!(lines[0].starts_with("Plot: Test MoM change | 2024-02..2024-03"));
        // Positive bar in the first column rises above the baseline, the
        // negative one in the last column drops below it.
        assert_eq!(lines[1], "|");
        assert_eq!(lines[4], "|--------|");
        assert_eq!(lines[5], "         |");
    }

    #[test]
    fn undefined_column_reports_no_data() {
        let table = rows(&[(1, 10.0, None)]);
        let refs: Vec<&EnrichedObservation> = table.iter().collect();
        let txt = render_series_plot("Test", &refs, ChangeColumn::Yoy, 10, 5);
        assert_eq!(txt, "Plot: Test YoY % change | no data\n");
    }
}
