//! Monthly series chart drawn with Plotters into the Ratatui buffer.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{buffer::Buffer, layout::Rect, style::{Color, Style}, widgets::Widget};

const LINE: RGBColor = RGBColor(0, 255, 255);
const GAIN: RGBColor = RGBColor(0, 255, 0);
const LOSS: RGBColor = RGBColor(255, 0, 0);
const SHADE: RGBColor = RGBColor(110, 110, 110);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Level or percent series joined by a line.
    Line,
    /// One signed bar per month from the zero line.
    Bars,
}

/// Data window of a chart; x is a fractional year (`2024.0` = Jan 2024).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartBounds {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl ChartBounds {
    fn is_drawable(&self) -> bool {
        let (x0, x1) = self.x;
        let (y0, y1) = self.y;
        [x0, x1, y0, y1].iter().all(|v| v.is_finite()) && x0 < x1 && y0 < y1
    }
}

/// Render-only view over precomputed points.
pub struct SeriesChart<'a> {
    pub points: &'a [(f64, f64)],
    pub kind: ChartKind,
    pub bounds: ChartBounds,
    /// Highlighted x-interval, drawn before the data.
    pub shade: Option<(f64, f64)>,
    pub y_desc: &'a str,
}

impl Widget for SeriesChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 8 {
            buf.set_string(area.x, area.y, "Terminal too small for chart.", Style::default().fg(Color::Yellow));
            return;
        }
        if !self.bounds.is_drawable() {
            return;
        }

        let (x0, x1) = self.bounds.x;
        let (y0, y1) = self.bounds.y;
        let SeriesChart { points, kind, shade, y_desc, .. } = self;

        widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 9)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_mesh()
                .x_desc("year")
                .y_desc(y_desc)
                .x_labels(6)
                .y_labels(5)
                .x_label_formatter(&|v| format!("{v:.0}"))
                .y_label_formatter(&|v| axis_value(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            if let Some((s0, s1)) = shade.and_then(|span| clip_span(span, (x0, x1))) {
                chart.draw_series([Rectangle::new([(s0, y0), (s1, y1)], SHADE.mix(0.3).filled())])?;
                chart.draw_series([Text::new(
                    "Recession",
                    (s0, y1),
                    ("sans-serif", 10).into_font().color(&WHITE),
                )])?;
            }

            match kind {
                ChartKind::Line => {
                    chart.draw_series(LineSeries::new(points.iter().copied(), LINE))?;
                }
                ChartKind::Bars => {
                    if y0 < 0.0 && y1 > 0.0 {
                        chart.draw_series(LineSeries::new([(x0, 0.0), (x1, 0.0)], WHITE))?;
                    }
                    chart.draw_series(points.iter().map(|&(x, y)| {
                        PathElement::new(vec![(x, 0.0), (x, y)], if y >= 0.0 { GAIN } else { LOSS })
                    }))?;
                }
            }
            Ok(())
        })
        .render(area, buf);
    }
}

/// Part of `span` inside `bounds`, if any.
fn clip_span(span: (f64, f64), bounds: (f64, f64)) -> Option<(f64, f64)> {
    let (s0, s1) = (span.0.max(bounds.0), span.1.min(bounds.1));
    (s0 < s1).then_some((s0, s1))
}

fn axis_value(v: f64) -> String {
    if v.abs() >= 1000.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shade_is_clipped_to_visible_range() {
        let covid = (2020.0 + 1.0 / 12.0, 2020.0 + 3.0 / 12.0);
        assert_eq!(clip_span(covid, (2016.0, 2025.0)), Some(covid));
        assert_eq!(clip_span(covid, (2020.125, 2025.0)), Some((2020.125, covid.1)));
        assert_eq!(clip_span(covid, (2021.0, 2025.0)), None);
    }
}
