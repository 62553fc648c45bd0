//! Plotters-powered absenteeism line chart for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using
//! `plotters-ratatui-backend`. The x-axis is categorical (one slot per school
//! year); absent values split the line into separate segments.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::YearSeries;

/// Line colour (`#2563eb`).
const LINE_COLOR: RGBColor = RGBColor(37, 99, 235);
/// Fill under the line; a darker shade of the line colour.
const FILL_COLOR: RGBColor = RGBColor(23, 52, 120);
/// Marker for the focused (tooltip) point.
const FOCUS_COLOR: RGBColor = RGBColor(250, 204, 21);

/// A rendered chart instance. At most one is alive at a time (see `ChartSlot`).
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesChart {
    pub district: String,
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
    pub y_max: f64,
    /// Index of the point whose tooltip is shown.
    pub focus: usize,
}

impl SeriesChart {
    /// Chart for an ascending (oldest first) series.
    pub fn new(series: &YearSeries) -> Self {
        Self {
            district: series.district.clone(),
            labels: series.labels().into_iter().map(str::to_string).collect(),
            values: series.values(),
            y_max: crate::plot::y_upper_bound(series),
            focus: series.len().saturating_sub(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.saturating_sub(1);
    }

    pub fn focus_next(&mut self) {
        if self.focus + 1 < self.labels.len() {
            self.focus += 1;
        }
    }

    /// Tooltip for the focused point.
    pub fn tooltip(&self) -> Option<String> {
        let label = self.labels.get(self.focus)?;
        let value = self.values.get(self.focus).copied().flatten();
        Some(crate::report::tooltip_text(label, value))
    }

    /// Consecutive runs of present values as `(x, y)` points.
    pub fn segments(&self) -> Vec<Vec<(f64, f64)>> {
        let mut out = Vec::new();
        let mut run = Vec::new();
        for (i, value) in self.values.iter().enumerate() {
            match value {
                Some(v) => run.push((i as f64, *v)),
                None => {
                    if !run.is_empty() {
                        out.push(std::mem::take(&mut run));
                    }
                }
            }
        }
        if !run.is_empty() {
            out.push(run);
        }
        out
    }

    fn dispose(self) {
        tracing::debug!(district = %self.district, "disposing previous chart");
    }
}

/// Owner of the single live chart instance.
#[derive(Debug, Default)]
pub struct ChartSlot {
    current: Option<SeriesChart>,
}

impl ChartSlot {
    /// Dispose of the current chart (if any), then install `chart`.
    pub fn replace(&mut self, chart: SeriesChart) {
        if let Some(old) = self.current.take() {
            old.dispose();
        }
        self.current = Some(chart);
    }

    pub fn get(&self) -> Option<&SeriesChart> {
        self.current.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut SeriesChart> {
        self.current.as_mut()
    }
}

/// Render-only view of a `SeriesChart`.
pub struct AbsenteeChart<'a> {
    pub chart: &'a SeriesChart,
    pub x_label: &'a str,
    pub y_label: &'a str,
}

impl<'a> Widget for AbsenteeChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }
        if self.chart.is_empty() {
            buf.set_string(
                area.x,
                area.y,
                "No school years in dataset.",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let n = self.chart.labels.len();
        let x0 = -0.5_f64;
        let x1 = n as f64 - 0.5;
        let y1 = self.chart.y_max;
        if !(y1.is_finite() && y1 > 0.0) {
            return;
        }

        let labels = &self.chart.labels;
        let segments = self.chart.segments();
        let focus = self
            .chart
            .values
            .get(self.chart.focus)
            .copied()
            .flatten()
            .map(|v| (self.chart.focus as f64, v));

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, 0.0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(n.min(8))
                .y_labels(5)
                .x_label_formatter(&|v| label_at(labels, *v))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .light_line_style(&BLACK)
                .bold_line_style(&RGBColor(71, 85, 105))
                .draw()?;

            for segment in &segments {
                chart.draw_series(AreaSeries::new(
                    segment.iter().copied(),
                    0.0,
                    ShapeStyle::from(&FILL_COLOR).filled(),
                ))?;
                chart.draw_series(LineSeries::new(segment.iter().copied(), &LINE_COLOR))?;
            }

            // `Circle` radii are mis-scaled by the terminal backend; a pixel
            // marker renders as a clean dot.
            chart.draw_series(
                segments
                    .iter()
                    .flatten()
                    .map(|&(x, y)| Pixel::new((x, y), WHITE)),
            )?;

            if let Some(point) = focus {
                chart.draw_series(std::iter::once(Pixel::new(point, FOCUS_COLOR)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Tick label for a categorical x position; blank between categories.
fn label_at(labels: &[String], x: f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}
