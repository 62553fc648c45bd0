//! Shared domain types.
//!
//! `DistrictRecord` is what the loader produces and the search filter scans.
//! `YearSeries` is the derived per-selection view consumed by the table and
//! the chart renderers.

use serde::Serialize;

/// One row of the dataset.
///
/// Year fields keep header order; `None` marks a field the row did not
/// supply at all (shorter than the header).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistrictRecord {
    pub name: Option<String>,
    pub fields: Vec<(String, Option<String>)>,
}

impl DistrictRecord {
    pub fn new(name: Option<String>, fields: Vec<(String, Option<String>)>) -> Self {
        Self { name, fields }
    }

    /// Display name, or an empty string for unnamed rows.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// One school year of a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// Raw year key from the header (e.g. `20192020`).
    pub key: String,
    /// Display label (e.g. `2019-2020`).
    pub label: String,
    /// Chronic-absenteeism percentage; `None` is plotted as a gap.
    pub value: Option<f64>,
}

/// Year series for a single district, oldest year first.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct YearSeries {
    pub district: String,
    pub points: Vec<SeriesPoint>,
}

impl YearSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.label.as_str()).collect()
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Newest year first.
    pub fn reversed(&self) -> Vec<&SeriesPoint> {
        self.points.iter().rev().collect()
    }

    /// Largest present value, if any.
    pub fn max_value(&self) -> Option<f64> {
        self.points
            .iter()
            .filter_map(|p| p.value)
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }
}

/// One row of the rendered table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub label: String,
    pub display: String,
}
