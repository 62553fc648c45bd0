//! Table rows and formatted terminal output.
//!
//! Formatting lives in one place so the TUI table, the CLI output and the
//! chart tooltip agree on how a value is displayed.

use crate::domain::{TableRow, YearSeries};

pub mod export;

pub use export::write_series;

/// Display text for an absent value.
pub const NOT_AVAILABLE_DISPLAY: &str = "N/A";

/// Table column headings.
pub const YEAR_HEADING: &str = "School Year";
pub const VALUE_HEADING: &str = "Chronic Absenteeism";

/// `12.5` -> `12.5%`, `12.0` -> `12%`.
pub fn format_percent(value: f64) -> String {
    format!("{value}%")
}

/// Table cell text for an optional value.
pub fn display_value(value: Option<f64>) -> String {
    value
        .map(format_percent)
        .unwrap_or_else(|| NOT_AVAILABLE_DISPLAY.to_string())
}

/// Tooltip text for a chart point.
pub fn tooltip_text(label: &str, value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{} Chronically Absent", format_percent(v)),
        None => format!("{label}: {NOT_AVAILABLE_DISPLAY}"),
    }
}

/// Table rows, newest school year first.
pub fn table_rows(series: &YearSeries) -> Vec<TableRow> {
    series
        .reversed()
        .into_iter()
        .map(|p| TableRow {
            label: p.label.clone(),
            display: display_value(p.value),
        })
        .collect()
}

/// Plain-text table for the CLI.
pub fn format_table(district: &str, rows: &[TableRow]) -> String {
    let year_width = rows
        .iter()
        .map(|r| r.label.chars().count())
        .chain(std::iter::once(YEAR_HEADING.len()))
        .max()
        .unwrap_or(YEAR_HEADING.len());

    let mut out = String::new();
    out.push_str(&format!("=== {district} ===\n"));
    out.push_str(
        format!("{YEAR_HEADING:<year_width$}  {VALUE_HEADING:>19}\n").as_str(),
    );
    out.push_str(&format!("{:-<year_width$}  {:-<19}\n", "", ""));
    for row in rows {
        out.push_str(&format!("{:<year_width$}  {:>19}\n", row.label, row.display));
    }
    if rows.is_empty() {
        out.push_str("(no school years in dataset)\n");
    }
    out
}
