//! Export a district's year series to CSV or JSON.
//!
//! The format follows the file extension: `.csv` writes one row per school
//! year, anything else writes pretty-printed JSON.

use std::fs::File;
use std::path::Path;

use crate::domain::YearSeries;
use crate::error::{AppError, EXIT_INPUT};

/// Write `series` to `path`.
pub fn write_series(path: &Path, series: &YearSeries) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(EXIT_INPUT, format!("Failed to create export '{}': {e}", path.display()))
    })?;

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        write_csv(file, series)?;
    } else {
        serde_json::to_writer_pretty(file, series)
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write export JSON: {e}")))?;
    }

    tracing::info!(path = %path.display(), rows = series.len(), "exported series");
    Ok(())
}

fn write_csv(file: File, series: &YearSeries) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(["district", "year_key", "school_year", "chronic_absent_pct"])
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write export CSV header: {e}")))?;

    for p in &series.points {
        let value = p.value.map(|v| v.to_string()).unwrap_or_default();
        writer
            .write_record([series.district.as_str(), p.key.as_str(), p.label.as_str(), value.as_str()])
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to flush export CSV: {e}")))
}
