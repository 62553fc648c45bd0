//! Domain types used throughout the app.
//!
//! This module defines:
//!
//! - loaded dataset rows (`DistrictRecord`)
//! - the per-selection view (`YearSeries`, `SeriesPoint`)
//! - rendered table rows (`TableRow`)

pub mod types;

pub use types::*;
