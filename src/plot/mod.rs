//! Text charts for the non-interactive CLI.

pub mod ascii;

pub use ascii::{render_ascii_chart, y_upper_bound};
