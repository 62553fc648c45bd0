//! `district-absence` library crate.
//!
//! The binary (`absence`) is a thin wrapper around this library so that:
//!
//! - search, series extraction and formatting are testable without a terminal
//! - the TUI and the plain CLI share one loading/rendering path

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod logging;
pub mod plot;
pub mod report;
pub mod search;
pub mod series;
pub mod tui;
