//! Command-line parsing for the district absenteeism explorer.
//!
//! The goal of this module is to keep **argument parsing** separate from
//! loading, searching and rendering.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::data::DatasetConfig;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "absence",
    version,
    about = "Search school districts and chart their chronic-absenteeism rates"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive search + chart TUI (default).
    Tui(DataArgs),
    /// Print district names matching a query (first 10, dataset order).
    Search(SearchArgs),
    /// Print the year table and a text chart for one district.
    Show(ShowArgs),
}

/// Dataset location options shared by every subcommand.
#[derive(Debug, Args, Clone, Default)]
pub struct DataArgs {
    /// Dataset CSV: a local path or an http(s) URL. Falls back to
    /// `DISTRICT_DATA`, then `district_data.csv`.
    #[arg(short = 'd', long, value_name = "PATH|URL")]
    pub data: Option<String>,

    /// Header column holding the district name. Falls back to
    /// `DISTRICT_NAME_COLUMN`, then `clean_name`.
    #[arg(long, value_name = "COLUMN")]
    pub name_column: Option<String>,
}

impl DataArgs {
    pub fn dataset_config(&self) -> DatasetConfig {
        DatasetConfig::resolve(self.data.as_deref(), self.name_column.as_deref())
    }
}

#[derive(Debug, Parser, Clone)]
pub struct SearchArgs {
    /// Free-text query (at least 2 characters).
    pub query: String,

    #[command(flatten)]
    pub data: DataArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    /// District name; an exact match wins, else the first search match.
    pub name: String,

    #[command(flatten)]
    pub data: DataArgs,

    /// Chart width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,

    /// Skip the text chart.
    #[arg(long)]
    pub no_plot: bool,

    /// Export the year series (`.csv` => CSV, otherwise JSON).
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}
