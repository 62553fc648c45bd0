//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging for the chosen front-end
//! - loads the dataset
//! - prints tables/charts or hands over to the TUI

use clap::Parser;

use crate::cli::{Command, DataArgs, SearchArgs, ShowArgs};
use crate::data::{DatasetConfig, load_records};
use crate::domain::DistrictRecord;
use crate::error::{AppError, EXIT_INPUT};
use crate::logging::{LogTarget, TUI_LOG_FILE};

/// Entry point for the `absence` binary.
pub fn run() -> Result<(), AppError> {
    // `absence` and `absence -d data.csv` behave like `absence tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Search(args) => handle_search(args),
        Command::Show(args) => handle_show(args),
    }
}

fn handle_tui(args: DataArgs) -> Result<(), AppError> {
    crate::logging::init(LogTarget::File(TUI_LOG_FILE.into()))?;
    crate::tui::run(args.dataset_config())
}

fn handle_search(args: SearchArgs) -> Result<(), AppError> {
    crate::logging::init(LogTarget::Stderr)?;
    let records = load(&args.data.dataset_config())?;

    for record in crate::search::search(&records, &args.query) {
        println!("{}", record.display_name());
    }
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    crate::logging::init(LogTarget::Stderr)?;
    let records = load(&args.data.dataset_config())?;

    let record = crate::search::find_district(&records, &args.name).ok_or_else(|| {
        AppError::new(EXIT_INPUT, format!("No district matches '{}'.", args.name))
    })?;

    let series = crate::series::extract_series(record);
    let rows = crate::report::table_rows(&series);
    println!("{}", crate::report::format_table(&series.district, &rows));

    if !args.no_plot {
        println!(
            "{}",
            crate::plot::render_ascii_chart(&series, args.width, args.height)
        );
    }

    if let Some(path) = &args.export {
        crate::report::write_series(path, &series)?;
    }

    Ok(())
}

fn load(config: &DatasetConfig) -> Result<Vec<DistrictRecord>, AppError> {
    load_records(config).inspect_err(|err| {
        tracing::error!(source = %config.source, error = %err, "dataset load failed");
    })
}

/// Rewrite argv so `absence` defaults to `absence tui`.
///
/// Rules:
/// - `absence`                      -> `absence tui`
/// - `absence -d data.csv ...`      -> `absence tui -d data.csv ...`
/// - `absence --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "search" | "show");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
