//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - fetches and normalizes the market report
//! - prints tables / profit results or launches the TUI
//! - writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{CalcArgs, Command, ExportArgs, TableArgs, TuiArgs};
use crate::io::rules::NormalizeRules;
use crate::error::AppError;
use crate::slice::brackets_for;

pub mod pipeline;

use pipeline::{CalcRequest, open_cache, open_source};

/// Entry point for the `vog` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` must be loaded before clap resolves `env = ...` defaults.
    dotenvy::dotenv().ok();

    // We want `vog` and `vog --input x.json` to behave like `vog tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Table(args) => handle_table(args),
        Command::Calc(args) => handle_calc(args),
        Command::Export(args) => handle_export(args),
        Command::Save(args) => handle_save(args),
    }
}

/// Install the stderr subscriber. `RUST_LOG` overrides `default_directive`.
fn init_logging(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    // Log lines would tear the alternate screen; stay quiet unless asked.
    init_logging("off");
    crate::tui::run(args)
}

fn handle_table(args: TableArgs) -> Result<(), AppError> {
    init_logging("warn");
    let config = args.source.to_config();
    let cache = open_cache(&config)?;
    let report = cache.get_or_refresh()?;

    println!(
        "{}",
        crate::report::format_report_summary(&report, &cache.source().describe())
    );

    let rules = NormalizeRules::from_config(&config);
    let sex = args.sex.as_deref().map(|s| rules.parse_sex(s));
    let rows: Vec<_> = match (&sex, &args.grade) {
        (Some(sex), Some(grade)) => brackets_for(&report.entries, sex, grade),
        (Some(sex), None) => report.entries.iter().filter(|e| &e.sex == sex).collect(),
        (None, Some(grade)) => report
            .entries
            .iter()
            .filter(|e| e.grade.eq_ignore_ascii_case(grade.trim()))
            .collect(),
        (None, None) => report.entries.iter().collect(),
    };

    if rows.is_empty() {
        return Err(AppError::new(3, "No entries match the requested sex/grade."));
    }

    println!("{}", crate::report::format_table(&rows));
    Ok(())
}

fn handle_calc(args: CalcArgs) -> Result<(), AppError> {
    init_logging("warn");
    let assumptions = args.feed.to_assumptions()?;
    let config = args.source.to_config();
    let cache = open_cache(&config)?;
    let report = cache.get_or_refresh()?;

    let request = CalcRequest {
        sex: NormalizeRules::from_config(&config).parse_sex(&args.sex),
        grade: args.grade.clone(),
        buy_range: args.buy.clone(),
        sell_range: args.sell.clone(),
    };
    let out = pipeline::run_calc(&report, &request, &assumptions)?;

    println!(
        "{}",
        crate::report::format_report_summary(&report, &cache.source().describe())
    );
    println!(
        "{}",
        crate::report::format_profit(&out.purchase, &out.sale, &assumptions, &out.result)
    );
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    init_logging("warn");
    let cache = open_cache(&args.source.to_config())?;
    let report = cache.get_or_refresh()?;

    crate::io::export::write_table_csv(&args.out, &report)?;
    println!("Wrote {} rows to {}", report.entries.len(), args.out.display());
    Ok(())
}

fn handle_save(args: ExportArgs) -> Result<(), AppError> {
    init_logging("warn");
    let source = open_source(&args.source.to_config())?;
    let records = source.fetch()?;
    if records.is_empty() {
        return Err(crate::error::ReportError::EmptySource.into());
    }

    crate::io::snapshot::write_report_json(&args.out, &records)?;
    println!("Saved {} raw records to {}", records.len(), args.out.display());
    Ok(())
}

/// Rewrite argv so `vog` defaults to `vog tui`.
///
/// Rules:
/// - `vog`                       -> `vog tui`
/// - `vog --input x.json ...`    -> `vog tui --input x.json ...`
/// - `vog --help/--version/-h`   -> unchanged (show top-level help/version)
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

    let is_subcommand = matches!(arg1.as_str(), "tui" | "table" | "calc" | "export" | "save");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
