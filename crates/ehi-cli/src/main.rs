//! EHI hydrator CLI.

use clap::Parser;

use ehi_cli::logging::{LogConfig, LogFormat, init_logging};

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg};
use crate::commands::{run_codegen, run_coverage, run_hydrate, run_tables, run_validate};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let result = match &cli.command {
        Command::Hydrate(args) => run_hydrate(args),
        Command::Coverage(args) => run_coverage(args),
        Command::Validate(args) => run_validate(args),
        Command::Codegen(args) => run_codegen(args),
        Command::Tables(args) => run_tables(args),
    };
    if let Err(error) = result {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

/// Build logging configuration from CLI flags.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level = cli
        .verbosity
        .tracing_level_filter()
        .into_level()
        .unwrap_or(tracing::Level::ERROR);
    LogConfig {
        level,
        format: match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        },
        with_ansi: true,
        log_file: cli.log_file.clone(),
        log_data: cli.log_data,
    }
}
