//! CLI argument definitions for the EHI hydrator.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ehi-hydrator",
    version,
    about = "EHI hydrator - nested chart documents from flat EHI exports",
    long_about = "Convert a flat, table-oriented EHI export into one nested,\n\
                  typed JSON document per subject.\n\n\
                  Split tables are merged, structural children attached,\n\
                  cross-references indexed, and every column access checked."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow row-level (PHI) values in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Hydrate one subject's graph and write its document.
    Hydrate(HydrateArgs),

    /// Report which tables and columns configuration reaches.
    Coverage(CoverageArgs),

    /// Validate column manifests against the live export (onboarding gate).
    Validate(ValidateArgs),

    /// Generate typed row structs from a schema catalog.
    Codegen(CodegenArgs),

    /// List the tables present in an export.
    Tables(TablesArgs),
}

#[derive(Parser)]
pub struct HydrateArgs {
    /// Path to the export directory of delimited table files.
    #[arg(value_name = "EXPORT_DIR")]
    pub export_dir: PathBuf,

    /// Hydration configuration (split groups, entity mappings, manifests).
    #[arg(long = "config", value_name = "PATH")]
    pub config: PathBuf,

    /// Subject key to hydrate.
    #[arg(long = "subject", value_name = "ID")]
    pub subject: String,

    /// Schema catalog for typed field projection.
    #[arg(long = "schema", value_name = "PATH")]
    pub schema: Option<PathBuf>,

    /// Output file (stdout when omitted).
    #[arg(long = "out", value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Pretty-print the document.
    #[arg(long = "pretty")]
    pub pretty: bool,
}

#[derive(Parser)]
pub struct CoverageArgs {
    /// Path to the export directory of delimited table files.
    #[arg(value_name = "EXPORT_DIR")]
    pub export_dir: PathBuf,

    /// Hydration configuration.
    #[arg(long = "config", value_name = "PATH")]
    pub config: PathBuf,

    /// Emit the report as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Path to the export directory of delimited table files.
    #[arg(value_name = "EXPORT_DIR")]
    pub export_dir: PathBuf,

    /// Hydration configuration.
    #[arg(long = "config", value_name = "PATH")]
    pub config: PathBuf,
}

#[derive(Parser)]
pub struct CodegenArgs {
    /// Schema catalog to generate from.
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Output path for the generated module.
    #[arg(long = "out", value_name = "PATH")]
    pub out: PathBuf,
}

#[derive(Parser)]
pub struct TablesArgs {
    /// Path to the export directory of delimited table files.
    #[arg(value_name = "EXPORT_DIR")]
    pub export_dir: PathBuf,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
