//! CLI argument definitions for the wave harmonizer.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "harmon",
    version,
    about = "Survey wave harmonizer - recode labelled survey data onto a shared scale",
    long_about = "Harmonize labelled survey waves onto one shared coding scheme.\n\n\
                  Reads SPSS system files (.sav) and CSV waves, applies a TOML\n\
                  crosswalk to category labels, and exports the stacked result."
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

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

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
}

#[derive(Subcommand)]
pub enum Command {
    /// List the waves in a folder with row, column, and label counts.
    Waves(WavesArgs),

    /// Build the cross-wave variable metadata table.
    Metadata(MetadataArgs),

    /// Run the full harmonization pipeline over a wave folder.
    Harmonize(HarmonizeArgs),

    /// Convert a single sav file to CSV or JSON.
    Export(ExportArgs),
}

#[derive(Parser)]
pub struct WavesArgs {
    /// Folder containing the survey wave files (.sav, .csv).
    #[arg(value_name = "WAVE_DIR")]
    pub wave_dir: PathBuf,
}

#[derive(Parser)]
pub struct MetadataArgs {
    /// Folder containing the survey wave files (.sav, .csv).
    #[arg(value_name = "WAVE_DIR")]
    pub wave_dir: PathBuf,

    /// Write the metadata table to a CSV file instead of printing it.
    #[arg(long = "out", value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Parser)]
pub struct HarmonizeArgs {
    /// Folder containing the survey wave files (.sav, .csv).
    #[arg(value_name = "WAVE_DIR")]
    pub wave_dir: PathBuf,

    /// Crosswalk specification (TOML).
    #[arg(long = "crosswalk", value_name = "FILE")]
    pub crosswalk: PathBuf,

    /// Output directory for exports (default: <WAVE_DIR>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format for the bound result.
    #[arg(long = "format", value_enum, default_value = "both")]
    pub format: ExportFormatArg,

    /// Report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct ExportArgs {
    /// The sav file to convert.
    #[arg(value_name = "SAV_FILE")]
    pub input: PathBuf,

    /// Target format.
    #[arg(long = "format", value_enum, default_value = "csv")]
    pub format: ConvertFormatArg,

    /// Output path (default: input path with the new extension).
    #[arg(long = "out", value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportFormatArg {
    Sav,
    Csv,
    Both,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ConvertFormatArg {
    Csv,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
