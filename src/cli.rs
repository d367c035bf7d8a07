//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use harvester_metrics::generator::{DEFAULT_SEED, DEFAULT_WORKER_COUNT};
use harvester_metrics::logging::LogFormat;
use harvester_metrics::ranking::DEFAULT_TOP_N;

#[derive(Parser)]
#[command(
    name = "harvester-metrics",
    version,
    about = "Before/after certification metrics for oil-palm harvesters"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Disable ANSI colors in log output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a synthetic template CSV with raw and derived columns.
    Template(TemplateArgs),

    /// Load or generate a worker table and print the dashboard figures.
    Report(ReportArgs),
}

#[derive(Args)]
pub struct TemplateArgs {
    /// Number of synthetic workers.
    #[arg(long, default_value_t = DEFAULT_WORKER_COUNT)]
    pub count: usize,

    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    #[arg(long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(Args)]
pub struct ReportArgs {
    /// Worker CSV to load; a synthetic table is generated when omitted.
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Synthetic worker count when no input is given.
    #[arg(long, default_value_t = DEFAULT_WORKER_COUNT)]
    pub count: usize,

    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Keep only these estates (repeatable).
    #[arg(long = "estate", value_name = "ESTATE")]
    pub estates: Vec<String>,

    /// Keep only these certification levels (repeatable; Dasar/Madya/Mahir).
    #[arg(long = "level", value_name = "LEVEL")]
    pub levels: Vec<String>,

    /// Minimum tonnage improvement in percent.
    #[arg(long = "min-improvement", value_name = "PCT", allow_negative_numbers = true)]
    pub min_improvement: Option<f64>,

    /// Rows in the top-performer tables.
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top: usize,

    /// Write the filtered table as a date-stamped CSV.
    #[arg(long)]
    pub export: bool,

    #[arg(long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
        }
    }
}
