//! CLI argument definitions for csvmerge.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

use csvmerge_cli::pipeline::DEFAULT_BATCH_SIZE;
use csvmerge_ingest::DEFAULT_STATE_COLUMN;

#[derive(Parser)]
#[command(
    name = "csvmerge",
    version,
    about = "Merge CSV files from a directory tree into deduplicated outputs",
    long_about = "Find every CSV file under a root directory, keep the columns all of them share,\n\
                  filter rows on their state column, drop duplicate rows, and write either a\n\
                  single combined file or one combined file per batch."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

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

    /// Prefix log lines with timestamps.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge every CSV file into <ROOT>/processed_all/combined_all.csv.
    All(MergeArgs),

    /// Merge CSV files in batches into <ROOT>/processed_batches/batch_NNN/combined.csv.
    Batches(BatchArgs),

    /// Print the columns shared by every CSV file without writing anything.
    Columns(ColumnsArgs),
}

#[derive(Args)]
pub struct MergeArgs {
    /// Directory searched recursively for CSV files.
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Output directory (default: processed_all or processed_batches under ROOT).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Column holding the row state.
    #[arg(long = "state-column", value_name = "NAME", default_value = DEFAULT_STATE_COLUMN)]
    pub state_column: String,

    /// State values to keep (default: successful, failed).
    #[arg(long = "keep-state", value_name = "VALUE", value_delimiter = ',')]
    pub keep_state: Vec<String>,

    /// Keep every row regardless of its state.
    #[arg(long = "no-state-filter")]
    pub no_state_filter: bool,

    /// Do not draw progress bars.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

#[derive(Args)]
pub struct BatchArgs {
    #[command(flatten)]
    pub merge: MergeArgs,

    /// Number of input files per batch.
    #[arg(long = "batch-size", value_name = "N", default_value_t = default_batch_size())]
    pub batch_size: NonZeroUsize,
}

#[derive(Args)]
pub struct ColumnsArgs {
    /// Directory searched recursively for CSV files.
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,
}

fn default_batch_size() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN)
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
