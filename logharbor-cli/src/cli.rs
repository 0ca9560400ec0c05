//! CLI argument parsing using clap derive API
//!
//! Purely declarative: no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use logharbor_core::filter::RecordFilter;

/// Logharbor -- self-hosted syslog aggregation.
///
/// Use `logharbor <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "logharbor", version, about, long_about = None)]
pub struct Cli {
    /// Path to the logharbor.toml configuration file.
    #[arg(short, long, global = true, default_value = "/etc/logharbor/logharbor.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the most recent lines from the daemon's live buffer.
    Live(LiveArgs),

    /// Search archived and live log files by time range.
    Search(SearchArgs),

    /// Rotate the live log file now or when the policy says so.
    Rotate(RotateArgs),

    /// List files in the log directory, newest first.
    Files,

    /// Check whether the daemon is running and how full its buffer is.
    Status,

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- shared filters ----

/// Field filters shared by `live` and `search`.
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Exact host match.
    #[arg(long)]
    pub host: Option<String>,

    /// Exact facility match.
    #[arg(long)]
    pub facility: Option<String>,

    /// Exact severity match.
    #[arg(long)]
    pub severity: Option<String>,

    /// Exact program match.
    #[arg(long)]
    pub program: Option<String>,

    /// Exact pid match.
    #[arg(long)]
    pub pid: Option<String>,

    /// Case-insensitive substring of the message.
    #[arg(short, long)]
    pub message: Option<String>,
}

impl From<FilterArgs> for RecordFilter {
    fn from(args: FilterArgs) -> Self {
        Self {
            host: args.host,
            facility: args.facility,
            severity: args.severity,
            program: args.program,
            pid: args.pid,
            message: args.message,
        }
    }
}

// ---- live ----

/// Query the live buffer over the daemon's socket.
#[derive(Args, Debug)]
pub struct LiveArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Number of lines to show (must be one of `query.num_lines_options`).
    #[arg(short = 'n', long)]
    pub num_lines: Option<usize>,

    /// Also print the distinct values available for each filter.
    #[arg(long)]
    pub options: bool,
}

// ---- search ----

/// Search historical files.
///
/// Without `--start`/`--end` the last five minutes are searched.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Range start, inclusive (ISO-8601; naive values use --tz-offset).
    #[arg(long)]
    pub start: Option<String>,

    /// Range end, exclusive.
    #[arg(long)]
    pub end: Option<String>,

    /// Minutes to add to a naive local time to get UTC (e.g. -540 for UTC+9).
    #[arg(long, allow_hyphen_values = true)]
    pub tz_offset: Option<i32>,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Number of lines to show (must be one of `query.num_lines_options`).
    #[arg(short = 'n', long)]
    pub num_lines: Option<usize>,
}

// ---- rotate ----

/// Rotate the live log file.
#[derive(Args, Debug)]
pub struct RotateArgs {
    /// Rotate even if neither the age nor the size limit is reached.
    #[arg(short, long)]
    pub force: bool,
}

// ---- config ----

/// Manage logharbor configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only one section (general, paths, buffer, tailer, rotation, retention, query, metrics).
        #[arg(long)]
        section: Option<String>,
    },
}
