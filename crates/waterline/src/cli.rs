//! Clap derive structures for the `waterline` CLI.
//!
//! Defines the command tree, global flags, and shared argument groups.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// waterline -- read a remote water-level sensor feed from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "waterline",
    version,
    about = "Query a remote water-level sensor feed",
    long_about = "Fetches readings from a water-level sensor's JSON feed, normalizes them,\n\
        and reports the latest level, range statistics, trends and history.\n\n\
        Configure a feed once with `waterline config init`, or pass --endpoint.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Feed profile to use
    #[arg(long, short = 'p', env = "WATERLINE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Feed URL (overrides profile)
    #[arg(long, short = 'e', env = "WATERLINE_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "WATERLINE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "WATERLINE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "WATERLINE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one record per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the most recent reading
    #[command(alias = "now")]
    Latest,

    /// List readings newest first, one page at a time
    #[command(alias = "ls")]
    Readings(ReadingsArgs),

    /// Average, maximum and minimum level over a range
    Stats(RangeArgs),

    /// Downsampled level series for charting
    Trend(TrendArgs),

    /// Write every reading to CSV
    Export(ExportArgs),

    /// Poll the feed and print each new reading until interrupted
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Range Arguments ───────────────────────────────────────────

/// Time window selection shared by range-aware commands.
#[derive(Debug, Args)]
pub struct RangeArgs {
    /// Preset window ending now [default: all; 24h for `trend`]
    #[arg(long, short = 'r', conflicts_with_all = ["from", "to"])]
    pub range: Option<RangeChoice>,

    /// First calendar day to include (YYYY-MM-DD, UTC)
    #[arg(long)]
    pub from: Option<String>,

    /// Last calendar day to include (YYYY-MM-DD, UTC)
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RangeChoice {
    /// Last 24 hours
    #[value(name = "24h")]
    Day,
    /// Last 7 days
    #[value(name = "7d")]
    Week,
    /// Last 30 days
    #[value(name = "30d")]
    Month,
    /// Everything the feed returned
    All,
}

// ── Per-command Arguments ────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReadingsArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Page number, starting at 1 (newest readings first)
    #[arg(long, default_value = "1")]
    pub page: usize,
}

#[derive(Debug, Args)]
pub struct TrendArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Maximum number of points to emit
    #[arg(long, default_value = "500")]
    pub points: usize,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Destination file ("-" for stdout)
    #[arg(long, short = 'f', default_value = "water_monitor_data.csv")]
    pub file: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between refreshes (overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (endpoint, timeout, refresh_interval, max_level_cm, ca_cert, insecure)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Print the config file location
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
