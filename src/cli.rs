//! Command-line interface definitions for homefeed.
//!
//! # Example
//!
//! ```bash
//! # Newest twenty items across the configured folders
//! homefeed images --limit 20
//!
//! # One directory, creation-time fallback, as JSON
//! homefeed folder ~/Pictures/2024 --date-source ctime --output json
//!
//! # Folder summaries for an ad-hoc folder list
//! homefeed leaves --folder /mnt/nas/photos --slow-storage
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::dates::DateSource;

/// Newest-first media listings for a set of photo folders.
///
/// Dates come from embedded EXIF capture times where available and from
/// filesystem timestamps otherwise. Embedded dates are cached on disk so
/// each photo is read at most once.
#[derive(Debug, Parser)]
#[command(name = "homefeed")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (default: platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List all media, newest first
    Images(ScanOptions),
    /// List media directly inside one directory, newest first
    Folder(FolderArgs),
    /// Summarize directories that directly contain media
    Leaves(ScanOptions),
    /// Show the metadata date cache location and size
    CacheInfo,
    /// Print the effective configuration as TOML
    Config,
}

/// Options shared by the listing subcommands.
#[derive(Debug, Clone, Default, Args)]
pub struct ScanOptions {
    /// Library folder (repeatable); replaces the configured folders
    #[arg(long = "folder", value_name = "DIR")]
    pub folders: Vec<PathBuf>,

    /// Filesystem timestamp used when a file has no embedded date
    #[arg(long, value_enum)]
    pub date_source: Option<DateSource>,

    /// Use the longer slow-storage TTL
    #[arg(long)]
    pub slow_storage: bool,

    /// Ignore videos larger than this (e.g., 500MiB, 2GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_video_size: Option<u64>,

    /// Print at most N entries
    #[arg(short = 'n', long, value_name = "N")]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the folder subcommand.
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Directory to list
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    #[command(flatten)]
    pub scan: ScanOptions,
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Decimal (KB, MB, ...) and binary (KiB, MiB, ...) suffixes are accepted,
/// case-insensitively. A bare number is bytes.
///
/// # Examples
///
/// ```
/// use homefeed::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("500MiB").unwrap(), 524_288_000);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty or not a size.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }
    if s.starts_with('-') {
        return Err("Size cannot be negative".to_string());
    }
    s.parse::<bytesize::ByteSize>()
        .map(|size| size.as_u64())
        .map_err(|e| format!("Invalid size '{s}': {e}"))
}
