//! Command-line interface definitions for dupsweep.
//!
//! # Example
//!
//! ```bash
//! # Report duplicates under two trees
//! dupsweep scan ~/Downloads ~/Pictures
//!
//! # JSON output for scripting
//! dupsweep scan ~/Downloads --output json
//!
//! # Keep the newest copy of every group, trash the rest
//! dupsweep scan ~/Downloads --delete --keep newest --trash -y
//!
//! # Delete specific files, tolerating ones that are already gone
//! dupsweep delete ~/Downloads/copy-1.bin ~/Downloads/copy-2.bin
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::duplicates::RetentionPolicy;

/// Find byte-identical files and reclaim the space they waste.
#[derive(Debug, Parser)]
#[command(name = "dupsweep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors and results
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file to use instead of the platform default
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan directories for duplicate files
    Scan(ScanArgs),
    /// Delete files, ignoring ones that no longer exist
    Delete(DeleteArgs),
    /// Print the effective configuration as TOML
    Config,
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directories to scan
    #[arg(value_name = "ROOT", required = true)]
    pub roots: Vec<PathBuf>,

    /// Number of hashing threads (0 = one per CPU)
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Confirm hash matches with a byte-by-byte comparison
    #[arg(long)]
    pub paranoid: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Delete every duplicate except the copy chosen by --keep
    #[arg(long)]
    pub delete: bool,

    /// Which copy of each group survives --delete
    #[arg(long, value_enum, default_value_t = KeepArg::First, requires = "delete")]
    pub keep: KeepArg,

    /// Move deleted files to the system trash
    #[arg(long, requires = "delete")]
    pub trash: bool,

    /// Do not ask for confirmation before deleting
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the delete subcommand.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Files to delete
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Move files to the system trash instead of unlinking them
    #[arg(long)]
    pub trash: bool,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// JSON document for scripting
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

/// Retention choice for `--keep`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeepArg {
    /// First copy in discovery order
    First,
    /// Most recently modified copy
    Newest,
    /// Least recently modified copy
    Oldest,
    /// Copy with the shortest path
    ShortestPath,
}

impl From<KeepArg> for RetentionPolicy {
    fn from(arg: KeepArg) -> Self {
        match arg {
            KeepArg::First => RetentionPolicy::First,
            KeepArg::Newest => RetentionPolicy::Newest,
            KeepArg::Oldest => RetentionPolicy::Oldest,
            KeepArg::ShortestPath => RetentionPolicy::ShortestPath,
        }
    }
}
