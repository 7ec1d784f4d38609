//! CLI parse: clap types for mirror-move. No behavior; definitions only.

use crate::map::HashAlgorithm;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// mirror-move - reorganize a directory to match a target content-hash map
#[derive(Parser, Debug)]
#[command(name = "mirror-move")]
#[command(about = "Reorganize a directory to match a target layout using content-hash maps")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over defaults and the global file)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Also append log records to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build or refresh the content-hash map of a directory
    Scan {
        /// Directory to scan
        root: PathBuf,
        /// Hash map file; read as the previous map when it exists, then replaced
        output: PathBuf,
        /// Re-hash every file instead of trusting unchanged size and mtime
        #[arg(long)]
        force: bool,
        /// Content hash algorithm
        #[arg(long, value_enum)]
        algorithm: Option<HashAlgorithm>,
        /// Persist progress after this many newly hashed files (0 disables)
        #[arg(long)]
        checkpoint_every: Option<usize>,
    },
    /// Move files so the current layout matches the target map
    Reconcile {
        /// Base directory containing the files to move
        base_directory: PathBuf,
        /// Hash map describing the current layout
        current_map: PathBuf,
        /// Hash map describing the target layout (source of truth)
        target_map: PathBuf,
        /// Report what would be moved without touching the filesystem (default)
        #[arg(long, conflicts_with = "execute")]
        dry_run: bool,
        /// Actually perform the moves
        #[arg(long)]
        execute: bool,
        /// Report format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
