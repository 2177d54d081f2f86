//! Command-line interface definitions using the clap derive API.
//!
//! # Example
//!
//! ```bash
//! # Scan a folder's direct children
//! lumascan ~/Pictures
//!
//! # Recurse, with custom thresholds and JSON output for scripting
//! lumascan ~/Pictures -r --blur-threshold 25 --similarity-threshold 90 --output json
//!
//! # Verbose mode for debugging
//! lumascan -v ~/Pictures
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Image scanning engine: blur scoring plus exact and perceptual duplicate
/// grouping.
///
/// Lumascan walks a folder of images, scores each for blur, and clusters
/// byte-identical duplicates and perceptually similar pairs. It only
/// detects and reports; it never deletes or moves files.
#[derive(Debug, Parser)]
#[command(name = "lumascan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan for images
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Blur score threshold; images scoring strictly above are flagged
    /// (default from config file, else 15)
    #[arg(long, value_name = "SCORE")]
    pub blur_threshold: Option<f64>,

    /// Similarity percentage threshold; pairs at or above are grouped
    /// (default from config file, else 70)
    #[arg(long, value_name = "PERCENT", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub similarity_threshold: Option<u8>,

    /// Persist the resolved thresholds as the new config-file defaults
    #[arg(long)]
    pub save_config: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Number of worker threads for per-file analysis
    #[arg(long, value_name = "N", default_value_t = 4)]
    pub threads: usize,

    /// Emit errors as structured JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and findings
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// Machine-readable JSON on stdout
    Json,
}
