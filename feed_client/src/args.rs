//! Command-line arguments for the feed client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::path::PathBuf;

use clap::Parser;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Symbols to look up, e.g. `AAPL` or `NASDAQ:TSLA`. Each one gets its own connection.
    #[arg(required = true)]
    pub symbols: Vec<String>,

    /// Directory to write intraday chart images to. Charts are skipped when omitted.
    #[arg(long)]
    pub chart_dir: Option<PathBuf>,

    /// Print every quote as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}
