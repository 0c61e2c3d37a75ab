//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Dataspan: infer the temporal and spatial extent of a tabular dataset
#[derive(Parser)]
#[command(name = "dataspan")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logging; RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report the earliest start, latest end and bounding box of a file
    Summarize {
        /// Path to the data file (CSV/TSV/XLSX/ODS)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        options: InputOptions,
    },

    /// Show which role each header was classified into
    Headers {
        /// Path to the data file (CSV/TSV/XLSX/ODS)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        options: InputOptions,
    },
}

/// Options shared by every command that reads a data file.
#[derive(Args, Clone, Debug, Default)]
pub struct InputOptions {
    /// JSON file with header patterns per role
    #[arg(long, value_name = "FILE")]
    pub patterns: Option<PathBuf>,

    /// Field delimiter for text input (default: detect)
    #[arg(short, long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// Year assumed for dates that name none (default: current year)
    #[arg(long, value_name = "YEAR")]
    pub reference_year: Option<i32>,

    /// Read at most this many data rows
    #[arg(long, value_name = "N")]
    pub max_rows: Option<usize>,
}

/// Accept a single ASCII character, or `\t`/`tab` for tab.
fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "\\t" | "tab" => Ok(b'\t'),
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => Ok(c as u8),
                _ => Err(format!(
                    "Invalid delimiter: {:?}. Use a single ASCII character or \\t.",
                    s
                )),
            }
        }
    }
}
