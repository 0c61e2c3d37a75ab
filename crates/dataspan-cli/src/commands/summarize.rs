//! Summarize command - report temporal and spatial extent of a data file.

use std::path::PathBuf;

use colored::{ColoredString, Colorize};
use dataspan::Summary;

use super::build_dataspan;
use crate::cli::InputOptions;

pub fn run(
    file: PathBuf,
    json_output: bool,
    options: InputOptions,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let dataspan = build_dataspan(&options)?;
    let summary = dataspan.summarize(&file)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_summary(&summary, verbose);
    Ok(())
}

fn print_summary(summary: &Summary, verbose: bool) {
    println!(
        "{} {} ({} rows, {} columns, {})",
        "Extent of".cyan().bold(),
        summary.source.file.white(),
        summary.source.row_count,
        summary.source.column_count,
        summary.source.format
    );
    println!();

    println!("{}", "Dates:".yellow().bold());
    println!(
        "  Earliest start: {}",
        found_or_not(summary.dates.earliest_start.map(|d| d.to_string()))
    );
    println!(
        "  Latest end:     {}",
        found_or_not(summary.dates.latest_end.map(|d| d.to_string()))
    );
    println!();

    println!("{}", "Bounding box:".yellow().bold());
    println!(
        "  Longitude: {} to {}",
        found_or_not(summary.spatial.min_lng.map(|v| v.to_string())),
        found_or_not(summary.spatial.max_lng.map(|v| v.to_string()))
    );
    println!(
        "  Latitude:  {} to {}",
        found_or_not(summary.spatial.min_lat.map(|v| v.to_string())),
        found_or_not(summary.spatial.max_lat.map(|v| v.to_string()))
    );

    if verbose {
        println!();
        println!("{}", "Columns used:".yellow().bold());
        println!("  Start: {}", summary.roles.start_priority().join(", "));
        println!("  End:   {}", summary.roles.end_priority().join(", "));
        println!("  Lat:   {}", summary.roles.latitude.join(", "));
        println!("  Lng:   {}", summary.roles.longitude.join(", "));
    }

    if summary.is_empty() {
        println!();
        println!(
            "{}",
            "No dates or coordinates found. Try `dataspan headers` to check column matching."
                .dimmed()
        );
    }
}

fn found_or_not(value: Option<String>) -> ColoredString {
    match value {
        Some(v) => v.green(),
        None => "Not found".red(),
    }
}
