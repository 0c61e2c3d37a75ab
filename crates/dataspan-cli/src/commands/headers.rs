//! Headers command - show how each column header was classified.

use std::path::PathBuf;

use colored::Colorize;
use dataspan::HeaderRole;

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
    let (dataset, source) = dataspan.decode(&file)?;
    let roles = dataspan.classify(&dataset);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&roles)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Header roles for".cyan().bold(),
        source.file.white()
    );
    println!();

    // Declared headers, so columns left out of the first row still show up
    for header in &dataset.headers {
        let matched = roles.roles_of(header);
        let label = if matched.is_empty() {
            "-".dimmed().to_string()
        } else {
            matched
                .iter()
                .map(HeaderRole::label)
                .collect::<Vec<_>>()
                .join(", ")
                .green()
                .to_string()
        };
        println!("  {:30} {}", header, label);
    }

    if verbose {
        let first_row = dataset.header_set();
        let skipped: Vec<&String> = dataset
            .headers
            .iter()
            .filter(|h| !first_row.contains(h))
            .collect();
        if !skipped.is_empty() {
            println!();
            println!(
                "{} {}",
                "Empty in the first row (not classified):".yellow(),
                skipped
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }

    Ok(())
}
