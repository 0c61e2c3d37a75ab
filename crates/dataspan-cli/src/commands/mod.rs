//! CLI command implementations.

pub mod headers;
pub mod summarize;

use dataspan::{Dataspan, DataspanConfig, DecoderConfig, RolePatterns};
use tracing::debug;

use crate::cli::InputOptions;

/// Build a summarizer from command-line options.
pub fn build_dataspan(options: &InputOptions) -> Result<Dataspan, Box<dyn std::error::Error>> {
    debug!(?options, "building summarizer");
    let mut config = DataspanConfig::default();

    let mut decoder = DecoderConfig::default();
    if let Some(delimiter) = options.delimiter {
        decoder = decoder.with_delimiter(delimiter);
    }
    if let Some(max_rows) = options.max_rows {
        decoder = decoder.with_max_rows(max_rows);
    }
    config.decoder = decoder;

    if let Some(ref path) = options.patterns {
        config.patterns = RolePatterns::from_json_file(path)?;
    }

    if let Some(year) = options.reference_year {
        config.dates = config.dates.with_reference_year(year);
    }

    Ok(Dataspan::with_config(config)?)
}
