//! Temporal extent extraction: date parsing, moment resolution, aggregation.

mod aggregate;
mod components;
mod parser;
mod resolver;

pub use aggregate::{aggregate_dates, DateAggregation, TemporalAggregator};
pub use components::{Component, ParsedComponents, ParsedResult};
pub use parser::{DateParser, DateParserConfig, StrictDateParser};
pub use resolver::{prefer_years, MomentResolver, Preference};
