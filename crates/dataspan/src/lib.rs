//! Dataspan: temporal and spatial extent inference for tabular datasets.
//!
//! Dataspan takes a table whose schema is unknown in advance and works out
//! which columns hold dates and coordinates, then folds every row into an
//! earliest start, a latest end and a latitude/longitude bounding box.
//!
//! # Core Principles
//!
//! - **Schema-free**: Columns are found by header name patterns, not declared
//! - **Forgiving**: Cells that do not parse are skipped, never fatal
//! - **Partial results**: Dates and coordinates are reported independently
//!
//! # Example
//!
//! ```no_run
//! use dataspan::Dataspan;
//!
//! let dataspan = Dataspan::new();
//! let summary = dataspan.summarize("observations.csv").unwrap();
//!
//! println!("{}", summary.dates);
//! println!("{}", summary.spatial);
//! ```

pub mod error;
pub mod inference;
pub mod input;
pub mod spatial;
pub mod temporal;

mod dataspan;

pub use crate::dataspan::{Dataspan, DataspanConfig, Summary};
pub use error::{DataspanError, Result};
pub use inference::{HeaderClassifier, HeaderRole, RoleCandidates, RolePatterns};
pub use input::{CellValue, Dataset, Decoder, DecoderConfig, InputFormat, Row, SourceMetadata};
pub use spatial::{calculate_spatial_extent, SpatialAggregator, SpatialExtent};
pub use temporal::{
    aggregate_dates, DateAggregation, DateParser, DateParserConfig, MomentResolver, Preference,
    StrictDateParser, TemporalAggregator,
};
