//! Main Dataspan struct and public API.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{DataspanError, Result};
use crate::inference::{HeaderClassifier, RoleCandidates, RolePatterns};
use crate::input::{Dataset, Decoder, DecoderConfig, InputFormat, SourceMetadata};
use crate::spatial::{SpatialAggregator, SpatialExtent};
use crate::temporal::{DateAggregation, DateParserConfig, StrictDateParser, TemporalAggregator};

/// Configuration for a Dataspan summarizer.
#[derive(Debug, Clone, Default)]
pub struct DataspanConfig {
    /// Decoder configuration.
    pub decoder: DecoderConfig,
    /// Header patterns for each role.
    pub patterns: RolePatterns,
    /// Date parser configuration.
    pub dates: DateParserConfig,
}

/// Temporal and spatial extent of one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// Metadata about the source file.
    pub source: SourceMetadata,
    /// Headers matched to each role.
    pub roles: RoleCandidates,
    /// Earliest start and latest end.
    pub dates: DateAggregation,
    /// Latitude/longitude bounding box.
    pub spatial: SpatialExtent,
}

impl Summary {
    /// True when neither extent found anything.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() && self.spatial.is_empty()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.dates)?;
        write!(f, "{}", self.spatial)
    }
}

/// The main extent summarizer.
pub struct Dataspan {
    decoder: Decoder,
    classifier: HeaderClassifier,
    parser: StrictDateParser,
}

impl Dataspan {
    /// Create a summarizer with the built-in patterns and parser.
    pub fn new() -> Self {
        Self {
            decoder: Decoder::new(),
            classifier: HeaderClassifier::new(),
            parser: StrictDateParser::new(),
        }
    }

    /// Create a summarizer with custom configuration.
    ///
    /// Fails when a header pattern does not compile.
    pub fn with_config(config: DataspanConfig) -> Result<Self> {
        Ok(Self {
            decoder: Decoder::with_config(config.decoder),
            classifier: HeaderClassifier::with_patterns(&config.patterns)?,
            parser: StrictDateParser::with_config(config.dates),
        })
    }

    /// Decode a file and summarize its extents.
    pub fn summarize(&self, path: impl AsRef<Path>) -> Result<Summary> {
        let path = path.as_ref();
        info!(path = %path.display(), "summarizing file");

        let (dataset, source) = self.decoder.decode_file(path)?;
        self.summarize_with_source(&dataset, source)
    }

    /// Decode an in-memory buffer and summarize its extents.
    pub fn summarize_bytes(&self, bytes: &[u8], format: Option<InputFormat>) -> Result<Summary> {
        let dataset = self.decoder.decode_bytes(bytes, format)?;

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let source = SourceMetadata::new(
            PathBuf::new(),
            format!("sha256:{:x}", hasher.finalize()),
            bytes.len() as u64,
            format.map(|f| f.label()).unwrap_or_else(|| "detected".to_string()),
            dataset.row_count(),
            dataset.column_count(),
        );

        self.summarize_with_source(&dataset, source)
    }

    /// Summarize an already decoded dataset.
    ///
    /// A dataset with no rows is an error; no aggregation is attempted.
    pub fn summarize_dataset(&self, dataset: &Dataset) -> Result<Summary> {
        let source = SourceMetadata::new(
            PathBuf::new(),
            String::new(),
            0,
            "dataset".to_string(),
            dataset.row_count(),
            dataset.column_count(),
        );
        self.summarize_with_source(dataset, source)
    }

    /// Decode a file without summarizing it.
    pub fn decode(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        self.decoder.decode_file(path)
    }

    /// Classify headers without aggregating.
    pub fn classify(&self, dataset: &Dataset) -> RoleCandidates {
        self.classifier.classify(&dataset.header_set())
    }

    fn summarize_with_source(&self, dataset: &Dataset, source: SourceMetadata) -> Result<Summary> {
        if dataset.is_empty() {
            return Err(DataspanError::EmptyData(
                "decoded dataset has no rows".to_string(),
            ));
        }

        let headers = dataset.header_set();
        debug!(rows = dataset.row_count(), headers = ?headers, "aggregating");

        let roles = self.classifier.classify(&headers);
        let dates =
            TemporalAggregator::new(&self.classifier, &self.parser).aggregate(&dataset.rows, &headers);
        let spatial = SpatialAggregator::new(&self.classifier).calculate(&dataset.rows, &headers);

        Ok(Summary {
            source,
            roles,
            dates,
            spatial,
        })
    }
}

impl Default for Dataspan {
    fn default() -> Self {
        Self::new()
    }
}
