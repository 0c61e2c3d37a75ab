//! Temporal extent of a dataset: earliest start and latest end.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::inference::HeaderClassifier;
use crate::input::Row;
use super::parser::{DateParser, StrictDateParser};
use super::resolver::{MomentResolver, Preference};

/// Earliest start and latest end found across all rows.
///
/// `None` means no usable date was found for that endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateAggregation {
    pub earliest_start: Option<NaiveDateTime>,
    pub latest_end: Option<NaiveDateTime>,
}

impl DateAggregation {
    /// True when neither endpoint was found.
    pub fn is_empty(&self) -> bool {
        self.earliest_start.is_none() && self.latest_end.is_none()
    }
}

impl fmt::Display for DateAggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Earliest start: {}", display_moment(self.earliest_start))?;
        write!(f, "Latest end: {}", display_moment(self.latest_end))
    }
}

fn display_moment(moment: Option<NaiveDateTime>) -> String {
    moment
        .map(|m| m.to_string())
        .unwrap_or_else(|| "Not found".to_string())
}

/// Folds rows through the date columns.
pub struct TemporalAggregator<'a> {
    classifier: &'a HeaderClassifier,
    parser: &'a dyn DateParser,
}

impl<'a> TemporalAggregator<'a> {
    /// Create an aggregator from a classifier and a date parser.
    pub fn new(classifier: &'a HeaderClassifier, parser: &'a dyn DateParser) -> Self {
        Self { classifier, parser }
    }

    /// Compute the temporal extent of `rows`.
    ///
    /// Start values are searched in start, then generic, then end columns;
    /// end values in end, then generic, then start columns. Every row and every
    /// column is visited.
    pub fn aggregate<S: AsRef<str>>(&self, rows: &[Row], headers: &[S]) -> DateAggregation {
        let candidates = self.classifier.classify(headers);
        let start_headers = candidates.start_priority();
        let end_headers = candidates.end_priority();

        debug!(headers = ?start_headers, "start date headers");
        debug!(headers = ?end_headers, "end date headers");

        let resolver = MomentResolver::new(self.parser);
        let mut earliest_start = NaiveDateTime::MAX;
        let mut latest_end = NaiveDateTime::MIN;

        for row in rows {
            for header in &start_headers {
                let raw = row.get(header).map(|v| v.as_text());
                earliest_start =
                    resolver.resolve(raw.as_deref(), earliest_start, Preference::Earliest);
            }
            for header in &end_headers {
                let raw = row.get(header).map(|v| v.as_text());
                latest_end = resolver.resolve(raw.as_deref(), latest_end, Preference::Latest);
            }
        }

        let aggregation = DateAggregation {
            earliest_start: (earliest_start != NaiveDateTime::MAX).then_some(earliest_start),
            latest_end: (latest_end != NaiveDateTime::MIN).then_some(latest_end),
        };

        info!(
            earliest_start = %display_moment(aggregation.earliest_start),
            latest_end = %display_moment(aggregation.latest_end),
            "date aggregation"
        );

        aggregation
    }
}

/// Temporal extent with the built-in header patterns and date parser.
pub fn aggregate_dates<S: AsRef<str>>(rows: &[Row], headers: &[S]) -> DateAggregation {
    let classifier = HeaderClassifier::new();
    let parser = StrictDateParser::new();
    TemporalAggregator::new(&classifier, &parser).aggregate(rows, headers)
}
