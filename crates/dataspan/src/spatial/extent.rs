//! Spatial extent of a dataset: a latitude/longitude bounding box.

use std::fmt;
use std::ops::RangeInclusive;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::inference::HeaderClassifier;
use crate::input::{CellValue, Row};

/// Physically plausible latitudes.
pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;

/// Plausible longitudes. Wide enough for both the [-180, 180] and [0, 360]
/// conventions.
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -360.0..=360.0;

static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").unwrap());

/// Bounding box found across all rows. `None` marks a bound that was not found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpatialExtent {
    pub min_lat: Option<f64>,
    pub max_lat: Option<f64>,
    pub min_lng: Option<f64>,
    pub max_lng: Option<f64>,
}

impl SpatialExtent {
    /// True when no bound was found.
    pub fn is_empty(&self) -> bool {
        self.min_lat.is_none()
            && self.max_lat.is_none()
            && self.min_lng.is_none()
            && self.max_lng.is_none()
    }
}

impl fmt::Display for SpatialExtent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Longitude: {} to {}",
            display_bound(self.min_lng),
            display_bound(self.max_lng)
        )?;
        write!(
            f,
            "Latitude: {} to {}",
            display_bound(self.min_lat),
            display_bound(self.max_lat)
        )
    }
}

fn display_bound(bound: Option<f64>) -> String {
    bound
        .map(|b| b.to_string())
        .unwrap_or_else(|| "Not found".to_string())
}

/// Running min/max for one axis.
#[derive(Debug, Clone, Copy)]
struct AxisBounds {
    min: f64,
    max: f64,
}

impl AxisBounds {
    fn new() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Max keeps strictly greater values; min keeps lesser-or-equal values.
    fn fold(&mut self, value: f64) {
        if value > self.max {
            self.max = value;
        }
        if value <= self.min {
            self.min = value;
        }
    }

    fn finish(self) -> (Option<f64>, Option<f64>) {
        (
            (self.min != f64::INFINITY).then_some(self.min),
            (self.max != f64::NEG_INFINITY).then_some(self.max),
        )
    }
}

/// Folds rows through the latitude and longitude columns.
pub struct SpatialAggregator<'a> {
    classifier: &'a HeaderClassifier,
}

impl<'a> SpatialAggregator<'a> {
    /// Create an aggregator from a classifier.
    pub fn new(classifier: &'a HeaderClassifier) -> Self {
        Self { classifier }
    }

    /// Compute the bounding box of `rows`.
    ///
    /// Unparsable or out-of-range cells are skipped.
    pub fn calculate<S: AsRef<str>>(&self, rows: &[Row], headers: &[S]) -> SpatialExtent {
        let candidates = self.classifier.classify(headers);

        debug!(headers = ?candidates.longitude, "longitude headers");
        debug!(headers = ?candidates.latitude, "latitude headers");

        let mut lat = AxisBounds::new();
        let mut lng = AxisBounds::new();

        for row in rows {
            fold_axis(row, &candidates.latitude, &LATITUDE_RANGE, &mut lat);
            fold_axis(row, &candidates.longitude, &LONGITUDE_RANGE, &mut lng);
        }

        let (min_lat, max_lat) = lat.finish();
        let (min_lng, max_lng) = lng.finish();
        let extent = SpatialExtent {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        };

        info!(
            longitude = %format!("{} to {}", display_bound(min_lng), display_bound(max_lng)),
            latitude = %format!("{} to {}", display_bound(min_lat), display_bound(max_lat)),
            "spatial extent"
        );

        extent
    }
}

fn fold_axis(row: &Row, headers: &[String], range: &RangeInclusive<f64>, bounds: &mut AxisBounds) {
    for header in headers {
        let Some(cell) = row.get(header) else {
            continue;
        };
        match coordinate_value(cell) {
            Some(value) if range.contains(&value) => bounds.fold(value),
            _ => trace!(header = %header, cell = %cell, "skipped coordinate"),
        }
    }
}

/// Numeric value of a coordinate cell, if it has one.
fn coordinate_value(cell: &CellValue) -> Option<f64> {
    let value = match cell.as_number() {
        Some(n) => n,
        None => parse_leading_float(&cell.as_text())?,
    };
    (!value.is_nan()).then_some(value)
}

/// Parse the longest numeric prefix of `text`, ignoring leading whitespace.
///
/// `"45.2 N"` gives 45.2; `"N 45.2"` gives `None`.
pub fn parse_leading_float(text: &str) -> Option<f64> {
    let found = LEADING_NUMBER.find(text.trim_start())?;
    found.as_str().parse().ok()
}

/// Spatial extent with the built-in header patterns.
pub fn calculate_spatial_extent<S: AsRef<str>>(rows: &[Row], headers: &[S]) -> SpatialExtent {
    let classifier = HeaderClassifier::new();
    SpatialAggregator::new(&classifier).calculate(rows, headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::row_from_pairs;

    #[test]
    fn test_bounding_box() {
        let rows = vec![
            row_from_pairs([("Lat", "45.0"), ("Long", "-120.0")]),
            row_from_pairs([("Lat", "50.5"), ("Long", "-119.0")]),
        ];
        let extent = calculate_spatial_extent(&rows, &["Lat", "Long"]);

        assert_eq!(extent.min_lat, Some(45.0));
        assert_eq!(extent.max_lat, Some(50.5));
        assert_eq!(extent.min_lng, Some(-120.0));
        assert_eq!(extent.max_lng, Some(-119.0));
    }

    #[test]
    fn test_out_of_range_latitude_ignored() {
        let rows = vec![row_from_pairs([("Lat", "999")])];
        let extent = calculate_spatial_extent(&rows, &["Lat"]);
        assert!(extent.is_empty());
    }

    #[test]
    fn test_range_edges() {
        let rows = vec![
            row_from_pairs([("lat", "90"), ("lng", "360")]),
            row_from_pairs([("lat", "-90"), ("lng", "-360")]),
            row_from_pairs([("lat", "90.0001"), ("lng", "-360.5")]),
        ];
        let extent = calculate_spatial_extent(&rows, &["lat", "lng"]);

        assert_eq!(extent.max_lat, Some(90.0));
        assert_eq!(extent.min_lat, Some(-90.0));
        assert_eq!(extent.max_lng, Some(360.0));
        assert_eq!(extent.min_lng, Some(-360.0));
    }

    #[test]
    fn test_zero_is_a_coordinate() {
        let rows = vec![row_from_pairs([("Lat", "0"), ("Long", "0.0")])];
        let extent = calculate_spatial_extent(&rows, &["Lat", "Long"]);

        assert_eq!(extent.min_lat, Some(0.0));
        assert_eq!(extent.max_lat, Some(0.0));
        assert_eq!(extent.min_lng, Some(0.0));
        assert_eq!(extent.max_lng, Some(0.0));
    }

    #[test]
    fn test_signed_zero_ties() {
        let rows = vec![
            row_from_pairs([("Lat", "0")]),
            row_from_pairs([("Lat", "-0")]),
        ];
        let extent = calculate_spatial_extent(&rows, &["Lat"]);

        // Min takes the later equal value, max keeps the earlier one
        let min = extent.min_lat.unwrap();
        let max = extent.max_lat.unwrap();
        assert_eq!(min, 0.0);
        assert!(min.is_sign_negative());
        assert_eq!(max, 0.0);
        assert!(max.is_sign_positive());
    }

    #[test]
    fn test_unparsable_cells_skipped() {
        let rows = vec![
            row_from_pairs([("Lat", "north"), ("Long", "n/a")]),
            row_from_pairs([("Lat", "12.5"), ("Long", "")]),
        ];
        let extent = calculate_spatial_extent(&rows, &["Lat", "Long"]);

        assert_eq!(extent.min_lat, Some(12.5));
        assert_eq!(extent.max_lat, Some(12.5));
        assert_eq!(extent.min_lng, None);
        assert_eq!(extent.max_lng, None);
    }

    #[test]
    fn test_numeric_cells() {
        let mut row = Row::new();
        row.insert("latitude".to_string(), CellValue::Number(-33.9));
        row.insert("longitude".to_string(), CellValue::Number(f64::NAN));
        let extent = calculate_spatial_extent(&[row], &["latitude", "longitude"]);

        assert_eq!(extent.min_lat, Some(-33.9));
        assert_eq!(extent.min_lng, None);
    }

    #[test]
    fn test_multiple_latitude_columns() {
        let rows = vec![row_from_pairs([("lat_start", "10"), ("lat_end", "20")])];
        let extent = calculate_spatial_extent(&rows, &["lat_start", "lat_end"]);

        assert_eq!(extent.min_lat, Some(10.0));
        assert_eq!(extent.max_lat, Some(20.0));
    }

    #[test]
    fn test_parse_leading_float() {
        assert_eq!(parse_leading_float("45.2 N"), Some(45.2));
        assert_eq!(parse_leading_float("  -120"), Some(-120.0));
        assert_eq!(parse_leading_float(".5"), Some(0.5));
        assert_eq!(parse_leading_float("1e2x"), Some(100.0));
        assert_eq!(parse_leading_float("7."), Some(7.0));
        assert_eq!(parse_leading_float("N 45.2"), None);
        assert_eq!(parse_leading_float(""), None);
        assert_eq!(parse_leading_float("-"), None);
    }

    #[test]
    fn test_display() {
        let extent = SpatialExtent {
            min_lat: Some(45.0),
            max_lat: Some(50.5),
            min_lng: None,
            max_lng: None,
        };
        let text = extent.to_string();
        assert!(text.contains("Longitude: Not found to Not found"));
        assert!(text.contains("Latitude: 45 to 50.5"));
    }
}
