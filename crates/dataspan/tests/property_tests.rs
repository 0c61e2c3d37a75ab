//! Property-based tests for the header classifier and the aggregators.
//!
//! These tests use proptest to generate random inputs and check that the
//! aggregators keep their invariants on any data.
//!
//! # Running Property Tests
//!
//! ```bash
//! # Run all property tests
//! cargo test -p dataspan --test property_tests
//!
//! # Run with more cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p dataspan --test property_tests
//! ```

use proptest::prelude::*;

use dataspan::input::row_from_pairs;
use dataspan::spatial::parse_leading_float;
use dataspan::{
    aggregate_dates, calculate_spatial_extent, HeaderClassifier, HeaderRole, Row,
    StrictDateParser, DateParser, DateParserConfig,
};

// =============================================================================
// Test Strategies
// =============================================================================

/// Arbitrary header-like names.
fn header_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z_ ]{1,20}",
        Just("Lat".to_string()),
        Just("Long".to_string()),
        Just("StartDate".to_string()),
        Just("EndDate".to_string()),
        Just("Year".to_string()),
    ]
}

/// Arbitrary cell text, biased towards numbers and date-like strings.
fn cell_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 .:/\\-]{0,20}",
        (-1000.0f64..1000.0).prop_map(|f| f.to_string()),
        (1000i32..2100).prop_map(|y| y.to_string()),
    ]
}

/// Rows over a fixed header list.
fn rows_for(headers: Vec<String>) -> impl Strategy<Value = Vec<Row>> {
    let width = headers.len();
    prop::collection::vec(prop::collection::vec(cell_text(), width), 1..20).prop_map(
        move |rows| {
            rows.into_iter()
                .map(|cells| row_from_pairs(headers.iter().cloned().zip(cells)))
                .collect()
        },
    )
}

// =============================================================================
// Header Classifier
// =============================================================================

proptest! {
    #[test]
    fn candidates_keep_header_order_without_duplicates(
        headers in prop::collection::vec(header_name(), 0..15)
    ) {
        let classifier = HeaderClassifier::new();
        let candidates = classifier.classify(&headers);

        for role in HeaderRole::ALL {
            let list = candidates.get(role);

            // Every candidate comes from the input
            for h in list {
                prop_assert!(headers.contains(h));
            }

            // No duplicates
            let mut seen = std::collections::HashSet::new();
            for h in list {
                prop_assert!(seen.insert(h.clone()));
            }

            // Relative order follows the input
            let positions: Vec<usize> = list
                .iter()
                .map(|h| headers.iter().position(|x| x == h).unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn classify_is_deterministic(headers in prop::collection::vec(header_name(), 0..15)) {
        let classifier = HeaderClassifier::new();
        prop_assert_eq!(classifier.classify(&headers), classifier.classify(&headers));
    }
}

// =============================================================================
// Spatial Aggregation
// =============================================================================

proptest! {
    #[test]
    fn spatial_bounds_stay_in_range(
        rows in rows_for(vec!["Lat".to_string(), "Long".to_string()])
    ) {
        let extent = calculate_spatial_extent(&rows, &["Lat", "Long"]);

        for v in [extent.min_lat, extent.max_lat].into_iter().flatten() {
            prop_assert!((-90.0..=90.0).contains(&v));
        }
        for v in [extent.min_lng, extent.max_lng].into_iter().flatten() {
            prop_assert!((-360.0..=360.0).contains(&v));
        }

        if let (Some(min), Some(max)) = (extent.min_lat, extent.max_lat) {
            prop_assert!(min <= max);
        }
        if let (Some(min), Some(max)) = (extent.min_lng, extent.max_lng) {
            prop_assert!(min <= max);
        }

        // Each axis is found at both ends or at neither
        prop_assert_eq!(extent.min_lat.is_some(), extent.max_lat.is_some());
        prop_assert_eq!(extent.min_lng.is_some(), extent.max_lng.is_some());
    }

    #[test]
    fn out_of_range_latitudes_never_count(
        values in prop::collection::vec(
            prop_oneof![90.0001f64..1.0e6, -1.0e6f64..-90.0001],
            1..20,
        )
    ) {
        let rows: Vec<Row> = values
            .iter()
            .map(|v| row_from_pairs([("Lat", v.to_string())]))
            .collect();

        let extent = calculate_spatial_extent(&rows, &["Lat"]);
        prop_assert!(extent.is_empty());
    }

    #[test]
    fn spatial_is_idempotent(
        rows in rows_for(vec!["Lat".to_string(), "Long".to_string()])
    ) {
        let headers = ["Lat", "Long"];
        prop_assert_eq!(
            calculate_spatial_extent(&rows, &headers),
            calculate_spatial_extent(&rows, &headers)
        );
    }

    #[test]
    fn leading_float_never_panics(s in "\\PC{0,30}") {
        let _ = parse_leading_float(&s);
    }

    #[test]
    fn leading_float_reads_plain_numbers(f in -1.0e6f64..1.0e6) {
        prop_assert_eq!(parse_leading_float(&f.to_string()), Some(f));
    }
}

// =============================================================================
// Temporal Aggregation
// =============================================================================

proptest! {
    #[test]
    fn start_never_after_end_for_year_columns(
        years in prop::collection::vec((1000i32..2100, 1000i32..2100), 1..20)
    ) {
        let rows: Vec<Row> = years
            .iter()
            .map(|(s, e)| row_from_pairs([("StartDate", s.to_string()), ("EndDate", e.to_string())]))
            .collect();

        let agg = aggregate_dates(&rows, &["StartDate", "EndDate"]);
        let (start, end) = (agg.earliest_start.unwrap(), agg.latest_end.unwrap());

        prop_assert!(start <= end);

        let min_year = years.iter().flat_map(|(s, e)| [*s, *e]).min().unwrap();
        let max_year = years.iter().flat_map(|(s, e)| [*s, *e]).max().unwrap();
        prop_assert_eq!(start.format("%Y").to_string(), format!("{:04}", min_year));
        prop_assert_eq!(end.format("%Y").to_string(), format!("{:04}", max_year));
    }

    #[test]
    fn no_date_headers_means_no_dates(
        rows in rows_for(vec!["name".to_string(), "value".to_string()])
    ) {
        let agg = aggregate_dates(&rows, &["name", "value"]);
        prop_assert!(agg.is_empty());
    }

    #[test]
    fn temporal_is_idempotent(
        rows in rows_for(vec!["StartDate".to_string(), "EndDate".to_string()])
    ) {
        let headers = ["StartDate", "EndDate"];
        prop_assert_eq!(aggregate_dates(&rows, &headers), aggregate_dates(&rows, &headers));
    }

    #[test]
    fn strict_parser_never_panics(s in "\\PC{0,40}") {
        let parser = StrictDateParser::with_config(DateParserConfig::default().with_reference_year(2000));
        let _ = parser.parse_strict(&s);
    }
}
