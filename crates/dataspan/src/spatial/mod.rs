//! Spatial aggregation over latitude/longitude columns.

mod extent;

pub use extent::{
    calculate_spatial_extent, parse_leading_float, SpatialAggregator, SpatialExtent,
    LATITUDE_RANGE, LONGITUDE_RANGE,
};
