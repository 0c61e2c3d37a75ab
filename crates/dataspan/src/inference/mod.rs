//! Header inference: mapping column names to extent roles.

mod headers;

pub use headers::{try_filter_headers, HeaderClassifier, HeaderRole, RoleCandidates, RolePatterns};
