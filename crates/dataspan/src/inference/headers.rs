//! Header classification: which columns look like dates or coordinates.
//!
//! Each [`HeaderRole`] owns an ordered list of patterns tried with fallback
//! priority. The first pattern that matches at least one header decides the
//! role's candidates; later patterns are only consulted when earlier ones match
//! nothing. Matching is case-insensitive and unanchored.

use std::fmt;
use std::fs;
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DataspanError, Result};

/// Tokens that mark a header as holding some kind of date.
const DATE_PART: &str = "(date|dt|decade|year)";

/// Semantic role a header can play in extent extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderRole {
    /// Start of a period (e.g., `StartDate`, `st_dt`).
    StartDate,
    /// End of a period (e.g., `EndDate`, `end_year`).
    EndDate,
    /// Any date-like column.
    Date,
    /// Latitude.
    Latitude,
    /// Longitude.
    Longitude,
}

impl HeaderRole {
    /// All roles, in reporting order.
    pub const ALL: [HeaderRole; 5] = [
        HeaderRole::StartDate,
        HeaderRole::EndDate,
        HeaderRole::Date,
        HeaderRole::Latitude,
        HeaderRole::Longitude,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            HeaderRole::StartDate => "start date",
            HeaderRole::EndDate => "end date",
            HeaderRole::Date => "date",
            HeaderRole::Latitude => "latitude",
            HeaderRole::Longitude => "longitude",
        }
    }
}

impl fmt::Display for HeaderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pattern configuration: role to ordered fallback patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolePatterns {
    pub start_date: Vec<String>,
    pub end_date: Vec<String>,
    pub date: Vec<String>,
    pub latitude: Vec<String>,
    pub longitude: Vec<String>,
}

impl Default for RolePatterns {
    fn default() -> Self {
        Self {
            start_date: vec![format!("(start|st).*{}", DATE_PART)],
            end_date: vec![format!("(end).*{}", DATE_PART)],
            date: vec![DATE_PART.to_string()],
            latitude: vec![spatial_pattern("lat|latitude|lt")],
            longitude: vec![spatial_pattern("long|lng|longitude")],
        }
    }
}

/// A coordinate token that must not run on into a trailing letter.
fn spatial_pattern(part: &str) -> String {
    format!("({})($|[^a-zA-Z^])", part)
}

impl RolePatterns {
    /// Patterns configured for a role.
    pub fn for_role(&self, role: HeaderRole) -> &[String] {
        match role {
            HeaderRole::StartDate => &self.start_date,
            HeaderRole::EndDate => &self.end_date,
            HeaderRole::Date => &self.date,
            HeaderRole::Latitude => &self.latitude,
            HeaderRole::Longitude => &self.longitude,
        }
    }

    /// Load patterns from a JSON document. Roles left out keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load patterns from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| DataspanError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&contents)
    }
}

/// Candidate headers for every role, in original header order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCandidates {
    pub start_date: Vec<String>,
    pub end_date: Vec<String>,
    pub date: Vec<String>,
    pub latitude: Vec<String>,
    pub longitude: Vec<String>,
}

impl RoleCandidates {
    /// Candidates for one role.
    pub fn get(&self, role: HeaderRole) -> &[String] {
        match role {
            HeaderRole::StartDate => &self.start_date,
            HeaderRole::EndDate => &self.end_date,
            HeaderRole::Date => &self.date,
            HeaderRole::Latitude => &self.latitude,
            HeaderRole::Longitude => &self.longitude,
        }
    }

    fn get_mut(&mut self, role: HeaderRole) -> &mut Vec<String> {
        match role {
            HeaderRole::StartDate => &mut self.start_date,
            HeaderRole::EndDate => &mut self.end_date,
            HeaderRole::Date => &mut self.date,
            HeaderRole::Latitude => &mut self.latitude,
            HeaderRole::Longitude => &mut self.longitude,
        }
    }

    /// Every role a header was classified into.
    pub fn roles_of(&self, header: &str) -> Vec<HeaderRole> {
        HeaderRole::ALL
            .into_iter()
            .filter(|role| self.get(*role).iter().any(|h| h == header))
            .collect()
    }

    /// Headers to visit when looking for a period start:
    /// start headers, then generic dates, then end headers.
    pub fn start_priority(&self) -> Vec<String> {
        concat_unique([&self.start_date, &self.date, &self.end_date])
    }

    /// Headers to visit when looking for a period end:
    /// end headers, then generic dates, then start headers.
    pub fn end_priority(&self) -> Vec<String> {
        concat_unique([&self.end_date, &self.date, &self.start_date])
    }
}

fn concat_unique(lists: [&Vec<String>; 3]) -> Vec<String> {
    let merged: IndexSet<&String> = lists.into_iter().flatten().collect();
    merged.into_iter().cloned().collect()
}

static DEFAULT_ROLE_REGEXES: Lazy<IndexMap<HeaderRole, Vec<Regex>>> = Lazy::new(|| {
    compile_patterns(&RolePatterns::default()).unwrap()
});

fn compile_patterns(patterns: &RolePatterns) -> Result<IndexMap<HeaderRole, Vec<Regex>>> {
    let mut compiled = IndexMap::new();
    for role in HeaderRole::ALL {
        let regexes = patterns
            .for_role(role)
            .iter()
            .map(|p| {
                RegexBuilder::new(p).case_insensitive(true).build().map_err(|e| {
                    DataspanError::Config(format!("invalid {} pattern '{}': {}", role, p, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        compiled.insert(role, regexes);
    }
    Ok(compiled)
}

/// Classifies column headers into [`HeaderRole`]s.
#[derive(Debug, Clone)]
pub struct HeaderClassifier {
    patterns: IndexMap<HeaderRole, Vec<Regex>>,
}

impl HeaderClassifier {
    /// Create a classifier with the built-in patterns.
    pub fn new() -> Self {
        Self {
            patterns: DEFAULT_ROLE_REGEXES.clone(),
        }
    }

    /// Create a classifier from pattern configuration.
    pub fn with_patterns(patterns: &RolePatterns) -> Result<Self> {
        Ok(Self {
            patterns: compile_patterns(patterns)?,
        })
    }

    /// Classify headers into per-role candidate lists.
    pub fn classify<S: AsRef<str>>(&self, headers: &[S]) -> RoleCandidates {
        let mut candidates = RoleCandidates::default();
        for role in HeaderRole::ALL {
            *candidates.get_mut(role) = self.candidates(headers, role);
        }

        debug!(
            start_date = ?candidates.start_date,
            end_date = ?candidates.end_date,
            date = ?candidates.date,
            latitude = ?candidates.latitude,
            longitude = ?candidates.longitude,
            "classified headers"
        );

        candidates
    }

    /// Candidates for a single role.
    pub fn candidates<S: AsRef<str>>(&self, headers: &[S], role: HeaderRole) -> Vec<String> {
        match self.patterns.get(&role) {
            Some(regexes) => try_filter_headers(headers, regexes),
            None => Vec::new(),
        }
    }
}

impl Default for HeaderClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Headers matched by the first pattern that matches anything.
///
/// Order follows `headers`; duplicates are dropped.
pub fn try_filter_headers<S: AsRef<str>>(headers: &[S], patterns: &[Regex]) -> Vec<String> {
    for pattern in patterns {
        let matching: IndexSet<&str> = headers
            .iter()
            .map(|h| h.as_ref())
            .filter(|h| pattern.is_match(h))
            .collect();

        if !matching.is_empty() {
            return matching.into_iter().map(str::to_string).collect();
        }
    }

    Vec::new()
}
