//! Parsed date components and parse results.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single calendar/clock field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl Component {
    /// Value used when a field is neither known nor implied.
    fn fallback(&self) -> Option<i32> {
        match self {
            Component::Year => None,
            Component::Month | Component::Day => Some(1),
            Component::Hour | Component::Minute | Component::Second => Some(0),
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::Year => "year",
            Component::Month => "month",
            Component::Day => "day",
            Component::Hour => "hour",
            Component::Minute => "minute",
            Component::Second => "second",
        };
        f.write_str(name)
    }
}

/// Fields extracted from text, split into known (read from the text) and
/// implied (filled in from context, such as the reference year).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedComponents {
    known: BTreeMap<Component, i32>,
    implied: BTreeMap<Component, i32>,
}

impl ParsedComponents {
    /// Create an empty component set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`assign`](Self::assign).
    pub fn with(mut self, component: Component, value: i32) -> Self {
        self.assign(component, value);
        self
    }

    /// Record a field as known.
    pub fn assign(&mut self, component: Component, value: i32) {
        self.implied.remove(&component);
        self.known.insert(component, value);
    }

    /// Record a field as implied, unless it is already known.
    pub fn imply(&mut self, component: Component, value: i32) {
        if !self.known.contains_key(&component) {
            self.implied.insert(component, value);
        }
    }

    /// Drop a known field.
    pub fn forget(&mut self, component: Component) {
        self.known.remove(&component);
    }

    /// True when the field was read from the text.
    pub fn is_certain(&self, component: Component) -> bool {
        self.known.contains_key(&component)
    }

    /// Known value, else implied value.
    pub fn get(&self, component: Component) -> Option<i32> {
        self.known
            .get(&component)
            .or_else(|| self.implied.get(&component))
            .copied()
    }

    /// Known fields only.
    pub fn known_values(&self) -> impl Iterator<Item = (Component, i32)> + '_ {
        self.known.iter().map(|(c, v)| (*c, *v))
    }

    /// Materialize a calendar moment from the current fields.
    ///
    /// Missing month/day default to 1 and missing clock fields to 0. Returns
    /// `None` without a year or when the fields do not form a valid date.
    pub fn date(&self) -> Option<NaiveDateTime> {
        let field = |c: Component| self.get(c).or_else(|| c.fallback());

        let month = u32::try_from(field(Component::Month)?).ok()?;
        let day = u32::try_from(field(Component::Day)?).ok()?;
        let hour = u32::try_from(field(Component::Hour)?).ok()?;
        let minute = u32::try_from(field(Component::Minute)?).ok()?;
        let second = u32::try_from(field(Component::Second)?).ok()?;

        NaiveDate::from_ymd_opt(field(Component::Year)?, month, day)?
            .and_hms_opt(hour, minute, second)
    }
}

/// One match of the date parser: a start and optionally an end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedResult {
    /// The text that was matched.
    pub text: String,
    /// Start of the expressed moment or period.
    pub start: ParsedComponents,
    /// End of the period, for ranges and coarse periods like decades.
    pub end: Option<ParsedComponents>,
}

impl ParsedResult {
    /// A single-moment result.
    pub fn new(text: impl Into<String>, start: ParsedComponents) -> Self {
        Self {
            text: text.into(),
            start,
            end: None,
        }
    }

    /// Attach an end.
    pub fn with_end(mut self, end: ParsedComponents) -> Self {
        self.end = Some(end);
        self
    }
}
