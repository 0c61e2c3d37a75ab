//! Strict free-text date parsing.
//!
//! "Strict" means the whole cell must read as one recognised date, period or
//! range; partial matches inside longer text are rejected. The parser only
//! reports which fields it read. Choosing a moment from the result is the
//! resolver's job.

use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::components::{Component, ParsedComponents, ParsedResult};

/// Parses free text into date components.
pub trait DateParser {
    /// Parse `text` strictly. An empty vector means "no date here".
    fn parse_strict(&self, text: &str) -> Vec<ParsedResult>;
}

/// Configuration for [`StrictDateParser`].
#[derive(Debug, Clone)]
pub struct DateParserConfig {
    /// Year implied for text that names no year (e.g., "March 5", "19:05").
    pub reference_year: i32,
}

impl Default for DateParserConfig {
    fn default() -> Self {
        Self {
            reference_year: Utc::now().year(),
        }
    }
}

impl DateParserConfig {
    /// Set the implied year.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }
}

// =============================================================================
// PATTERNS
// =============================================================================

const MONTH: &str = "(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)";

static ISO_DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[T\s](\d{1,2}):(\d{2})(?::(\d{2})(?:\.\d+)?)?\s*(?:Z|[+-]\d{2}:?\d{2})?)?$",
    )
    .unwrap()
});
static YEAR_MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})$").unwrap());
static YEAR_FIRST_SLASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})[/.](\d{1,2})[/.](\d{1,2})$").unwrap());
static MONTH_FIRST_SLASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})([/-])(\d{1,2})([/-])(\d{4})$").unwrap());
static MONTH_SLASH_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{4})$").unwrap());
static MONTH_NAME_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^{}\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?(?:,?\s+(\d{{3,4}}))?$",
        MONTH
    ))
    .unwrap()
});
static DAY_MONTH_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?{}\.?(?:,?\s+(\d{{3,4}}))?$",
        MONTH
    ))
    .unwrap()
});
static MONTH_NAME_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^{}\.?,?\s+(\d{{3,4}})$", MONTH)).unwrap()
});
static YEAR_ERA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d{3,4})(?:\s*(ad|ce|bc|bce))?$").unwrap());
static DECADE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(\d{3})0'?s$").unwrap());
static SHORT_DECADE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^'(\d)0s$").unwrap());
static CLOCK_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d{1,2}):(\d{2})(?::(\d{2}))?\s*(am|pm|a\.m\.|p\.m\.)?$").unwrap()
});
static SPACED_TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})\s+(\d{2})$").unwrap());

static RANGE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(?:from|between)\s+").unwrap());
static RANGE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*(?:-|–|—|\bto\b|\buntil\b|\bthrough\b|\band\b)\s*").unwrap());

// =============================================================================
// PARSER
// =============================================================================

/// The built-in [`DateParser`].
///
/// Recognises ISO dates and datetimes, slash dates (month first, as in
/// `03/15/2001`), month names, bare years with optional era, decades (`1990s`),
/// clock times, and ranges of any of those joined by `-`, `to`, `until`,
/// `through`, or `between ... and ...`.
#[derive(Debug, Clone, Default)]
pub struct StrictDateParser {
    config: DateParserConfig,
}

impl StrictDateParser {
    /// Create a parser with the current year as reference.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: DateParserConfig) -> Self {
        Self { config }
    }

    /// Parse one non-range expression and check that it names real dates.
    fn parse_single(&self, text: &str) -> Option<(ParsedComponents, Option<ParsedComponents>)> {
        let (start, end) = self.read_single(text)?;
        start.date()?;
        if let Some(end) = end.as_ref() {
            end.date()?;
        }
        Some((start, end))
    }

    /// Read the fields of one non-range expression without checking the calendar.
    fn read_single(&self, text: &str) -> Option<(ParsedComponents, Option<ParsedComponents>)> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let (mut start, mut end) = parse_iso(text)
            .or_else(|| parse_year_month(text))
            .or_else(|| parse_year_first_slash(text))
            .or_else(|| parse_month_first_slash(text))
            .or_else(|| parse_month_slash_year(text))
            .or_else(|| parse_month_name_day(text))
            .or_else(|| parse_day_month_name(text))
            .or_else(|| parse_month_name_year(text))
            .or_else(|| parse_year_era(text))
            .or_else(|| parse_clock_time(text))
            .map(|c| (c, None))
            .or_else(|| parse_decade(text))?;

        start.imply(Component::Year, self.config.reference_year);
        if let Some(end) = end.as_mut() {
            end.imply(Component::Year, self.config.reference_year);
        }

        Some((start, end))
    }

    /// Parse `start <sep> end`, trying every separator position.
    fn parse_range(&self, text: &str) -> Option<ParsedResult> {
        let body = RANGE_PREFIX.replace(text, "");

        for sep in RANGE_SEPARATOR.find_iter(&body) {
            let left = &body[..sep.start()];
            let right = &body[sep.end()..];
            if left.trim().is_empty() || right.trim().is_empty() {
                continue;
            }

            let Some((start, _)) = self.parse_single(left) else {
                continue;
            };
            // The end is checked once it has inherited the start's fields
            let Some((mut end, period_end)) = self.read_single(right) else {
                continue;
            };

            // A period on the right ("1990s") ends where the period ends
            if let Some(period_end) = period_end {
                end = period_end;
            }

            for component in [Component::Year, Component::Month, Component::Day] {
                if !end.is_certain(component) && start.is_certain(component) {
                    if let Some(value) = start.get(component) {
                        end.imply(component, value);
                    }
                }
            }
            if end.date().is_none() {
                continue;
            }

            return Some(ParsedResult::new(text, start).with_end(end));
        }

        None
    }
}

impl DateParser for StrictDateParser {
    fn parse_strict(&self, text: &str) -> Vec<ParsedResult> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        if let Some((start, end)) = self.parse_single(text) {
            let result = ParsedResult::new(text, start);
            return vec![match end {
                Some(end) => result.with_end(end),
                None => result,
            }];
        }

        self.parse_range(text).into_iter().collect()
    }
}

// =============================================================================
// FORMS
// =============================================================================

fn num(caps: &Captures<'_>, index: usize) -> Option<i32> {
    caps.get(index).and_then(|m| m.as_str().parse().ok())
}

fn ymd(year: i32, month: i32, day: i32) -> ParsedComponents {
    ParsedComponents::new()
        .with(Component::Year, year)
        .with(Component::Month, month)
        .with(Component::Day, day)
}

fn parse_iso(text: &str) -> Option<ParsedComponents> {
    let caps = ISO_DATETIME.captures(text)?;
    let mut c = ymd(num(&caps, 1)?, num(&caps, 2)?, num(&caps, 3)?);
    if let (Some(hour), Some(minute)) = (num(&caps, 4), num(&caps, 5)) {
        c.assign(Component::Hour, hour);
        c.assign(Component::Minute, minute);
        if let Some(second) = num(&caps, 6) {
            c.assign(Component::Second, second);
        }
    }
    Some(c)
}

fn parse_year_month(text: &str) -> Option<ParsedComponents> {
    let caps = YEAR_MONTH.captures(text)?;
    Some(
        ParsedComponents::new()
            .with(Component::Year, num(&caps, 1)?)
            .with(Component::Month, num(&caps, 2)?),
    )
}

fn parse_year_first_slash(text: &str) -> Option<ParsedComponents> {
    let caps = YEAR_FIRST_SLASH.captures(text)?;
    Some(ymd(num(&caps, 1)?, num(&caps, 2)?, num(&caps, 3)?))
}

fn parse_month_first_slash(text: &str) -> Option<ParsedComponents> {
    let caps = MONTH_FIRST_SLASH.captures(text)?;
    // Mixed separators ("03/15-2001") are not a date
    if caps.get(2)?.as_str() != caps.get(4)?.as_str() {
        return None;
    }

    let (mut month, mut day) = (num(&caps, 1)?, num(&caps, 3)?);
    if month > 12 {
        // Day-first data ("15/03/2001") is only unambiguous when the day exceeds 12
        if day > 12 {
            return None;
        }
        std::mem::swap(&mut month, &mut day);
    }
    Some(ymd(num(&caps, 5)?, month, day))
}

fn parse_month_slash_year(text: &str) -> Option<ParsedComponents> {
    let caps = MONTH_SLASH_YEAR.captures(text)?;
    Some(
        ParsedComponents::new()
            .with(Component::Year, num(&caps, 2)?)
            .with(Component::Month, num(&caps, 1)?),
    )
}

fn month_number(name: &str) -> Option<i32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn parse_month_name_day(text: &str) -> Option<ParsedComponents> {
    let caps = MONTH_NAME_DAY.captures(text)?;
    let mut c = ParsedComponents::new()
        .with(Component::Month, month_number(caps.get(1)?.as_str())?)
        .with(Component::Day, num(&caps, 2)?);
    if let Some(year) = num(&caps, 3) {
        c.assign(Component::Year, year);
    }
    Some(c)
}

fn parse_day_month_name(text: &str) -> Option<ParsedComponents> {
    let caps = DAY_MONTH_NAME.captures(text)?;
    let mut c = ParsedComponents::new()
        .with(Component::Month, month_number(caps.get(2)?.as_str())?)
        .with(Component::Day, num(&caps, 1)?);
    if let Some(year) = num(&caps, 3) {
        c.assign(Component::Year, year);
    }
    Some(c)
}

fn parse_month_name_year(text: &str) -> Option<ParsedComponents> {
    let caps = MONTH_NAME_YEAR.captures(text)?;
    Some(
        ParsedComponents::new()
            .with(Component::Year, num(&caps, 2)?)
            .with(Component::Month, month_number(caps.get(1)?.as_str())?),
    )
}

fn parse_year_era(text: &str) -> Option<ParsedComponents> {
    let caps = YEAR_ERA.captures(text)?;
    let year = num(&caps, 1)?;
    let year = match caps.get(2).map(|m| m.as_str().to_lowercase()) {
        Some(era) if era.starts_with('b') => -year,
        _ => year,
    };
    Some(ParsedComponents::new().with(Component::Year, year))
}

fn parse_clock_time(text: &str) -> Option<ParsedComponents> {
    let (mut hour, minute, second, meridiem) = if let Some(caps) = CLOCK_TIME.captures(text) {
        (
            num(&caps, 1)?,
            num(&caps, 2)?,
            num(&caps, 3),
            caps.get(4).map(|m| m.as_str().to_lowercase()),
        )
    } else {
        let caps = SPACED_TIME.captures(text)?;
        (num(&caps, 1)?, num(&caps, 2)?, None, None)
    };

    if let Some(meridiem) = meridiem {
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = meridiem.starts_with('p');
        hour = match (pm, hour) {
            (false, 12) => 0,
            (true, 12) => 12,
            (true, h) => h + 12,
            (false, h) => h,
        };
    }

    if hour > 23 || minute > 59 || second.is_some_and(|s| s > 59) {
        return None;
    }

    let mut c = ParsedComponents::new()
        .with(Component::Hour, hour)
        .with(Component::Minute, minute);
    if let Some(second) = second {
        c.assign(Component::Second, second);
    }
    Some(c)
}

fn parse_decade(text: &str) -> Option<(ParsedComponents, Option<ParsedComponents>)> {
    let first_year = if let Some(caps) = DECADE.captures(text) {
        num(&caps, 1)? * 10
    } else {
        let caps = SHORT_DECADE.captures(text)?;
        1900 + num(&caps, 1)? * 10
    };

    let start = ParsedComponents::new().with(Component::Year, first_year);
    let end = ymd(first_year + 9, 12, 31);
    Some((start, Some(end)))
}
