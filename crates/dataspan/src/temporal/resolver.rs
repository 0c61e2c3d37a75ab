//! Picking one moment out of a cell.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::components::{Component, ParsedComponents};
use super::parser::DateParser;

/// Which end of the timeline a fold is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    /// Keep the earliest moment. Ties keep the first argument.
    Earliest,
    /// Keep the latest moment. Only a strictly later moment wins.
    Latest,
}

impl Preference {
    /// The better of two moments.
    ///
    /// The tie-break is asymmetric: `Earliest` uses `a <= b`, `Latest` uses `a > b`.
    pub fn better(self, a: NaiveDateTime, b: NaiveDateTime) -> NaiveDateTime {
        match self {
            Preference::Earliest => {
                if a <= b {
                    a
                } else {
                    b
                }
            }
            Preference::Latest => {
                if a > b {
                    a
                } else {
                    b
                }
            }
        }
    }
}

/// Reinterpret a clock reading as a year when no year was read.
///
/// Short numeric fragments such as `"19 05"` read as 19:05. With no year but a
/// known hour and minute, the two are zero-padded and concatenated into a year
/// (hour 19, minute 5 gives 1905), and the clock fields are dropped.
pub fn prefer_years(components: &mut ParsedComponents) {
    if components.is_certain(Component::Year)
        || !components.is_certain(Component::Hour)
        || !components.is_certain(Component::Minute)
    {
        return;
    }

    let (Some(hour), Some(minute)) = (
        components.get(Component::Hour),
        components.get(Component::Minute),
    ) else {
        return;
    };

    if let Ok(year) = format!("{:02}{:02}", hour, minute).parse::<i32>() {
        components.assign(Component::Year, year);
        components.forget(Component::Hour);
        components.forget(Component::Minute);
    }
}

/// Folds raw cell text into a running best moment.
pub struct MomentResolver<'a> {
    parser: &'a dyn DateParser,
}

impl<'a> MomentResolver<'a> {
    /// Create a resolver over a date parser.
    pub fn new(parser: &'a dyn DateParser) -> Self {
        Self { parser }
    }

    /// Return the better of `fallback` and the moment expressed by `raw`.
    ///
    /// Empty or unparsable text returns `fallback` unchanged. When the text
    /// expresses a range, the better of its start and end is used.
    pub fn resolve(
        &self,
        raw: Option<&str>,
        fallback: NaiveDateTime,
        preference: Preference,
    ) -> NaiveDateTime {
        let raw = match raw {
            Some(r) if !r.is_empty() => r,
            _ => return fallback,
        };

        let Some(parsed) = self.parser.parse_strict(raw).into_iter().next() else {
            trace!(raw, "no date parsed");
            return fallback;
        };

        let mut start = parsed.start;
        prefer_years(&mut start);
        let Some(start_date) = start.date() else {
            return fallback;
        };

        let best = match parsed.end {
            Some(mut end) => {
                prefer_years(&mut end);
                match end.date() {
                    Some(end_date) => preference.better(start_date, end_date),
                    None => start_date,
                }
            }
            None => start_date,
        };

        preference.better(best, fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::{DateParserConfig, ParsedResult, StrictDateParser};
    use chrono::NaiveDate;

    fn moment(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn parser() -> StrictDateParser {
        StrictDateParser::with_config(DateParserConfig::default().with_reference_year(2020))
    }

    /// Returns a fixed result regardless of input.
    struct FixedParser(Vec<ParsedResult>);

    impl DateParser for FixedParser {
        fn parse_strict(&self, _text: &str) -> Vec<ParsedResult> {
            self.0.clone()
        }
    }

    #[test]
    fn test_prefer_years_rewrites_clock_reading() {
        let mut c = ParsedComponents::new()
            .with(Component::Hour, 19)
            .with(Component::Minute, 5);
        prefer_years(&mut c);

        assert_eq!(c.get(Component::Year), Some(1905));
        assert!(!c.is_certain(Component::Hour));
        assert!(!c.is_certain(Component::Minute));
        assert_eq!(c.date(), Some(moment(1905, 1, 1)));
    }

    #[test]
    fn test_prefer_years_pads_both_parts() {
        let mut c = ParsedComponents::new()
            .with(Component::Hour, 0)
            .with(Component::Minute, 7);
        prefer_years(&mut c);
        assert_eq!(c.get(Component::Year), Some(7));
    }

    #[test]
    fn test_prefer_years_ignores_known_year() {
        let mut c = ParsedComponents::new()
            .with(Component::Year, 2001)
            .with(Component::Hour, 19)
            .with(Component::Minute, 5);
        prefer_years(&mut c);
        assert_eq!(c.get(Component::Year), Some(2001));
        assert_eq!(c.get(Component::Hour), Some(19));
    }

    #[test]
    fn test_prefer_years_needs_hour_and_minute() {
        let mut c = ParsedComponents::new().with(Component::Hour, 19);
        prefer_years(&mut c);
        assert!(!c.is_certain(Component::Year));
    }

    #[test]
    fn test_preference_ordering() {
        let a = moment(2001, 1, 1);
        let b = moment(1999, 1, 1);
        assert_eq!(Preference::Earliest.better(a, b), b);
        assert_eq!(Preference::Earliest.better(b, a), b);
        assert_eq!(Preference::Latest.better(a, b), a);
        assert_eq!(Preference::Latest.better(b, a), a);
    }

    #[test]
    fn test_empty_and_absent_return_fallback() {
        let p = parser();
        let resolver = MomentResolver::new(&p);
        let fallback = moment(2000, 1, 1);

        assert_eq!(resolver.resolve(None, fallback, Preference::Earliest), fallback);
        assert_eq!(resolver.resolve(Some(""), fallback, Preference::Latest), fallback);
        assert_eq!(resolver.resolve(Some("n/a"), fallback, Preference::Earliest), fallback);
    }

    #[test]
    fn test_resolves_against_fallback() {
        let p = parser();
        let resolver = MomentResolver::new(&p);

        assert_eq!(
            resolver.resolve(Some("1999"), moment(2001, 1, 1), Preference::Earliest),
            moment(1999, 1, 1)
        );
        assert_eq!(
            resolver.resolve(Some("1999"), moment(2001, 1, 1), Preference::Latest),
            moment(2001, 1, 1)
        );
    }

    #[test]
    fn test_ambiguous_year_through_parser() {
        let p = parser();
        let resolver = MomentResolver::new(&p);

        let resolved = resolver.resolve(Some("19 05"), NaiveDateTime::MAX, Preference::Earliest);
        assert_eq!(resolved, moment(1905, 1, 1));
    }

    #[test]
    fn test_range_picks_preferred_end() {
        let p = parser();
        let resolver = MomentResolver::new(&p);

        assert_eq!(
            resolver.resolve(Some("1990s"), NaiveDateTime::MAX, Preference::Earliest),
            moment(1990, 1, 1)
        );
        assert_eq!(
            resolver.resolve(Some("1990s"), NaiveDateTime::MIN, Preference::Latest),
            moment(1999, 12, 31)
        );
    }

    #[test]
    fn test_end_gets_year_rule_independently() {
        let start = ParsedComponents::new().with(Component::Year, 1890);
        let end = ParsedComponents::new()
            .with(Component::Hour, 19)
            .with(Component::Minute, 5);
        let p = FixedParser(vec![ParsedResult::new("x", start).with_end(end)]);
        let resolver = MomentResolver::new(&p);

        let latest = resolver.resolve(Some("x"), NaiveDateTime::MIN, Preference::Latest);
        assert_eq!(latest, moment(1905, 1, 1));
    }

    #[test]
    fn test_unmaterializable_start_contributes_nothing() {
        let start = ParsedComponents::new().with(Component::Month, 2);
        let p = FixedParser(vec![ParsedResult::new("x", start)]);
        let resolver = MomentResolver::new(&p);

        let fallback = moment(2000, 6, 1);
        assert_eq!(resolver.resolve(Some("x"), fallback, Preference::Earliest), fallback);
    }
}
