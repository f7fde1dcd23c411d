//! Relative Date Resolver — maps natural-language temporal phrases to
//! calendar dates.
//!
//! Pure: "today" is an explicit parameter, never the global clock. Rules
//! are tried in the order of the `RULES` table and the first match wins;
//! specific phrases come before generic ones ("next weekend" before
//! "next week", numeric offsets before "soon"/"later"). No match is a
//! normal `None`, not an error.

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

/// Product constants with no deeper rationale; tune freely.
pub const SOON_OFFSET_DAYS: i64 = 3;
pub const LATER_OFFSET_DAYS: i64 = 14;

const IMMEDIATE_PHRASES: &[&str] = &["asap", "urgent", "immediately"];

const WEEKDAYS: &[(&str, Weekday)] = &[
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

static IN_OFFSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bin\s+(\d{1,3})\s+(day|week|month)s?\b").expect("offset regex"));
static NEXT_WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bnext\s+(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .expect("weekday regex")
});

type Rule = fn(&str, NaiveDate) -> Option<NaiveDate>;

/// Priority-ordered rule table. First match wins.
const RULES: &[Rule] = &[
    immediate,
    today_phrase,
    tomorrow,
    next_weekend,
    this_weekend,
    next_week,
    next_month,
    next_year,
    in_offset,
    next_weekday,
    soon,
    later,
];

/// Resolves a date from free text, or `None` when nothing matches.
/// Matching is case-insensitive substring/regex matching over the whole
/// input.
pub fn resolve_relative_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = text.to_lowercase();
    RULES.iter().find_map(|rule| rule(&text, today))
}

fn immediate(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    IMMEDIATE_PHRASES
        .iter()
        .any(|p| text.contains(p))
        .then_some(today)
}

fn today_phrase(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    text.contains("today").then_some(today)
}

fn tomorrow(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    text.contains("tomorrow")
        .then(|| today + Duration::days(1))
}

fn next_weekend(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    text.contains("next weekend")
        .then(|| upcoming_saturday(today) + Duration::days(7))
}

fn this_weekend(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    text.contains("this weekend")
        .then(|| upcoming_saturday(today))
}

fn next_week(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    // "next weekend" has already been consumed by an earlier rule
    text.contains("next week")
        .then(|| today + Duration::days(7))
}

fn next_month(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if text.contains("next month") {
        today.checked_add_months(Months::new(1))
    } else {
        None
    }
}

fn next_year(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if text.contains("next year") {
        today.checked_add_months(Months::new(12))
    } else {
        None
    }
}

/// `in N day(s)/week(s)/month(s)` — weeks are 7-day offsets, months are
/// calendar-month addition (clamped at month end).
fn in_offset(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let captures = IN_OFFSET_RE.captures(text)?;
    let n: u32 = captures[1].parse().ok()?;
    match &captures[2] {
        "day" => Some(today + Duration::days(n as i64)),
        "week" => Some(today + Duration::days(7 * n as i64)),
        "month" => today.checked_add_months(Months::new(n)),
        _ => None,
    }
}

/// `next <weekday>` — the next occurrence strictly after today; if today
/// is that weekday, roll a full week forward rather than returning today.
fn next_weekday(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let captures = NEXT_WEEKDAY_RE.captures(text)?;
    let name = &captures[1];
    let target = WEEKDAYS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, wd)| *wd)?;
    let mut delta =
        (target.num_days_from_monday() + 7 - today.weekday().num_days_from_monday()) % 7;
    if delta == 0 {
        delta = 7;
    }
    Some(today + Duration::days(delta as i64))
}

fn soon(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    text.contains("soon")
        .then(|| today + Duration::days(SOON_OFFSET_DAYS))
}

fn later(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    text.contains("later")
        .then(|| today + Duration::days(LATER_OFFSET_DAYS))
}

/// Next upcoming Saturday; on a Saturday this is the Saturday after next
/// week's start, i.e. seven days out.
fn upcoming_saturday(today: NaiveDate) -> NaiveDate {
    let mut delta =
        (Weekday::Sat.num_days_from_monday() + 7 - today.weekday().num_days_from_monday()) % 7;
    if delta == 0 {
        delta = 7;
    }
    today + Duration::days(delta as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // Reference Monday used throughout
    const fn monday() -> (i32, u32, u32) {
        (2024, 6, 10)
    }

    fn reference() -> NaiveDate {
        let (y, m, d) = monday();
        date(y, m, d)
    }

    #[test]
    fn test_this_weekend_is_coming_saturday() {
        assert_eq!(
            resolve_relative_date("roadtrip this weekend", reference()),
            Some(date(2024, 6, 15))
        );
    }

    #[test]
    fn test_this_weekend_on_a_saturday_rolls_forward() {
        let saturday = date(2024, 6, 15);
        assert_eq!(
            resolve_relative_date("this weekend", saturday),
            Some(date(2024, 6, 22))
        );
    }

    #[test]
    fn test_next_weekend_is_a_week_after_this_weekend() {
        assert_eq!(
            resolve_relative_date("next weekend", reference()),
            Some(date(2024, 6, 22))
        );
    }

    #[test]
    fn test_next_week() {
        assert_eq!(
            resolve_relative_date("meeting next week", reference()),
            Some(date(2024, 6, 17))
        );
    }

    #[test]
    fn test_in_three_days() {
        assert_eq!(
            resolve_relative_date("do this in 3 days", reference()),
            Some(date(2024, 6, 13))
        );
    }

    #[test]
    fn test_in_two_weeks() {
        assert_eq!(
            resolve_relative_date("in 2 weeks", reference()),
            Some(date(2024, 6, 24))
        );
    }

    #[test]
    fn test_in_one_month_clamps_at_month_end() {
        assert_eq!(
            resolve_relative_date("in 1 month", date(2024, 1, 31)),
            Some(date(2024, 2, 29))
        );
    }

    #[test]
    fn test_tomorrow() {
        assert_eq!(
            resolve_relative_date("call mom Tomorrow", reference()),
            Some(date(2024, 6, 11))
        );
    }

    #[test]
    fn test_next_monday_on_a_monday_rolls_a_full_week() {
        assert_eq!(
            resolve_relative_date("next monday", reference()),
            Some(date(2024, 6, 17))
        );
    }

    #[test]
    fn test_next_friday_mid_week() {
        assert_eq!(
            resolve_relative_date("submit next friday", reference()),
            Some(date(2024, 6, 14))
        );
    }

    #[test]
    fn test_next_month_and_year() {
        assert_eq!(
            resolve_relative_date("next month", reference()),
            Some(date(2024, 7, 10))
        );
        assert_eq!(
            resolve_relative_date("next year", reference()),
            Some(date(2025, 6, 10))
        );
    }

    #[test]
    fn test_immediate_phrases_mean_today() {
        for phrase in ["asap", "this is URGENT", "do it immediately"] {
            assert_eq!(resolve_relative_date(phrase, reference()), Some(reference()));
        }
        assert_eq!(
            resolve_relative_date("today please", reference()),
            Some(reference())
        );
    }

    #[test]
    fn test_soon_and_later_offsets() {
        assert_eq!(
            resolve_relative_date("look at this soon", reference()),
            Some(reference() + Duration::days(SOON_OFFSET_DAYS))
        );
        assert_eq!(
            resolve_relative_date("read later", reference()),
            Some(reference() + Duration::days(LATER_OFFSET_DAYS))
        );
    }

    #[test]
    fn test_no_temporal_phrase_is_none() {
        assert_eq!(resolve_relative_date("buy milk", reference()), None);
        assert_eq!(resolve_relative_date("", reference()), None);
    }

    #[test]
    fn test_specific_beats_generic() {
        // "next weekend" contains "next week" as a substring; the more
        // specific rule must win.
        assert_eq!(
            resolve_relative_date("trip next weekend", reference()),
            Some(date(2024, 6, 22))
        );
    }
}
