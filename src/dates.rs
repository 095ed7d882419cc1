use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write;

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})(?:[T ].*)?$").expect("valid date regex")
});

/// Parses a birth date written as `YYYY-MM-DD`, `YYYY/MM/DD` or `YYYY.MM.DD`.
/// A trailing time part (`2001-04-09T00:00:00`) is ignored.
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let caps = DATE_RE.captures(raw.trim())?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Age {
    pub years: i32,
    /// Whole months past the last birthday, 0..=11.
    pub months: u32,
}

/// Completed years and months between `birth` and `today`. Negative spans
/// (birth dates in the future) clamp to zero.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> Age {
    let mut total_months =
        (today.year() - birth.year()) * 12 + today.month() as i32 - birth.month() as i32;
    if today.day() < birth.day() {
        total_months -= 1;
    }
    let total_months = total_months.max(0);
    Age {
        years: total_months / 12,
        months: (total_months % 12) as u32,
    }
}

pub fn is_birthday(birth: NaiveDate, today: NaiveDate) -> bool {
    birth.month() == today.month() && birth.day() == today.day()
}

/// Formats with a chrono pattern; a malformed pattern falls back to ISO.
pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_err() {
        return date.format("%Y-%m-%d").to_string();
    }
    out
}

pub fn is_valid_date_format(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_common_separators() {
        assert_eq!(parse_birth_date("1950-03-07"), Some(ymd(1950, 3, 7)));
        assert_eq!(parse_birth_date("1950/3/7"), Some(ymd(1950, 3, 7)));
        assert_eq!(parse_birth_date("1950.03.07"), Some(ymd(1950, 3, 7)));
        assert_eq!(parse_birth_date("1950-03-07T00:00:00Z"), Some(ymd(1950, 3, 7)));
        assert_eq!(parse_birth_date("1950-02-30"), None);
        assert_eq!(parse_birth_date("March 7"), None);
    }

    #[test]
    fn age_counts_months_after_last_birthday() {
        let birth = ymd(1990, 6, 15);
        assert_eq!(age_on(birth, ymd(2024, 6, 14)), Age { years: 33, months: 11 });
        assert_eq!(age_on(birth, ymd(2024, 6, 15)), Age { years: 34, months: 0 });
        assert_eq!(age_on(birth, ymd(2024, 9, 20)), Age { years: 34, months: 3 });
        assert_eq!(age_on(birth, ymd(1980, 1, 1)), Age { years: 0, months: 0 });
    }

    #[test]
    fn malformed_pattern_falls_back_to_iso() {
        assert_eq!(format_date(ymd(2001, 4, 9), "%d.%m.%Y"), "09.04.2001");
        assert_eq!(format_date(ymd(2001, 4, 9), "%Q"), "2001-04-09");
        assert!(!is_valid_date_format("%Q"));
    }

    #[test]
    fn birthday_ignores_year() {
        assert!(is_birthday(ymd(1990, 6, 15), ymd(2024, 6, 15)));
        assert!(!is_birthday(ymd(1990, 6, 15), ymd(2024, 6, 16)));
    }
}
