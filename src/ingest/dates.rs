//! Date and timestamp extraction.
//!
//! Two textual grammars, ASCII digits only and not calendar-validated:
//! - date: `YYYY-MM-DD`
//! - timestamp: `YYYY-MM-DD HH:MM:SS`
//!
//! A timestamp starts with a date, so `find_all_dates` also reports the date
//! part of every timestamp. Callers wanting disjoint sets must filter.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("valid date regex"));
static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}")
        .expect("valid timestamp regex")
});
static LEADING_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("valid leading date regex"));
static LINE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n([0-9]{4}-[0-9]{2}-[0-9]{2})").expect("valid line date regex"));
static LABELED_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"date: ?([0-9]{4}-[0-9]{2}-[0-9]{2})").expect("valid labeled date regex")
});

/// Every distinct `YYYY-MM-DD` in `text`
pub fn find_all_dates(text: &str) -> BTreeSet<String> {
    DATE_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Every distinct `YYYY-MM-DD HH:MM:SS` in `text`
pub fn find_all_timestamps(text: &str) -> BTreeSet<String> {
    TIMESTAMP_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Guess the single most likely date of an entry or document.
///
/// First hit wins:
/// 1. a date anywhere in `heading`
/// 2. a date at the very start of `content`
/// 3. a date at the start of any later line of `content`
/// 4. a date right after a `date:` label (one optional space)
pub fn guess_date(content: &str, heading: Option<&str>) -> Option<String> {
    if let Some(m) = heading.and_then(|h| DATE_RE.find(h)) {
        return Some(m.as_str().to_string());
    }

    if let Some(m) = LEADING_DATE_RE.find(content) {
        return Some(m.as_str().to_string());
    }

    if let Some(caps) = LINE_DATE_RE.captures(content) {
        return Some(caps[1].to_string());
    }

    LABELED_DATE_RE
        .captures(content)
        .map(|caps| caps[1].to_string())
}

/// Calendar bounds: `min` inclusive, `max` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateRange {
    pub fn new(min: NaiveDate, max: NaiveDate) -> Self {
        Self { min, max }
    }

    /// One `YYYY-MM-DD` string per day in the range
    pub fn days(&self) -> Vec<String> {
        calendar_range(self.min, self.max)
    }
}

/// Every day from `min` up to but excluding `max`. Empty when `min >= max`.
pub fn calendar_range(min: NaiveDate, max: NaiveDate) -> Vec<String> {
    min.iter_days()
        .take_while(|day| *day < max)
        .map(|day| day.format("%Y-%m-%d").to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_find_all_dates_deduplicates() {
        let dates = find_all_dates("seen 2020-01-01 and 2020-01-01 again");
        assert_eq!(dates.len(), 1);
        assert!(dates.contains("2020-01-01"));
    }

    #[test]
    fn test_find_all_dates_none() {
        assert!(find_all_dates("no dates anywhere, only 2020-1-1").is_empty());
    }

    #[test]
    fn test_find_all_dates_not_calendar_validated() {
        let dates = find_all_dates("bogus 2020-13-45");
        assert!(dates.contains("2020-13-45"));
    }

    #[test]
    fn test_timestamp_date_overlap() {
        // The date grammar matches the prefix of every timestamp.
        let text = "logged 2021-03-04 10:11:12, due 2021-05-06";
        let dates = find_all_dates(text);
        let timestamps = find_all_timestamps(text);

        assert_eq!(timestamps.len(), 1);
        assert!(timestamps.contains("2021-03-04 10:11:12"));
        assert_eq!(dates.len(), 2);
        assert!(dates.contains("2021-03-04"));
        assert!(dates.contains("2021-05-06"));

        let date_only: BTreeSet<&String> = dates
            .iter()
            .filter(|d| !timestamps.iter().any(|ts| ts.starts_with(d.as_str())))
            .collect();
        assert_eq!(date_only.len(), 1);
    }

    #[test]
    fn test_guess_date_heading_wins() {
        assert_eq!(
            guess_date("nothing here", Some("## 2020-01-01 notes")),
            Some("2020-01-01".to_string())
        );
        assert_eq!(
            guess_date("2019-09-09 in content", Some("# Meeting 2020-01-01")),
            Some("2020-01-01".to_string())
        );
    }

    #[test]
    fn test_guess_date_start_of_content() {
        assert_eq!(
            guess_date("2021-05-04\nmore text", Some("")),
            Some("2021-05-04".to_string())
        );
    }

    #[test]
    fn test_guess_date_line_start_without_newline_in_result() {
        assert_eq!(
            guess_date("intro\n2021-06-07 standup\n", None),
            Some("2021-06-07".to_string())
        );
    }

    #[test]
    fn test_guess_date_line_start_beats_label() {
        assert_eq!(
            guess_date("date: 2000-01-01\n2021-06-07", None),
            Some("2021-06-07".to_string())
        );
    }

    #[test]
    fn test_guess_date_label_fallback() {
        assert_eq!(
            guess_date("intro\ndate: 2022-07-07", Some("")),
            Some("2022-07-07".to_string())
        );
        assert_eq!(
            guess_date("---\ntitle: x\ndate:2022-08-08\n---", None),
            Some("2022-08-08".to_string())
        );
    }

    #[test]
    fn test_guess_date_mid_line_date_is_ignored() {
        assert_eq!(guess_date("met on 2020-02-02 briefly", None), None);
    }

    #[test]
    fn test_guess_date_absent() {
        assert_eq!(guess_date("no dates anywhere", Some("")), None);
        assert_eq!(guess_date("", None), None);
    }

    #[test]
    fn test_calendar_range_excludes_end() {
        let days = calendar_range(ymd(2020, 2, 27), ymd(2020, 3, 2));
        assert_eq!(days, vec!["2020-02-27", "2020-02-28", "2020-02-29", "2020-03-01"]);
    }

    #[test]
    fn test_calendar_range_empty() {
        assert!(calendar_range(ymd(2020, 1, 1), ymd(2020, 1, 1)).is_empty());
        assert!(calendar_range(ymd(2020, 1, 2), ymd(2020, 1, 1)).is_empty());
    }

    #[test]
    fn test_date_range_days() {
        let range = DateRange::new(ymd(2014, 1, 1), ymd(2015, 1, 1));
        let days = range.days();
        assert_eq!(days.len(), 365);
        assert_eq!(days.first().map(String::as_str), Some("2014-01-01"));
        assert_eq!(days.last().map(String::as_str), Some("2014-12-31"));
    }
}
