//! Time-of-day parsing.
//!
//! Attendance files are hand-edited and pass through spreadsheet
//! exports, so timestamps arrive with stray quotes, non-breaking spaces
//! and similar debris.  [`parse_time_of_day`] cleans the text and then
//! tries a fixed list of clock patterns in order.

use chrono::NaiveTime;

use crate::error::{PayrollError, Result};
use crate::models::TimeOfDay;

/// An admissible clock layout: the hour takes one or two digits, the
/// minute and the optional second always take two.
struct ClockPattern {
    hour_digits: usize,
    with_seconds: bool,
    format: &'static str,
}

const PATTERNS: [ClockPattern; 4] = [
    // H:mm
    ClockPattern { hour_digits: 1, with_seconds: false, format: "%H:%M" },
    // HH:mm
    ClockPattern { hour_digits: 2, with_seconds: false, format: "%H:%M" },
    // H:mm:ss
    ClockPattern { hour_digits: 1, with_seconds: true, format: "%H:%M:%S" },
    // HH:mm:ss
    ClockPattern { hour_digits: 2, with_seconds: true, format: "%H:%M:%S" },
];

impl ClockPattern {
    fn matches_shape(&self, input: &str) -> bool {
        let parts: Vec<&str> = input.split(':').collect();
        let expected = if self.with_seconds { 3 } else { 2 };
        if parts.len() != expected {
            return false;
        }
        let digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
        digits(parts[0], self.hour_digits) && parts[1..].iter().all(|p| digits(p, 2))
    }

    fn parse(&self, input: &str) -> Option<NaiveTime> {
        if !self.matches_shape(input) {
            return None;
        }
        NaiveTime::parse_from_str(input, self.format).ok()
    }
}

/// Strips everything outside printable ASCII, drops double quotes and
/// trims surrounding whitespace.
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .filter(|c| matches!(c, '\x20'..='\x7e') && *c != '"')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Parses a clock time such as `8:05`, `17:30` or `09:47:12`.
///
/// The first pattern that matches wins.  Returns
/// [`PayrollError::TimeFormat`] carrying the sanitised text when none
/// does.
pub fn parse_time_of_day(input: &str) -> Result<TimeOfDay> {
    let cleaned = sanitize(input);
    PATTERNS
        .iter()
        .find_map(|pattern| pattern.parse(&cleaned))
        .map(TimeOfDay::from_naive)
        .ok_or(PayrollError::TimeFormat { input: cleaned })
}

/// Whole minutes from `start` to `end`, truncated toward zero.
/// Negative when `end` is earlier than `start`.
pub fn minutes_between(start: TimeOfDay, end: TimeOfDay) -> i64 {
    (end.as_naive() - start.as_naive()).num_minutes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        parse_time_of_day(s).unwrap()
    }

    #[test]
    fn accepts_all_clock_layouts() {
        assert_eq!((t("8:05").hour(), t("8:05").minute()), (8, 5));
        assert_eq!((t("08:05").hour(), t("08:05").minute()), (8, 5));
        assert_eq!(t("8:05:30").minute(), 5);
        assert_eq!(t("17:00:59").hour(), 17);
    }

    #[test]
    fn strips_quotes_and_control_bytes() {
        let parsed = t("\"\u{feff} 9:47\u{a0}\"\r");
        assert_eq!(parsed.hour(), 9);
        assert_eq!(parsed.minute(), 47);
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["", "-", "8", "8:5", "800", "24:00", "12:60", "123:00", "8:00 AM", "8:00:5"] {
            match parse_time_of_day(bad) {
                Err(PayrollError::TimeFormat { .. }) => {}
                other => panic!("expected TimeFormat for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn error_carries_sanitised_input() {
        let err = parse_time_of_day("\"noon\"").unwrap_err();
        assert_eq!(err.to_string(), "unsupported time format: \"noon\"");
    }

    #[test]
    fn minutes_between_truncates_seconds() {
        assert_eq!(minutes_between(t("8:00:30"), t("17:00")), 539);
        assert_eq!(minutes_between(t("9:47"), t("19:07")), 560);
        assert_eq!(minutes_between(t("17:00"), t("8:00")), -540);
    }

    #[test]
    fn ordering_follows_clock() {
        assert!(t("8:15") < t("8:16"));
        assert!(t("08:15:01") > t("8:15"));
        assert_eq!(t("8:15").minutes_since_midnight(), 495);
    }
}
