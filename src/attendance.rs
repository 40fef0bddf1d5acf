//! Attendance analysis.
//!
//! Turns clock-in/clock-out pairs into worked, late and overtime
//! minutes under a [`ShiftPolicy`], and sums those minutes over a pay
//! period.  Lateness and overtime on the same day are netted against
//! each other before either is charged or paid.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::error::{PayrollError, Result};
use crate::models::{AttendanceRecord, PeriodTotals, TimeOfDay, WorkSegmentResult};
use crate::time::{minutes_between, parse_time_of_day};

const fn clock(hour: u32, minute: u32) -> TimeOfDay {
    match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(time) => TimeOfDay::from_naive(time),
        None => panic!("invalid clock constant"),
    }
}

pub const SHIFT_START: TimeOfDay = clock(8, 0);
pub const GRACE_CUTOFF: TimeOfDay = clock(8, 15);
pub const SHIFT_END: TimeOfDay = clock(17, 0);
pub const UNPAID_BREAK_MINUTES: i64 = 60;

/// Working-day rules applied to every attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftPolicy {
    pub shift_start: TimeOfDay,
    /// Latest clock-in that is not counted as late.
    pub grace_cutoff: TimeOfDay,
    pub shift_end: TimeOfDay,
    pub break_minutes: i64,
}

impl Default for ShiftPolicy {
    fn default() -> Self {
        Self {
            shift_start: SHIFT_START,
            grace_cutoff: GRACE_CUTOFF,
            shift_end: SHIFT_END,
            break_minutes: UNPAID_BREAK_MINUTES,
        }
    }
}

impl ShiftPolicy {
    /// Rejects policies whose clock points are out of order.
    pub fn validate(&self) -> Result<()> {
        if self.grace_cutoff < self.shift_start {
            return Err(PayrollError::Config {
                message: format!(
                    "grace cutoff {} is before shift start {}",
                    self.grace_cutoff, self.shift_start
                ),
            });
        }
        if self.shift_end <= self.grace_cutoff {
            return Err(PayrollError::Config {
                message: format!(
                    "shift end {} must be after grace cutoff {}",
                    self.shift_end, self.grace_cutoff
                ),
            });
        }
        if self.break_minutes < 0 {
            return Err(PayrollError::Config {
                message: format!("break minutes must not be negative, got {}", self.break_minutes),
            });
        }
        Ok(())
    }

    /// Computes worked, late and overtime minutes for one day.
    pub fn analyze(&self, time_in: TimeOfDay, time_out: TimeOfDay) -> WorkSegmentResult {
        let net_worked_minutes = minutes_between(time_in, time_out) - self.break_minutes;

        let late_minutes = if time_in > self.grace_cutoff {
            minutes_between(self.grace_cutoff, time_in)
        } else {
            0
        };
        let overtime_minutes = if time_out > self.shift_end {
            minutes_between(self.shift_end, time_out)
        } else {
            0
        };

        WorkSegmentResult {
            net_worked_minutes,
            late_minutes,
            overtime_minutes,
            offset_late_minutes: (late_minutes - overtime_minutes).max(0),
            offset_overtime_minutes: (overtime_minutes - late_minutes).max(0),
        }
    }

    /// Parses both timestamps and analyses the day, propagating the
    /// first parse failure.
    pub fn try_analyze_text(&self, time_in: &str, time_out: &str) -> Result<WorkSegmentResult> {
        let time_in = parse_time_of_day(time_in)?;
        let time_out = parse_time_of_day(time_out)?;
        Ok(self.analyze(time_in, time_out))
    }

    /// Like [`ShiftPolicy::try_analyze_text`] but an unparsable day
    /// yields all-zero minutes.
    pub fn analyze_text(&self, time_in: &str, time_out: &str) -> WorkSegmentResult {
        self.try_analyze_text(time_in, time_out).unwrap_or_else(|err| {
            warn!("Invalid time format (work/late/overtime): [{time_in}] - [{time_out}]: {err}");
            WorkSegmentResult::default()
        })
    }

    /// Sums the days of `employee_id` whose date satisfies `in_period`.
    ///
    /// Negative worked minutes (clock-out before clock-in) count as
    /// zero.  Days that fail to parse are counted in `days_skipped` and
    /// contribute nothing else.
    pub fn aggregate<F>(
        &self,
        records: &[AttendanceRecord],
        employee_id: &str,
        in_period: F,
    ) -> PeriodTotals
    where
        F: Fn(NaiveDate) -> bool,
    {
        let mut totals = PeriodTotals::default();
        for record in records
            .iter()
            .filter(|r| r.employee_id == employee_id && in_period(r.date))
        {
            match self.try_analyze_text(&record.time_in, &record.time_out) {
                Ok(day) => {
                    debug!(employee = employee_id, date = %record.date, ?day, "analysed attendance");
                    totals.days_counted += 1;
                    totals.worked_minutes += day.net_worked_minutes.max(0);
                    totals.late_minutes += day.offset_late_minutes;
                    totals.overtime_minutes += day.offset_overtime_minutes;
                }
                Err(err) => {
                    warn!(employee = employee_id, date = %record.date, "skipping attendance day: {err}");
                    totals.days_skipped += 1;
                }
            }
        }
        totals
    }
}

/// Distinct `(year, month)` pairs in which `employee_id` has attendance,
/// oldest first.
pub fn months_with_attendance(records: &[AttendanceRecord], employee_id: &str) -> Vec<(i32, u32)> {
    records
        .iter()
        .filter(|r| r.employee_id == employee_id)
        .map(|r| (r.date.year(), r.date.month()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PayPeriod;

    fn record(id: &str, date: (i32, u32, u32), time_in: &str, time_out: &str) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: id.into(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            time_in: time_in.into(),
            time_out: time_out.into(),
        }
    }

    #[test]
    fn late_day_with_longer_overtime() {
        let day = ShiftPolicy::default().analyze_text("09:47", "19:07");
        assert_eq!(day.net_worked_minutes, 500);
        assert_eq!(day.late_minutes, 92);
        assert_eq!(day.overtime_minutes, 127);
        assert_eq!(day.offset_late_minutes, 0);
        assert_eq!(day.offset_overtime_minutes, 35);
    }

    #[test]
    fn late_day_without_overtime() {
        let day = ShiftPolicy::default().analyze_text("8:45", "17:00");
        assert_eq!(day.net_worked_minutes, 435);
        assert_eq!(day.late_minutes, 30);
        assert_eq!(day.overtime_minutes, 0);
        assert_eq!(day.offset_late_minutes, 30);
        assert_eq!(day.offset_overtime_minutes, 0);
    }

    #[test]
    fn clock_in_at_grace_cutoff_is_on_time() {
        let day = ShiftPolicy::default().analyze_text("8:15", "17:00");
        assert_eq!(day.late_minutes, 0);
        let day = ShiftPolicy::default().analyze_text("8:16", "17:00");
        assert_eq!(day.late_minutes, 1);
    }

    #[test]
    fn clock_out_before_clock_in_goes_negative() {
        let day = ShiftPolicy::default().analyze_text("17:00", "8:00");
        assert_eq!(day.net_worked_minutes, -600);
        assert_eq!(day.late_minutes, 525);
        assert_eq!(day.overtime_minutes, 0);
    }

    #[test]
    fn unparsable_day_is_all_zero() {
        let policy = ShiftPolicy::default();
        assert_eq!(policy.analyze_text("8:00", "n/a"), WorkSegmentResult::default());
        assert!(matches!(
            policy.try_analyze_text("8:00", "n/a"),
            Err(PayrollError::TimeFormat { .. })
        ));
    }

    #[test]
    fn offsets_never_both_positive() {
        let policy = ShiftPolicy::default();
        let ins = ["7:30", "8:15", "8:16", "9:00", "10:30", "13:00"];
        let outs = ["12:00", "16:59", "17:00", "17:01", "18:30", "22:45"];
        for time_in in ins {
            for time_out in outs {
                let day = policy.analyze_text(time_in, time_out);
                assert!(day.offset_late_minutes == 0 || day.offset_overtime_minutes == 0);
                assert!(
                    day.offset_late_minutes + day.offset_overtime_minutes
                        <= day.late_minutes.max(day.overtime_minutes)
                );
                assert!(day.late_minutes >= 0 && day.overtime_minutes >= 0);
            }
        }
    }

    #[test]
    fn aggregate_filters_employee_and_period() {
        let records = vec![
            record("10001", (2024, 6, 10), "8:00", "17:00"),
            record("10001", (2024, 6, 11), "9:47", "19:07"),
            record("10001", (2024, 6, 12), "8:45", "17:00"),
            record("10001", (2024, 6, 13), "bad", "17:00"),
            record("10001", (2024, 6, 14), "17:00", "8:00"),
            record("10001", (2024, 7, 1), "8:00", "17:00"),
            record("10002", (2024, 6, 10), "8:00", "17:00"),
        ];
        let period = PayPeriod::Month { year: 2024, month: 6 };
        let totals = ShiftPolicy::default().aggregate(&records, "10001", |d| period.contains(d));

        assert_eq!(totals.days_counted, 4);
        assert_eq!(totals.days_skipped, 1);
        assert_eq!(totals.worked_minutes, 480 + 500 + 435);
        assert_eq!(totals.late_minutes, 30 + 525);
        assert_eq!(totals.overtime_minutes, 35);
    }

    #[test]
    fn grace_cutoff_is_configurable() {
        let policy = ShiftPolicy {
            grace_cutoff: parse_time_of_day("8:10").unwrap(),
            ..ShiftPolicy::default()
        };
        assert_eq!(policy.analyze_text("8:15", "17:00").late_minutes, 5);
    }

    #[test]
    fn validate_rejects_out_of_order_policy() {
        assert!(ShiftPolicy::default().validate().is_ok());
        let policy = ShiftPolicy {
            grace_cutoff: parse_time_of_day("7:50").unwrap(),
            ..ShiftPolicy::default()
        };
        assert!(matches!(policy.validate(), Err(PayrollError::Config { .. })));
    }

    #[test]
    fn months_are_distinct_and_sorted() {
        let records = vec![
            record("1", (2024, 7, 2), "8:00", "17:00"),
            record("1", (2024, 6, 3), "8:00", "17:00"),
            record("1", (2024, 6, 4), "8:00", "17:00"),
            record("2", (2024, 5, 4), "8:00", "17:00"),
        ];
        assert_eq!(months_with_attendance(&records, "1"), vec![(2024, 6), (2024, 7)]);
    }
}
