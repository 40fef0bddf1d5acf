//! Data models for the payroll engine.
//!
//! The `models` module defines the value types that flow between the
//! attendance analyzer, the deduction calculator and the salary
//! aggregator.  They derive `Serialize` and `Deserialize` so that
//! results can be returned over the HTTP API or written out for
//! reporting.  None of them carry behaviour beyond small accessors;
//! the arithmetic lives in the `attendance`, `deductions` and `salary`
//! modules.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PayrollError;

/// A wall-clock time of day.
///
/// Values are only produced by [`crate::time::parse_time_of_day`] (or
/// deserialised through it), so every `TimeOfDay` in the system went
/// through the same sanitisation and pattern rules.  Ordering is by
/// time since midnight.  Seconds are retained so that minute
/// differences truncate the way a stopwatch would.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub(crate) const fn from_naive(time: NaiveTime) -> Self {
        Self(time)
    }

    /// Hour component, 0 to 23.
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Minute component, 0 to 59.
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        self.0.num_seconds_from_midnight() / 60
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.second() == 0 {
            write!(f, "{}", self.0.format("%H:%M"))
        } else {
            write!(f, "{}", self.0.format("%H:%M:%S"))
        }
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = PayrollError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        crate::time::parse_time_of_day(&value)
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// One day of attendance for one employee.
///
/// The clock-in and clock-out values are kept as the raw text read from
/// the attendance file.  Parsing happens in the analyzer so that a bad
/// timestamp only disqualifies its own day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Employee number; the stable key shared with the employee table.
    pub employee_id: String,
    pub date: NaiveDate,
    pub time_in: String,
    pub time_out: String,
}

/// Minutes derived from a single time-in/time-out pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSegmentResult {
    /// Minutes between clock-in and clock-out less the unpaid break.
    /// Negative when clock-out precedes clock-in; aggregation treats
    /// that as zero.
    pub net_worked_minutes: i64,
    /// Minutes past the grace cutoff.
    pub late_minutes: i64,
    /// Minutes past the end of the shift.
    pub overtime_minutes: i64,
    /// Late minutes left after netting against the day's overtime.
    pub offset_late_minutes: i64,
    /// Overtime minutes left after netting against the day's lateness.
    pub offset_overtime_minutes: i64,
}

/// Sum of the per-day results over a pay period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTotals {
    /// Days whose timestamps parsed and contributed to the totals.
    pub days_counted: u32,
    /// Days that matched the period but could not be analysed.
    pub days_skipped: u32,
    pub worked_minutes: i64,
    /// Sum of offset late minutes.
    pub late_minutes: i64,
    /// Sum of offset overtime minutes.
    pub overtime_minutes: i64,
}

impl PeriodTotals {
    /// Hours paid at the base rate.  Overtime minutes are already part
    /// of the worked minutes, so they are taken out here to avoid paying
    /// them twice.
    pub fn regular_hours(&self) -> f64 {
        (self.worked_minutes - self.overtime_minutes).max(0) as f64 / 60.0
    }

    pub fn overtime_hours(&self) -> f64 {
        self.overtime_minutes as f64 / 60.0
    }
}

/// Fixed monthly benefits drawn from the employee record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Benefits {
    pub rice_subsidy: f64,
    pub phone_allowance: f64,
    pub clothing_allowance: f64,
}

impl Benefits {
    pub fn total(&self) -> f64 {
        self.rice_subsidy + self.phone_allowance + self.clothing_allowance
    }
}

/// The four statutory deductions for one basic salary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeductionBreakdown {
    pub social_insurance: f64,
    pub health_insurance: f64,
    pub housing_fund: f64,
    pub withholding_tax: f64,
}

impl DeductionBreakdown {
    pub fn total(&self) -> f64 {
        self.social_insurance + self.health_insurance + self.housing_fund + self.withholding_tax
    }

    /// Divides every amount by `divisor`.
    pub fn prorated(&self, divisor: f64) -> Self {
        Self {
            social_insurance: self.social_insurance / divisor,
            health_insurance: self.health_insurance / divisor,
            housing_fund: self.housing_fund / divisor,
            withholding_tax: self.withholding_tax / divisor,
        }
    }
}

/// Full result of a salary computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryBreakdown {
    pub hourly_rate: f64,
    pub regular_hours: f64,
    pub overtime_hours: f64,
    pub late_minutes: i64,
    /// `hourly_rate * regular_hours`.
    pub regular_pay: f64,
    /// Overtime hours at the premium multiplier.
    pub overtime_pay: f64,
    pub benefits: Benefits,
    /// Regular pay plus overtime pay plus benefits.
    pub gross_pay: f64,
    pub late_penalty: f64,
    /// Deductions actually subtracted from this pay.
    pub weekly_deductions: DeductionBreakdown,
    /// The same deductions on their monthly basis, for display.
    pub monthly_deductions: DeductionBreakdown,
    pub total_deductions: f64,
    pub net_pay: f64,
}

/// An employee as read from the employee table.
///
/// Numeric columns are kept as text; see [`crate::amount`] for the
/// tolerant parsing applied before any computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: String,
    pub last_name: String,
    pub first_name: String,
    pub status: String,
    pub position: String,
    pub basic_salary: String,
    pub hourly_rate: String,
    pub rice_subsidy: String,
    pub phone_allowance: String,
    pub clothing_allowance: String,
}

impl EmployeeRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// The calendar window a payroll run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PayPeriod {
    /// A calendar month, `month` in 1..=12.
    Month { year: i32, month: u32 },
    /// An ISO-8601 week.
    Week { year: i32, week: u32 },
}

impl PayPeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            PayPeriod::Month { year, month } => date.year() == year && date.month() == month,
            PayPeriod::Week { year, week } => {
                let iso = date.iso_week();
                iso.year() == year && iso.week() == week
            }
        }
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayPeriod::Month { year, month } => write!(f, "{year}-{month:02}"),
            PayPeriod::Week { year, week } => write!(f, "{year}-W{week:02}"),
        }
    }
}

/// Read-only view of all data a payroll run needs.
///
/// Built once by the caller (usually from [`crate::store`]) and passed
/// by reference; the engine never caches or mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayrollSnapshot {
    pub employees: Vec<EmployeeRecord>,
    pub attendance: Vec<AttendanceRecord>,
}

/// The result of a payroll calculation for a single employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeePayResult {
    pub employee_id: String,
    pub name: String,
    pub totals: PeriodTotals,
    pub breakdown: SalaryBreakdown,
    /// Names of employee fields that failed to parse and were replaced
    /// by zero.  Empty when every input was read successfully.
    pub defaulted_fields: Vec<String>,
}

impl EmployeePayResult {
    /// True when no input had to be defaulted.
    pub fn is_complete(&self) -> bool {
        self.defaulted_fields.is_empty()
    }
}

/// The aggregate result of a payroll run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayRunResult {
    /// The pay period that was processed.
    pub period: PayPeriod,
    /// Individual results for each employee.
    pub results: Vec<EmployeePayResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_period_matches_year_and_month() {
        let period = PayPeriod::Month { year: 2024, month: 6 };
        assert!(period.contains(date(2024, 6, 1)));
        assert!(period.contains(date(2024, 6, 30)));
        assert!(!period.contains(date(2024, 7, 1)));
        assert!(!period.contains(date(2023, 6, 15)));
    }

    #[test]
    fn week_period_uses_iso_weeks() {
        // 2024-06-10 is the Monday of ISO week 24.
        let period = PayPeriod::Week { year: 2024, week: 24 };
        assert!(period.contains(date(2024, 6, 10)));
        assert!(period.contains(date(2024, 6, 16)));
        assert!(!period.contains(date(2024, 6, 9)));
        assert!(!period.contains(date(2024, 6, 17)));
    }

    #[test]
    fn regular_hours_exclude_overtime() {
        let totals = PeriodTotals {
            days_counted: 1,
            days_skipped: 0,
            worked_minutes: 500,
            late_minutes: 0,
            overtime_minutes: 35,
        };
        assert_eq!(totals.regular_hours(), 465.0 / 60.0);
        assert_eq!(totals.overtime_hours(), 35.0 / 60.0);
    }

    #[test]
    fn time_of_day_serialises_as_text() {
        let t: TimeOfDay = serde_json::from_str("\"8:05\"").unwrap();
        assert_eq!(t.hour(), 8);
        assert_eq!(t.minute(), 5);
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"08:05\"");
    }

    #[test]
    fn deduction_proration_divides_each_amount() {
        let monthly = DeductionBreakdown {
            social_insurance: 900.0,
            health_insurance: 300.0,
            housing_fund: 100.0,
            withholding_tax: 0.0,
        };
        let weekly = monthly.prorated(4.0);
        assert_eq!(weekly.social_insurance, 225.0);
        assert_eq!(weekly.total(), 325.0);
    }
}
