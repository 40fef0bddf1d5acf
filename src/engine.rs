//! Payroll computation engine.
//!
//! The `engine` module turns a [`PayrollSnapshot`] and a [`PayPeriod`]
//! into a [`PayRunResult`].  For every employee it aggregates the
//! period's attendance under the [`ShiftPolicy`], parses the salary
//! fields and hands both to the [`SalaryAggregator`].  Employees are
//! independent of each other, so the run is spread across CPU cores
//! with [`rayon`]; each individual computation is pure.

use rayon::prelude::*;
use tracing::{info, warn};

use crate::amount::PayInputs;
use crate::attendance::ShiftPolicy;
use crate::error::{PayrollError, Result};
use crate::models::{
    AttendanceRecord, EmployeePayResult, EmployeeRecord, PayPeriod, PayRunResult, PayrollSnapshot,
};
use crate::salary::{SalaryAggregator, SalaryRequest};

#[derive(Clone, Default)]
pub struct PayrollEngine {
    policy: ShiftPolicy,
    aggregator: SalaryAggregator,
}

impl PayrollEngine {
    pub fn new(policy: ShiftPolicy, aggregator: SalaryAggregator) -> Self {
        Self { policy, aggregator }
    }

    pub fn policy(&self) -> &ShiftPolicy {
        &self.policy
    }

    pub fn aggregator(&self) -> &SalaryAggregator {
        &self.aggregator
    }

    /// Computes one employee's pay for `period`.
    pub fn compute_employee(
        &self,
        employee: &EmployeeRecord,
        attendance: &[AttendanceRecord],
        period: PayPeriod,
    ) -> EmployeePayResult {
        let totals = self
            .policy
            .aggregate(attendance, &employee.id, |date| period.contains(date));
        let inputs = PayInputs::from_record(employee);
        if !inputs.defaulted_fields.is_empty() {
            warn!(
                employee = %employee.id,
                fields = ?inputs.defaulted_fields,
                "salary computed with defaulted inputs"
            );
        }

        let request = SalaryRequest {
            hourly_rate: inputs.hourly_rate,
            regular_hours: totals.regular_hours(),
            overtime_hours: totals.overtime_hours(),
            basic_salary: inputs.basic_salary,
            benefits: inputs.benefits,
            late_minutes: totals.late_minutes,
            prorate_deductions: true,
        };
        let breakdown = self.aggregator.compute(&request);

        EmployeePayResult {
            employee_id: employee.id.clone(),
            name: employee.full_name(),
            totals,
            breakdown,
            defaulted_fields: inputs.defaulted_fields,
        }
    }

    /// Runs payroll for every employee in the snapshot.
    pub fn run_payroll(&self, snapshot: &PayrollSnapshot, period: PayPeriod) -> PayRunResult {
        let results: Vec<EmployeePayResult> = snapshot
            .employees
            .par_iter()
            .map(|employee| self.compute_employee(employee, &snapshot.attendance, period))
            .collect();
        let incomplete = results.iter().filter(|r| !r.is_complete()).count();
        info!(
            %period,
            employees = results.len(),
            incomplete,
            schedule = self.aggregator.calculator().schedule_name(),
            "payroll run finished"
        );
        PayRunResult { period, results }
    }

    /// Runs payroll for a single employee of the snapshot.
    pub fn run_for_employee(
        &self,
        snapshot: &PayrollSnapshot,
        employee_id: &str,
        period: PayPeriod,
    ) -> Result<EmployeePayResult> {
        let employee = snapshot
            .employees
            .iter()
            .find(|e| e.id == employee_id)
            .ok_or_else(|| PayrollError::EmployeeNotFound { id: employee_id.to_string() })?;
        Ok(self.compute_employee(employee, &snapshot.attendance, period))
    }
}

/// Runs payroll with the default policy, rules and statutory schedule.
pub fn run_payroll(snapshot: &PayrollSnapshot, period: PayPeriod) -> PayRunResult {
    PayrollEngine::default().run_payroll(snapshot, period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn employee(id: &str, hourly_rate: &str) -> EmployeeRecord {
        EmployeeRecord {
            id: id.into(),
            last_name: "Garcia".into(),
            first_name: "Manuel".into(),
            basic_salary: "20,000".into(),
            hourly_rate: hourly_rate.into(),
            rice_subsidy: "1,500".into(),
            phone_allowance: "500".into(),
            clothing_allowance: "1,000".into(),
            ..EmployeeRecord::default()
        }
    }

    fn day(id: &str, d: u32, time_in: &str, time_out: &str) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: id.into(),
            date: NaiveDate::from_ymd_opt(2024, 6, d).unwrap(),
            time_in: time_in.into(),
            time_out: time_out.into(),
        }
    }

    fn snapshot() -> PayrollSnapshot {
        PayrollSnapshot {
            employees: vec![employee("10001", "100"), employee("10002", "oops")],
            attendance: vec![
                day("10001", 3, "8:00", "17:00"),
                day("10001", 4, "9:47", "19:07"),
                day("10001", 5, "8:45", "17:00"),
                day("10002", 3, "8:00", "17:00"),
            ],
        }
    }

    #[test]
    fn computes_hours_and_pay_from_attendance() {
        let period = PayPeriod::Month { year: 2024, month: 6 };
        let result = PayrollEngine::default()
            .run_for_employee(&snapshot(), "10001", period)
            .unwrap();

        // 480 + 500 + 435 worked, 35 of them overtime, 30 late.
        assert_eq!(result.totals.worked_minutes, 1415);
        assert_eq!(result.totals.overtime_minutes, 35);
        assert_eq!(result.totals.late_minutes, 30);

        let b = &result.breakdown;
        assert!((b.regular_hours - 1380.0 / 60.0).abs() < 1e-9);
        assert!((b.regular_pay - 2300.0).abs() < 1e-9);
        assert!((b.overtime_pay - 100.0 * (35.0 / 60.0) * 1.5).abs() < 1e-9);
        assert_eq!(b.total_deductions, 325.0);
        assert!(result.is_complete());
        assert_eq!(result.name, "Manuel Garcia");
    }

    #[test]
    fn defaulted_rate_is_reported() {
        let period = PayPeriod::Month { year: 2024, month: 6 };
        let run = run_payroll(&snapshot(), period);
        assert_eq!(run.results.len(), 2);
        let second = run.results.iter().find(|r| r.employee_id == "10002").unwrap();
        assert_eq!(second.defaulted_fields, vec!["hourly_rate"]);
        assert_eq!(second.breakdown.regular_pay, 0.0);
        assert!(!second.is_complete());
    }

    #[test]
    fn unknown_employee_is_an_error() {
        let period = PayPeriod::Week { year: 2024, week: 23 };
        let err = PayrollEngine::default()
            .run_for_employee(&snapshot(), "99999", period)
            .unwrap_err();
        assert!(matches!(err, PayrollError::EmployeeNotFound { .. }));
    }

    #[test]
    fn results_keep_snapshot_order() {
        let period = PayPeriod::Month { year: 2024, month: 6 };
        let run = run_payroll(&snapshot(), period);
        let ids: Vec<&str> = run.results.iter().map(|r| r.employee_id.as_str()).collect();
        assert_eq!(ids, vec!["10001", "10002"]);
    }
}
