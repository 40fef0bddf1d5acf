//! Salary aggregation.
//!
//! Combines pay rate, hours, benefits, lateness and the statutory
//! deductions into a [`SalaryBreakdown`].  Deductions are computed on a
//! monthly basis from the basic salary and prorated to the pay week by
//! a fixed divisor.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::deductions::{DeductionCalculator, StatutoryCalculator};
use crate::error::{PayrollError, Result};
use crate::models::{Benefits, SalaryBreakdown};

/// Monetary rules applied on top of the raw hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayRules {
    /// Multiplier applied to the hourly rate for overtime hours.
    pub overtime_multiplier: f64,
    /// Monthly deductions are divided by this to get the weekly share.
    pub proration_divisor: f64,
    /// Share of regular pay forfeited per full workday of lateness.
    pub late_penalty_rate: f64,
    /// Upper bound of the late penalty as a share of regular pay.
    pub late_penalty_cap: f64,
    pub workday_minutes: f64,
}

impl Default for PayRules {
    fn default() -> Self {
        Self {
            overtime_multiplier: 1.5,
            proration_divisor: 4.0,
            late_penalty_rate: 0.10,
            late_penalty_cap: 0.20,
            workday_minutes: 480.0,
        }
    }
}

/// Inputs of a single salary computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRequest {
    pub hourly_rate: f64,
    pub regular_hours: f64,
    #[serde(default)]
    pub overtime_hours: f64,
    /// Monthly basic salary; the only input to the deductions.
    pub basic_salary: f64,
    #[serde(default)]
    pub benefits: Benefits,
    /// Late minutes left after same-day overtime netting.
    #[serde(default)]
    pub late_minutes: i64,
    /// Subtract the weekly share of the deductions rather than the full
    /// monthly amounts.
    #[serde(default = "default_prorate")]
    pub prorate_deductions: bool,
}

fn default_prorate() -> bool {
    true
}

impl SalaryRequest {
    /// Rejects negative or non-finite amounts, hours and late minutes.
    pub fn validate(&self) -> Result<()> {
        let amounts = [
            ("hourly_rate", self.hourly_rate),
            ("regular_hours", self.regular_hours),
            ("overtime_hours", self.overtime_hours),
            ("basic_salary", self.basic_salary),
            ("rice_subsidy", self.benefits.rice_subsidy),
            ("phone_allowance", self.benefits.phone_allowance),
            ("clothing_allowance", self.benefits.clothing_allowance),
            ("late_minutes", self.late_minutes as f64),
        ];
        match amounts.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            Some((field, value)) => Err(PayrollError::InvalidAmount {
                field: field.to_string(),
                value: *value,
            }),
            None => Ok(()),
        }
    }
}

/// Computes salary breakdowns with a fixed set of rules and a
/// deduction schedule.
#[derive(Clone)]
pub struct SalaryAggregator {
    rules: PayRules,
    calculator: Arc<dyn DeductionCalculator>,
}

impl Default for SalaryAggregator {
    fn default() -> Self {
        Self::new(PayRules::default(), Arc::new(StatutoryCalculator))
    }
}

impl SalaryAggregator {
    pub fn new(rules: PayRules, calculator: Arc<dyn DeductionCalculator>) -> Self {
        Self { rules, calculator }
    }

    pub fn rules(&self) -> &PayRules {
        &self.rules
    }

    pub fn calculator(&self) -> &dyn DeductionCalculator {
        self.calculator.as_ref()
    }

    /// Penalty for `late_minutes` of tardiness against `regular_pay`,
    /// capped at `late_penalty_cap` of regular pay.
    pub fn late_penalty(&self, regular_pay: f64, late_minutes: i64) -> f64 {
        if late_minutes <= 0 {
            return 0.0;
        }
        let penalty =
            regular_pay * self.rules.late_penalty_rate * (late_minutes as f64 / self.rules.workday_minutes);
        penalty.min(regular_pay * self.rules.late_penalty_cap).max(0.0)
    }

    pub fn compute(&self, request: &SalaryRequest) -> SalaryBreakdown {
        let rules = &self.rules;
        let regular_pay = request.hourly_rate * request.regular_hours;
        let overtime_pay = request.hourly_rate * request.overtime_hours * rules.overtime_multiplier;
        let gross_pay = regular_pay + overtime_pay + request.benefits.total();

        let monthly_deductions = self.calculator.monthly(request.basic_salary);
        let divisor = if request.prorate_deductions { rules.proration_divisor } else { 1.0 };
        let weekly_deductions = monthly_deductions.prorated(divisor);
        let total_deductions = weekly_deductions.total();

        let late_penalty = self.late_penalty(regular_pay, request.late_minutes);
        let net_pay = gross_pay - total_deductions - late_penalty;

        SalaryBreakdown {
            hourly_rate: request.hourly_rate,
            regular_hours: request.regular_hours,
            overtime_hours: request.overtime_hours,
            late_minutes: request.late_minutes,
            regular_pay,
            overtime_pay,
            benefits: request.benefits,
            gross_pay,
            late_penalty,
            weekly_deductions,
            monthly_deductions,
            total_deductions,
            net_pay,
        }
    }
}

/// Computes a breakdown with the default rules and statutory schedule.
pub fn compute_salary(request: &SalaryRequest) -> SalaryBreakdown {
    SalaryAggregator::default().compute(request)
}

/// Rounds to whole cents, half away from zero.
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
