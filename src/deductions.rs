//! Statutory deduction calculation.
//!
//! Four mandatory withholdings are derived from an employee's monthly
//! basic salary and nothing else: the social-insurance contribution,
//! the health-insurance premium (employee share), the housing-fund
//! contribution and the withholding tax.  Each is a pure function so
//! that a salary report can always be reproduced from its inputs.
//!
//! The [`DeductionCalculator`] trait is the seam the payroll engine
//! uses; [`StatutoryCalculator`] implements it with the fixed tables in
//! this module.

use serde::Serialize;
use tracing::warn;

use crate::models::DeductionBreakdown;

/// A social-insurance salary band.  `upper` is the last whole cent of
/// the band; a band covers every salary from `lower` up to the next
/// band's `lower`, so fractional cents never fall between bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContributionBracket {
    pub lower: f64,
    pub upper: f64,
    pub contribution: f64,
}

const fn band(lower: f64, upper: f64, contribution: f64) -> ContributionBracket {
    ContributionBracket { lower, upper, contribution }
}

/// Monthly social-insurance contribution by salary band.
pub const SOCIAL_INSURANCE_TABLE: [ContributionBracket; 45] = [
    band(0.0, 3249.99, 135.00),
    band(3250.0, 3749.99, 157.50),
    band(3750.0, 4249.99, 180.00),
    band(4250.0, 4749.99, 202.50),
    band(4750.0, 5249.99, 225.00),
    band(5250.0, 5749.99, 247.50),
    band(5750.0, 6249.99, 270.00),
    band(6250.0, 6749.99, 292.50),
    band(6750.0, 7249.99, 315.00),
    band(7250.0, 7749.99, 337.50),
    band(7750.0, 8249.99, 360.00),
    band(8250.0, 8749.99, 382.50),
    band(8750.0, 9249.99, 405.00),
    band(9250.0, 9749.99, 427.50),
    band(9750.0, 10249.99, 450.00),
    band(10250.0, 10749.99, 472.50),
    band(10750.0, 11249.99, 495.00),
    band(11250.0, 11749.99, 517.50),
    band(11750.0, 12249.99, 540.00),
    band(12250.0, 12749.99, 562.50),
    band(12750.0, 13249.99, 585.00),
    band(13250.0, 13749.99, 607.50),
    band(13750.0, 14249.99, 630.00),
    band(14250.0, 14749.99, 652.50),
    band(14750.0, 15249.99, 675.00),
    band(15250.0, 15749.99, 697.50),
    band(15750.0, 16249.99, 720.00),
    band(16250.0, 16749.99, 742.50),
    band(16750.0, 17249.99, 765.00),
    band(17250.0, 17749.99, 787.50),
    band(17750.0, 18249.99, 810.00),
    band(18250.0, 18749.99, 832.50),
    band(18750.0, 19249.99, 855.00),
    band(19250.0, 19749.99, 877.50),
    band(19750.0, 20249.99, 900.00),
    band(20250.0, 20749.99, 922.50),
    band(20750.0, 21249.99, 945.00),
    band(21250.0, 21749.99, 967.50),
    band(21750.0, 22249.99, 990.00),
    band(22250.0, 22749.99, 1012.50),
    band(22750.0, 23249.99, 1035.00),
    band(23250.0, 23749.99, 1057.50),
    band(23750.0, 24249.99, 1080.00),
    band(24250.0, 24749.99, 1102.50),
    band(24750.0, f64::MAX, 1125.00),
];

pub const HEALTH_PREMIUM_RATE: f64 = 0.03;
pub const HEALTH_PREMIUM_FLOOR: f64 = 300.0;
pub const HEALTH_PREMIUM_CEILING: f64 = 1800.0;

pub const HOUSING_FUND_THRESHOLD: f64 = 1500.0;
pub const HOUSING_FUND_HIGH_RATE: f64 = 0.02;
pub const HOUSING_FUND_LOW_RATE: f64 = 0.01;
pub const HOUSING_FUND_CAP: f64 = 100.0;

/// A withholding-tax bracket: income up to and including `up_to` pays
/// `base + (income - excess_over) * rate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaxBracket {
    pub up_to: f64,
    pub base: f64,
    pub excess_over: f64,
    pub rate: f64,
}

const fn tax(up_to: f64, base: f64, excess_over: f64, rate: f64) -> TaxBracket {
    TaxBracket { up_to, base, excess_over, rate }
}

/// Monthly withholding-tax schedule.  Income at or below the first
/// ceiling is exempt.
pub const WITHHOLDING_TAX_TABLE: [TaxBracket; 6] = [
    tax(20832.0, 0.0, 0.0, 0.0),
    tax(33332.0, 0.0, 20833.0, 0.20),
    tax(66667.0, 2500.0, 33333.0, 0.25),
    tax(166667.0, 10833.0, 66667.0, 0.30),
    tax(666667.0, 40833.33, 166667.0, 0.32),
    tax(f64::INFINITY, 200833.33, 666667.0, 0.35),
];

/// Monthly social-insurance contribution for `basic_salary`.
///
/// The bands partition `[0, ∞)`: the last band whose lower bound does
/// not exceed the salary applies.  Returns 0 only for negative or NaN
/// input.
pub fn social_insurance(basic_salary: f64) -> f64 {
    SOCIAL_INSURANCE_TABLE
        .iter()
        .rev()
        .find(|b| basic_salary >= b.lower)
        .map(|b| b.contribution)
        .unwrap_or_else(|| {
            warn!("no social insurance bracket for basic salary {basic_salary}");
            0.0
        })
}

/// Employee share of the monthly health-insurance premium.
pub fn health_insurance(basic_salary: f64) -> f64 {
    let premium = (basic_salary * HEALTH_PREMIUM_RATE).clamp(HEALTH_PREMIUM_FLOOR, HEALTH_PREMIUM_CEILING);
    premium / 2.0
}

/// Monthly housing-fund contribution, never above the cap.
pub fn housing_fund(basic_salary: f64) -> f64 {
    let rate = if basic_salary > HOUSING_FUND_THRESHOLD {
        HOUSING_FUND_HIGH_RATE
    } else {
        HOUSING_FUND_LOW_RATE
    };
    (basic_salary * rate).clamp(0.0, HOUSING_FUND_CAP)
}

/// Withholding tax on a monthly taxable income.
pub fn withholding_tax(monthly_taxable_income: f64) -> f64 {
    WITHHOLDING_TAX_TABLE
        .iter()
        .find(|b| monthly_taxable_income <= b.up_to)
        .map(|b| b.base + (monthly_taxable_income - b.excess_over) * b.rate)
        .unwrap_or(0.0)
        .max(0.0)
}

/// Basic salary less the three contributions.
pub fn taxable_income(basic_salary: f64) -> f64 {
    basic_salary - (social_insurance(basic_salary) + health_insurance(basic_salary) + housing_fund(basic_salary))
}

/// Withholding tax for a basic salary, computing taxable income first.
pub fn monthly_withholding_tax(basic_salary: f64) -> f64 {
    withholding_tax(taxable_income(basic_salary))
}

/// All four deductions on their monthly basis.
pub fn monthly_deductions(basic_salary: f64) -> DeductionBreakdown {
    DeductionBreakdown {
        social_insurance: social_insurance(basic_salary),
        health_insurance: health_insurance(basic_salary),
        housing_fund: housing_fund(basic_salary),
        withholding_tax: monthly_withholding_tax(basic_salary),
    }
}

/// Computes the monthly statutory deductions for a basic salary.
///
/// Calculators must be thread-safe (`Send + Sync`) because the engine
/// fans payroll runs out across threads.
pub trait DeductionCalculator: Send + Sync {
    /// Short identifier of the schedule, reported alongside results.
    fn schedule_name(&self) -> &str;
    fn monthly(&self, basic_salary: f64) -> DeductionBreakdown;
}

/// The fixed statutory schedule defined by the tables in this module.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatutoryCalculator;

impl DeductionCalculator for StatutoryCalculator {
    fn schedule_name(&self) -> &str {
        "statutory"
    }

    fn monthly(&self, basic_salary: f64) -> DeductionBreakdown {
        monthly_deductions(basic_salary)
    }
}
