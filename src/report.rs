//! Plain-text salary reports.

use std::fmt::{self, Write};

use crate::models::EmployeePayResult;
use crate::salary::round_currency;

const CURRENCY: &str = "₱";

/// Formats `amount` with two decimals and comma thousands separators.
pub fn format_amount(amount: f64) -> String {
    let cents = format!("{:.2}", round_currency(amount).abs());
    let (whole, fraction) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if round_currency(amount) < 0.0 { "-" } else { "" };
    format!("{sign}{CURRENCY}{grouped}.{fraction}")
}

/// Writes the weekly salary report for one employee to `out`.
pub fn write_weekly_report(out: &mut impl Write, result: &EmployeePayResult) -> fmt::Result {
    let b = &result.breakdown;
    let m = &b.monthly_deductions;

    writeln!(out, "===== WEEKLY SALARY REPORT =====")?;
    writeln!(out, "Employee: {} ({})", result.name, result.employee_id)?;
    writeln!(out)?;
    writeln!(out, "BENEFITS:")?;
    writeln!(out, "  Rice Subsidy: {}", format_amount(b.benefits.rice_subsidy))?;
    writeln!(out, "  Phone Allowance: {}", format_amount(b.benefits.phone_allowance))?;
    writeln!(out, "  Clothing Allowance: {}", format_amount(b.benefits.clothing_allowance))?;
    writeln!(out, "  Total Benefits: {}", format_amount(b.benefits.total()))?;
    writeln!(out)?;
    writeln!(out, "WORK DETAILS:")?;
    writeln!(out, "  Hourly Rate: {}", format_amount(b.hourly_rate))?;
    writeln!(out, "  Regular Hours: {:.2}", b.regular_hours)?;
    writeln!(out, "  Overtime Hours: {:.2}", b.overtime_hours)?;
    writeln!(out, "  Late Minutes: {}", b.late_minutes)?;
    if result.totals.days_skipped > 0 {
        writeln!(out, "  Days Skipped (bad time format): {}", result.totals.days_skipped)?;
    }
    writeln!(out)?;
    writeln!(out, "SALARY:")?;
    writeln!(out, "  Regular Pay: {}", format_amount(b.regular_pay))?;
    writeln!(out, "  Overtime Pay: {}", format_amount(b.overtime_pay))?;
    writeln!(out, "  Gross Weekly Salary (with benefits): {}", format_amount(b.gross_pay))?;
    writeln!(out, "  Late Deduction: {}", format_amount(b.late_penalty))?;
    writeln!(out)?;
    writeln!(out, "DEDUCTIONS (Monthly Basis):")?;
    writeln!(out, "  Social Insurance: {}", format_amount(m.social_insurance))?;
    writeln!(out, "  Health Insurance: {}", format_amount(m.health_insurance))?;
    writeln!(out, "  Housing Fund: {}", format_amount(m.housing_fund))?;
    writeln!(out, "  Withholding Tax: {}", format_amount(m.withholding_tax))?;
    writeln!(out, "  Weekly Deduction Total: {}", format_amount(b.total_deductions))?;
    writeln!(out)?;
    writeln!(out, "Net Weekly Salary: {}", format_amount(b.net_pay))?;
    if !result.is_complete() {
        writeln!(
            out,
            "WARNING: defaulted to 0 after parse failure: {}",
            result.defaulted_fields.join(", ")
        )?;
    }
    Ok(())
}

/// Renders the weekly salary report for one employee.
pub fn render_weekly_report(result: &EmployeePayResult) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_weekly_report(&mut out, result);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Benefits, PeriodTotals};
    use crate::salary::{compute_salary, SalaryRequest};

    #[test]
    fn amounts_are_grouped_by_thousands() {
        assert_eq!(format_amount(0.0), "₱0.00");
        assert_eq!(format_amount(999.999), "₱1,000.00");
        assert_eq!(format_amount(1234567.891), "₱1,234,567.89");
        assert_eq!(format_amount(-325.5), "-₱325.50");
    }

    #[test]
    fn report_lists_deductions_and_warnings() {
        let breakdown = compute_salary(&SalaryRequest {
            hourly_rate: 100.0,
            regular_hours: 40.0,
            overtime_hours: 0.0,
            basic_salary: 20000.0,
            benefits: Benefits {
                rice_subsidy: 1500.0,
                phone_allowance: 500.0,
                clothing_allowance: 1000.0,
            },
            late_minutes: 0,
            prorate_deductions: true,
        });
        let result = EmployeePayResult {
            employee_id: "10001".into(),
            name: "Manuel Garcia".into(),
            totals: PeriodTotals::default(),
            breakdown,
            defaulted_fields: vec!["phone_allowance".into()],
        };
        let report = render_weekly_report(&result);
        assert!(report.contains("Employee: Manuel Garcia (10001)"));
        assert!(report.contains("Social Insurance: ₱900.00"));
        assert!(report.contains("Weekly Deduction Total: ₱325.00"));
        assert!(report.contains("Net Weekly Salary: ₱6,675.00"));
        assert!(report.contains("WARNING: defaulted to 0 after parse failure: phone_allowance"));
    }
}
