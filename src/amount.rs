//! Parsing of monetary fields from employee records.
//!
//! Salary columns arrive as spreadsheet text: `"22,500.00"`, `1,500`,
//! sometimes blank.  [`parse_amount`] is strict and returns an error;
//! [`parse_amount_or`] substitutes a default but records that it did,
//! so a zero paycheck caused by a bad field can be told apart from a
//! real one.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PayrollError, Result};
use crate::models::{Benefits, EmployeeRecord};

/// Parses `raw` after removing quotes and thousands separators.
/// Non-finite values are rejected.
pub fn parse_amount(field: &str, raw: &str) -> Result<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != '"' && *c != ',').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| PayrollError::NumericParse {
            field: field.to_string(),
            input: raw.to_string(),
        })
}

/// A parsed amount and whether it is a substituted default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParsedAmount {
    pub value: f64,
    pub defaulted: bool,
}

pub fn parse_amount_or(field: &str, raw: &str, default: f64) -> ParsedAmount {
    match parse_amount(field, raw) {
        Ok(value) => ParsedAmount { value, defaulted: false },
        Err(err) => {
            warn!("{err}; using {default}");
            ParsedAmount { value: default, defaulted: true }
        }
    }
}

/// Numeric inputs of one employee, ready for the salary aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayInputs {
    pub basic_salary: f64,
    pub hourly_rate: f64,
    pub benefits: Benefits,
    /// Fields that could not be parsed and were set to 0.
    pub defaulted_fields: Vec<String>,
}

impl PayInputs {
    /// Parses every numeric column of `employee`, defaulting failures
    /// to 0.
    pub fn from_record(employee: &EmployeeRecord) -> Self {
        let mut defaulted_fields = Vec::new();
        let mut read = |field: &str, raw: &str| {
            let parsed = parse_amount_or(field, raw, 0.0);
            if parsed.defaulted {
                defaulted_fields.push(field.to_string());
            }
            parsed.value
        };

        let basic_salary = read("basic_salary", &employee.basic_salary);
        let hourly_rate = read("hourly_rate", &employee.hourly_rate);
        let benefits = Benefits {
            rice_subsidy: read("rice_subsidy", &employee.rice_subsidy),
            phone_allowance: read("phone_allowance", &employee.phone_allowance),
            clothing_allowance: read("clothing_allowance", &employee.clothing_allowance),
        };

        Self { basic_salary, hourly_rate, benefits, defaulted_fields }
    }
}
