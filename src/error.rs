//! Error types for the payroll engine.
//!
//! Most failures in this crate are recoverable at a fine granularity:
//! a bad timestamp costs one day, a bad salary field costs one figure.
//! `PayrollError` names each of those cases so callers can decide
//! whether to absorb, default or surface them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayrollError {
    /// An attendance timestamp matched none of the accepted patterns.
    #[error("unsupported time format: {input:?}")]
    TimeFormat { input: String },

    /// A salary, rate or allowance field could not be read as a number.
    #[error("cannot parse {field} from {input:?}")]
    NumericParse { field: String, input: String },

    /// An explicit salary input that is negative or not finite.
    #[error("{field} must be a non-negative amount, got {value}")]
    InvalidAmount { field: String, value: f64 },

    #[error("employee {id} not found")]
    EmployeeNotFound { id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, PayrollError>;
