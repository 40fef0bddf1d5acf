//! Payroll Engine library crate.
//!
//! This crate exposes the payroll computation core (time parsing,
//! attendance analysis, statutory deductions and salary aggregation)
//! together with the file-backed stores, report rendering and HTTP API
//! built around it.  External applications may depend on the
//! `payroll_engine` crate and call `salary::compute_salary` or
//! `engine::run_payroll` directly, or embed the API via
//! `api::build_router`.

pub mod amount;
pub mod api;
pub mod attendance;
pub mod config;
pub mod deductions;
pub mod engine;
pub mod error;
pub mod logging;
pub mod models;
pub mod report;
pub mod salary;
pub mod store;
pub mod time;

pub use engine::{run_payroll, PayrollEngine};
pub use error::{PayrollError, Result};
pub use salary::{compute_salary, SalaryAggregator, SalaryRequest};
