//! File-backed employee and attendance tables.
//!
//! Both tables are delimited text with a header row: the employee file
//! uses `;`, the attendance file `,`.  Tables are loaded whole, edited
//! in memory and written back whole after every change.  A missing file
//! loads as an empty table with the standard headers.

use chrono::NaiveDate;
use csv::{QuoteStyle, ReaderBuilder, Trim, WriterBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::amount::PayInputs;
use crate::error::Result;
use crate::models::{AttendanceRecord, Benefits, EmployeeRecord, PayrollSnapshot};

pub const EMPLOYEE_FILE: &str = "employee.txt";
pub const ATTENDANCE_FILE: &str = "attendance.txt";
pub const ATTENDANCE_DATE_FORMAT: &str = "%m/%d/%Y";

pub const EMPLOYEE_HEADERS: [&str; 19] = [
    "Employee #",
    "Last Name",
    "First Name",
    "Birthday",
    "Address",
    "Phone Number",
    "SSS #",
    "Philhealth #",
    "TIN #",
    "Pag-ibig #",
    "Status",
    "Position",
    "Immediate Supervisor",
    "Basic Salary",
    "Rice Subsidy",
    "Phone Allowance",
    "Clothing Allowance",
    "Gross Semi-monthly Rate",
    "Hourly Rate",
];

pub const ATTENDANCE_HEADERS: [&str; 4] = ["Employee #", "Date", "Log In", "Log Out"];

const EMPLOYEE_ID_COLUMN: &str = "Employee #";

#[derive(Debug, Clone)]
struct DelimitedTable {
    path: PathBuf,
    delimiter: u8,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn clean_field(field: &str) -> String {
    field.trim().trim_matches('"').trim().to_string()
}

impl DelimitedTable {
    fn load(path: &Path, delimiter: u8, default_headers: &[&str]) -> Result<Self> {
        let mut table = Self {
            path: path.to_path_buf(),
            delimiter,
            headers: default_headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        };
        if !path.exists() {
            warn!("{} not found, starting with an empty table", path.display());
            return Ok(table);
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(clean_field).collect();
        if headers.iter().any(|h| !h.is_empty()) {
            table.headers = headers;
        }
        for record in reader.records() {
            let row: Vec<String> = record?.iter().map(clean_field).collect();
            if row.first().map_or(true, |id| id.is_empty()) {
                continue;
            }
            table.rows.push(row);
        }
        info!("{} loaded: {} rows", path.display(), table.rows.len());
        Ok(table)
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(QuoteStyle::Necessary)
            .flexible(true)
            .from_path(&self.path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        info!("{} written: {} rows", self.path.display(), self.rows.len());
        Ok(())
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Pads short rows with empty fields and truncates long ones.
    fn fit(&self, mut row: Vec<String>) -> Vec<String> {
        row.resize(self.headers.len(), String::new());
        row
    }
}

/// The employee table.
#[derive(Debug, Clone)]
pub struct EmployeeStore {
    table: DelimitedTable,
}

impl EmployeeStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut table = DelimitedTable::load(path.as_ref(), b';', &EMPLOYEE_HEADERS)?;
        let width = table.headers.len();
        for row in &mut table.rows {
            row.resize(width, String::new());
        }
        Ok(Self { table })
    }

    pub fn save(&self) -> Result<()> {
        self.table.save()
    }

    pub fn headers(&self) -> &[String] {
        &self.table.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.table.rows
    }

    fn id_column(&self) -> usize {
        self.table.column(EMPLOYEE_ID_COLUMN).unwrap_or(0)
    }

    fn position(&self, employee_id: &str) -> Option<usize> {
        let id_column = self.id_column();
        self.table
            .rows
            .iter()
            .position(|row| row.get(id_column).map(String::as_str) == Some(employee_id))
    }

    pub fn find(&self, employee_id: &str) -> Option<&[String]> {
        self.position(employee_id).map(|i| self.table.rows[i].as_slice())
    }

    fn project(&self, row: &[String]) -> EmployeeRecord {
        let field = |name: &str| {
            self.table
                .column(name)
                .and_then(|i| row.get(i))
                .cloned()
                .unwrap_or_default()
        };
        EmployeeRecord {
            id: field(EMPLOYEE_ID_COLUMN),
            last_name: field("Last Name"),
            first_name: field("First Name"),
            status: field("Status"),
            position: field("Position"),
            basic_salary: field("Basic Salary"),
            hourly_rate: field("Hourly Rate"),
            rice_subsidy: field("Rice Subsidy"),
            phone_allowance: field("Phone Allowance"),
            clothing_allowance: field("Clothing Allowance"),
        }
    }

    pub fn record(&self, employee_id: &str) -> Option<EmployeeRecord> {
        self.find(employee_id).map(|row| self.project(row))
    }

    pub fn records(&self) -> Vec<EmployeeRecord> {
        self.table.rows.iter().map(|row| self.project(row)).collect()
    }

    /// Benefits of `employee_id`, zero when the employee is unknown or a
    /// field does not parse.
    pub fn benefits(&self, employee_id: &str) -> Benefits {
        self.record(employee_id)
            .map(|employee| PayInputs::from_record(&employee).benefits)
            .unwrap_or_default()
    }

    /// Adds a row and persists the table.  Returns `false` without
    /// writing when the employee number is already present.
    pub fn append(&mut self, row: Vec<String>) -> Result<bool> {
        let row = self.table.fit(row);
        let employee_id = row.get(self.id_column()).cloned().unwrap_or_default();
        if employee_id.is_empty() || self.position(&employee_id).is_some() {
            warn!("refusing to append employee {employee_id:?}: empty or duplicate id");
            return Ok(false);
        }
        self.table.rows.push(row);
        self.table.save()?;
        Ok(true)
    }

    /// Sets one column of one employee and persists the table.
    /// Returns `false` when either the employee or the column is
    /// unknown.
    pub fn update_field(&mut self, employee_id: &str, column: &str, value: &str) -> Result<bool> {
        let (Some(index), Some(column)) = (self.position(employee_id), self.table.column(column)) else {
            return Ok(false);
        };
        self.table.rows[index][column] = value.to_string();
        self.table.save()?;
        Ok(true)
    }

    /// Sets the three benefit columns in one write.  Returns `false`,
    /// changing nothing, when the employee or any benefit column is
    /// missing.
    pub fn update_benefits(&mut self, employee_id: &str, benefits: &Benefits) -> Result<bool> {
        let columns = ["Rice Subsidy", "Phone Allowance", "Clothing Allowance"].map(|name| self.table.column(name));
        let (Some(index), [Some(rice), Some(phone), Some(clothing)]) = (self.position(employee_id), columns) else {
            return Ok(false);
        };
        let row = &mut self.table.rows[index];
        row[rice] = benefits.rice_subsidy.to_string();
        row[phone] = benefits.phone_allowance.to_string();
        row[clothing] = benefits.clothing_allowance.to_string();
        self.table.save()?;
        Ok(true)
    }

    pub fn delete(&mut self, employee_id: &str) -> Result<bool> {
        let Some(index) = self.position(employee_id) else {
            return Ok(false);
        };
        self.table.rows.remove(index);
        self.table.save()?;
        Ok(true)
    }
}

/// The attendance table.  Columns are positional: employee number,
/// date (`MM/dd/yyyy`), clock-in, clock-out.
#[derive(Debug, Clone)]
pub struct AttendanceStore {
    table: DelimitedTable,
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, ATTENDANCE_DATE_FORMAT).ok()
}

fn attendance_row(record: &AttendanceRecord) -> Vec<String> {
    vec![
        record.employee_id.clone(),
        record.date.format(ATTENDANCE_DATE_FORMAT).to_string(),
        record.time_in.clone(),
        record.time_out.clone(),
    ]
}

impl AttendanceStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut table = DelimitedTable::load(path.as_ref(), b',', &ATTENDANCE_HEADERS)?;
        let width = table.headers.len();
        table.rows.retain(|row| {
            let keep = row.len() == width;
            if !keep {
                warn!("skipping malformed attendance row: {row:?}");
            }
            keep
        });
        Ok(Self { table })
    }

    pub fn save(&self) -> Result<()> {
        self.table.save()
    }

    pub fn headers(&self) -> &[String] {
        &self.table.headers
    }

    /// Rows as typed records.  Rows with fewer than four fields or an
    /// unparsable date are skipped.
    pub fn records(&self) -> Vec<AttendanceRecord> {
        self.table
            .rows
            .iter()
            .filter_map(|row| {
                let [employee_id, date, time_in, time_out] = row.get(..4)? else {
                    return None;
                };
                let Some(date) = parse_date(date) else {
                    warn!("skipping invalid date: {date}");
                    return None;
                };
                Some(AttendanceRecord {
                    employee_id: employee_id.clone(),
                    date,
                    time_in: time_in.clone(),
                    time_out: time_out.clone(),
                })
            })
            .collect()
    }

    fn position(&self, employee_id: &str, date: NaiveDate) -> Option<usize> {
        self.table.rows.iter().position(|row| {
            row.first().map(String::as_str) == Some(employee_id)
                && row.get(1).and_then(|d| parse_date(d)) == Some(date)
        })
    }

    pub fn append(&mut self, record: &AttendanceRecord) -> Result<()> {
        let row = self.table.fit(attendance_row(record));
        self.table.rows.push(row);
        self.table.save()
    }

    /// Replaces the row for `employee_id` on `date`.  Returns `false`
    /// when there is no such row.
    pub fn update(&mut self, employee_id: &str, date: NaiveDate, record: &AttendanceRecord) -> Result<bool> {
        let Some(index) = self.position(employee_id, date) else {
            return Ok(false);
        };
        self.table.rows[index] = self.table.fit(attendance_row(record));
        self.table.save()?;
        Ok(true)
    }

    pub fn delete(&mut self, employee_id: &str, date: NaiveDate) -> Result<bool> {
        let Some(index) = self.position(employee_id, date) else {
            return Ok(false);
        };
        self.table.rows.remove(index);
        self.table.save()?;
        Ok(true)
    }
}

/// Loads both tables from `data_dir` into a read-only snapshot.
pub fn load_snapshot(data_dir: impl AsRef<Path>) -> Result<PayrollSnapshot> {
    let data_dir = data_dir.as_ref();
    let employees = EmployeeStore::load(data_dir.join(EMPLOYEE_FILE))?;
    let attendance = AttendanceStore::load(data_dir.join(ATTENDANCE_FILE))?;
    Ok(PayrollSnapshot {
        employees: employees.records(),
        attendance: attendance.records(),
    })
}
