//! Runtime configuration.
//!
//! Settings come from environment variables:
//!
//! * `PAYROLL_DATA_DIR` - directory holding `employee.txt` and
//!   `attendance.txt` (default `data`)
//! * `PAYROLL_BIND_ADDR` - HTTP listen address (default `127.0.0.1:3000`)
//! * `PAYROLL_POLICY_FILE` - optional TOML file overriding the shift
//!   policy and pay rules
//! * `PAYROLL_VERBOSE` - `1` or `true` enables debug logging
//!
//! A policy file may set any subset of the values; the rest keep their
//! defaults:
//!
//! ```toml
//! [shift]
//! grace_cutoff = "8:15"
//! shift_end = "17:00"
//!
//! [pay]
//! overtime_multiplier = 1.5
//! proration_divisor = 4.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::attendance::ShiftPolicy;
use crate::error::{PayrollError, Result};
use crate::salary::PayRules;

pub const DATA_DIR_VAR: &str = "PAYROLL_DATA_DIR";
pub const BIND_ADDR_VAR: &str = "PAYROLL_BIND_ADDR";
pub const POLICY_FILE_VAR: &str = "PAYROLL_POLICY_FILE";
pub const VERBOSE_VAR: &str = "PAYROLL_VERBOSE";

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyFile {
    pub shift: ShiftPolicy,
    pub pay: PayRules,
}

impl PolicyFile {
    pub fn validate(&self) -> Result<()> {
        self.shift.validate()?;
        let pay = &self.pay;
        let positive = [
            ("proration_divisor", pay.proration_divisor),
            ("workday_minutes", pay.workday_minutes),
            ("overtime_multiplier", pay.overtime_multiplier),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, v)| v.is_nan() || *v <= 0.0) {
            return Err(PayrollError::Config {
                message: format!("{name} must be positive, got {value}"),
            });
        }
        if pay.late_penalty_rate < 0.0 || pay.late_penalty_cap < 0.0 {
            return Err(PayrollError::Config {
                message: "late penalty rate and cap must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

/// Parses and validates policy TOML.
pub fn parse_policy(text: &str) -> Result<PolicyFile> {
    let policy: PolicyFile = toml::from_str(text).map_err(|err| PayrollError::Config {
        message: format!("invalid policy file: {err}"),
    })?;
    policy.validate()?;
    Ok(policy)
}

pub fn load_policy_file(path: &Path) -> Result<PolicyFile> {
    let text = std::fs::read_to_string(path).map_err(|err| PayrollError::Config {
        message: format!("cannot read policy file {}: {err}", path.display()),
    })?;
    parse_policy(&text)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub bind_addr: String,
    pub policy: PolicyFile,
    pub verbose: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir = lookup(DATA_DIR_VAR).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let bind_addr = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let policy = match lookup(POLICY_FILE_VAR).filter(|p| !p.trim().is_empty()) {
            Some(path) => load_policy_file(Path::new(&path))?,
            None => PolicyFile::default(),
        };
        let verbose = lookup(VERBOSE_VAR)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            bind_addr,
            policy,
            verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_without_environment() {
        let settings = Settings::from_lookup(|_| None).unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("data"));
        assert_eq!(settings.bind_addr, "127.0.0.1:3000");
        assert_eq!(settings.policy, PolicyFile::default());
        assert!(!settings.verbose);
    }

    #[test]
    fn partial_policy_keeps_other_defaults() {
        let policy = parse_policy(
            r#"
            [shift]
            grace_cutoff = "8:10"

            [pay]
            late_penalty_cap = 0.25
            "#,
        )
        .unwrap();
        assert_eq!(policy.shift.grace_cutoff.minute(), 10);
        assert_eq!(policy.shift.shift_end, ShiftPolicy::default().shift_end);
        assert_eq!(policy.pay.late_penalty_cap, 0.25);
        assert_eq!(policy.pay.proration_divisor, 4.0);
    }

    #[test]
    fn invalid_policy_is_a_config_error() {
        for text in [
            "[shift]\ngrace_cutoff = \"noon\"",
            "[pay]\nproration_divisor = 0.0",
            "[shift]\nshift_end = \"8:00\"",
        ] {
            assert!(matches!(parse_policy(text), Err(PayrollError::Config { .. })), "{text}");
        }
    }

    #[test]
    fn policy_file_is_read_from_environment_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.toml");
        std::fs::write(&path, "[pay]\novertime_multiplier = 2.0\n").unwrap();

        let vars: HashMap<&str, String> = HashMap::from([
            (POLICY_FILE_VAR, path.display().to_string()),
            (DATA_DIR_VAR, "/srv/payroll".to_string()),
            (VERBOSE_VAR, "TRUE".to_string()),
        ]);
        let settings = Settings::from_lookup(|key| vars.get(key).cloned()).unwrap();
        assert_eq!(settings.policy.pay.overtime_multiplier, 2.0);
        assert_eq!(settings.data_dir, PathBuf::from("/srv/payroll"));
        assert!(settings.verbose);
    }

    #[test]
    fn missing_policy_file_is_reported() {
        let err = Settings::from_lookup(|key| (key == POLICY_FILE_VAR).then(|| "/nonexistent/policy.toml".to_string()))
            .unwrap_err();
        assert!(matches!(err, PayrollError::Config { .. }));
    }
}
