//! Record kinds handled by the service
//!
//! [`RecordKind`] is resolved once at the edge of the system (upload file
//! name, URL segment, storage key, CLI argument) and every downstream step
//! works on the variant instead of on strings.

use crate::error::HiredataError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three fixed record shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordKind {
    #[serde(rename = "hired_employees")]
    Employee,
    #[serde(rename = "departments")]
    Department,
    #[serde(rename = "jobs")]
    Job,
}

const EMPLOYEE_FIELDS: &[&str] = &["id", "name", "hired_at", "department_id", "job_id"];
const DEPARTMENT_FIELDS: &[&str] = &["id", "name"];
const JOB_FIELDS: &[&str] = &["id", "name"];

impl RecordKind {
    /// All kinds, in backup order
    pub const ALL: [RecordKind; 3] = [RecordKind::Employee, RecordKind::Department, RecordKind::Job];

    /// Name of the backing table
    pub fn table_name(self) -> &'static str {
        match self {
            RecordKind::Employee => "hired_employees",
            RecordKind::Department => "departments",
            RecordKind::Job => "jobs",
        }
    }

    /// Ordered field list: CSV column positions and error report header
    pub fn field_names(self) -> &'static [&'static str] {
        match self {
            RecordKind::Employee => EMPLOYEE_FIELDS,
            RecordKind::Department => DEPARTMENT_FIELDS,
            RecordKind::Job => JOB_FIELDS,
        }
    }

    /// Expected number of fields per CSV row
    pub fn arity(self) -> usize {
        self.field_names().len()
    }

    /// Resolve a kind from an uploaded file name.
    ///
    /// Matches the table name as a case-insensitive substring of the base
    /// name, so `HIRED_EMPLOYEES.csv` and `raw/2021_departments.csv` both
    /// resolve.
    pub fn from_file_name(file_name: &str) -> Result<Self, HiredataError> {
        let base = file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(file_name)
            .to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|kind| base.contains(kind.table_name()))
            .ok_or_else(|| HiredataError::unsupported(file_name))
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

impl FromStr for RecordKind {
    type Err = HiredataError;

    /// Accepts the table name or the singular kind name, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hired_employees" | "employee" | "employees" => Ok(RecordKind::Employee),
            "departments" | "department" => Ok(RecordKind::Department),
            "jobs" | "job" => Ok(RecordKind::Job),
            _ => Err(HiredataError::unsupported(s)),
        }
    }
}
