//! Database models
//!
//! One typed record per [`RecordKind`]. [`TableRecord`] is the per-kind half
//! of the schema registry: it turns a CSV row into a typed record (or a
//! rejection reason) and binds a record into a multi-row `INSERT`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use hiredata_common::RecordKind;
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, query_builder::Separated, FromRow, Postgres};

/// A typed row of one of the three record tables
pub trait TableRecord:
    for<'r> FromRow<'r, PgRow> + Clone + Send + Sync + Unpin + 'static
{
    const KIND: RecordKind;

    fn id(&self) -> i32;

    /// Parse trimmed, non-empty fields in column order.
    ///
    /// `row` is the 1-based row number used in the rejection reason.
    fn from_fields(row: usize, fields: &[&str]) -> Result<Self, String>;

    /// Bind this record's columns, in column order, into one `VALUES` tuple
    fn push_binds<'args>(&self, tuple: &mut Separated<'_, 'args, Postgres, &'static str>);
}

/// Hired employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Employee {
    pub id: i32,
    pub name: String,
    pub hired_at: DateTime<Utc>,
    pub department_id: i32,
    pub job_id: i32,
}

/// Department
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Department {
    pub id: i32,
    pub name: String,
}

/// Job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: i32,
    pub name: String,
}

impl TableRecord for Employee {
    const KIND: RecordKind = RecordKind::Employee;

    fn id(&self) -> i32 {
        self.id
    }

    fn from_fields(row: usize, fields: &[&str]) -> Result<Self, String> {
        Ok(Self {
            id: parse_int(row, "id", fields[0])?,
            name: fields[1].to_string(),
            hired_at: parse_timestamp(fields[2]).map_err(|e| {
                format!(
                    "Row {}: invalid datetime for field 'hired_at': '{}' ({})",
                    row, fields[2], e
                )
            })?,
            department_id: parse_int(row, "department_id", fields[3])?,
            job_id: parse_int(row, "job_id", fields[4])?,
        })
    }

    fn push_binds<'args>(&self, tuple: &mut Separated<'_, 'args, Postgres, &'static str>) {
        tuple
            .push_bind(self.id)
            .push_bind(self.name.clone())
            .push_bind(self.hired_at)
            .push_bind(self.department_id)
            .push_bind(self.job_id);
    }
}

impl TableRecord for Department {
    const KIND: RecordKind = RecordKind::Department;

    fn id(&self) -> i32 {
        self.id
    }

    fn from_fields(row: usize, fields: &[&str]) -> Result<Self, String> {
        Ok(Self {
            id: parse_int(row, "id", fields[0])?,
            name: fields[1].to_string(),
        })
    }

    fn push_binds<'args>(&self, tuple: &mut Separated<'_, 'args, Postgres, &'static str>) {
        tuple.push_bind(self.id).push_bind(self.name.clone());
    }
}

impl TableRecord for Job {
    const KIND: RecordKind = RecordKind::Job;

    fn id(&self) -> i32 {
        self.id
    }

    fn from_fields(row: usize, fields: &[&str]) -> Result<Self, String> {
        Ok(Self {
            id: parse_int(row, "id", fields[0])?,
            name: fields[1].to_string(),
        })
    }

    fn push_binds<'args>(&self, tuple: &mut Separated<'_, 'args, Postgres, &'static str>) {
        tuple.push_bind(self.id).push_bind(self.name.clone());
    }
}

/// Validate one raw CSV row against `T`'s shape.
///
/// Checks arity first, then emptiness after trimming, then the typed parse.
pub fn parse_row<T: TableRecord>(row: usize, raw: &[String]) -> Result<T, String> {
    let expected = T::KIND.arity();
    if raw.len() != expected {
        return Err(format!("Row {}: expected {} fields, got {}", row, expected, raw.len()));
    }

    let fields: Vec<&str> = raw.iter().map(|field| field.trim()).collect();
    if fields.iter().any(|field| field.is_empty()) {
        return Err(format!("Row {}: one or more fields are empty", row));
    }

    T::from_fields(row, &fields)
}

fn parse_int(row: usize, field: &str, value: &str) -> Result<i32, String> {
    value
        .parse::<i32>()
        .map_err(|e| format!("Row {}: invalid integer for field '{}': {}", row, field, e))
}

/// ISO-8601 date-times carrying an offset, with or without seconds
const OFFSET_FORMATS: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M%z",
];

/// ISO-8601 date-times without an offset
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp.
///
/// A trailing `Z` becomes `+00:00`. Offsets may be written `+HH:MM` or
/// `+HHMM`, seconds are optional, and a bare date is midnight. Values without
/// an offset are taken as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    let normalized = match value.strip_suffix(['Z', 'z']) {
        Some(prefix) => format!("{}+00:00", prefix),
        None => value.to_string(),
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Some(parsed) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(&normalized, format).ok())
    {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&normalized, format).ok())
    {
        return Ok(naive.and_utc());
    }

    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .map_err(|e| e.to_string())?
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| "date has no midnight".to_string())
}
