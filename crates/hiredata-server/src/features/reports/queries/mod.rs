pub mod departments_above_mean;
pub mod hires_per_quarter;

pub use departments_above_mean::{DepartmentHires, DepartmentsAboveMeanQuery};
pub use hires_per_quarter::{HiresPerQuarterQuery, QuarterlyHires};

/// Year used when a report request does not name one
pub const DEFAULT_REPORT_YEAR: i32 = 2021;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Year must be between 1900 and 9999, got {0}")]
    InvalidYear(i32),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub(crate) fn validate_year(year: i32) -> Result<i32, ReportError> {
    if (1900..=9999).contains(&year) {
        Ok(year)
    } else {
        Err(ReportError::InvalidYear(year))
    }
}
