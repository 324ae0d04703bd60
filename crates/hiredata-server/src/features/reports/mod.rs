//! Analytic reports over ingested hires

pub mod queries;
pub mod routes;

pub use queries::{
    DepartmentHires, DepartmentsAboveMeanQuery, HiresPerQuarterQuery, QuarterlyHires,
    ReportError, DEFAULT_REPORT_YEAR,
};
pub use routes::reports_routes;
