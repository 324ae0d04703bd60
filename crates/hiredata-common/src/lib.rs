//! Hiredata Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, error handling and logging for the Hiredata workspace.
//!
//! # Overview
//!
//! - **Types**: [`RecordKind`], the closed set of record shapes the service
//!   ingests, backs up and restores, with their table names and field lists
//! - **Error Handling**: [`HiredataError`] and the [`Result`] alias
//! - **Logging**: tracing bootstrap shared by the server and the CLI
//!
//! # Example
//!
//! ```
//! use hiredata_common::RecordKind;
//!
//! let kind = RecordKind::from_file_name("uploads/Hired_Employees.csv").unwrap();
//! assert_eq!(kind, RecordKind::Employee);
//! assert_eq!(kind.arity(), 5);
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{HiredataError, Result};
pub use types::RecordKind;
