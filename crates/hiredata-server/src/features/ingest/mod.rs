//! CSV ingestion
//!
//! Uploaded (or event-announced) CSV files are validated row by row. Valid
//! rows are inserted in one transaction; rejected rows go to the error sink.

pub mod commands;
pub mod error_sink;
pub mod routes;

pub use commands::{
    EventOutcome, IngestCsvCommand, IngestCsvResponse, IngestError, ProcessEventResponse,
    S3EventNotification,
};
pub use error_sink::Rejection;
pub use routes::{ingest_routes, UploadCsvBatchResponse, UploadOutcome};
