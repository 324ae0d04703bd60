pub mod ingest;
pub mod process_event;

pub use ingest::{IngestCsvCommand, IngestCsvResponse, IngestError};
pub use process_event::{EventOutcome, ProcessEventResponse, RawSource, S3EventNotification};
