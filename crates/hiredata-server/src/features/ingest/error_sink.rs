//! Rejected-row reports
//!
//! Rejections are written as CSV (the kind's field names plus
//! `error_message`) to `errors_<table>.csv`. Writing the report never fails
//! the ingestion that produced it.

use crate::storage::{error_report_key, ObjectStore};
use hiredata_common::RecordKind;
use serde::Serialize;

/// A row that failed validation, kept as received
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub row: usize,
    pub fields: Vec<String>,
    pub reason: String,
}

/// Render rejections as CSV text.
///
/// Raw rows keep their original field count, so the writer runs in flexible
/// mode.
pub fn render(kind: RecordKind, rejections: &[Rejection]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record(kind.field_names().iter().copied().chain(["error_message"]))?;

    for rejection in rejections {
        writer.write_record(
            rejection
                .fields
                .iter()
                .map(String::as_str)
                .chain([rejection.reason.as_str()]),
        )?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Upload a report for `rejections`; returns its location.
///
/// Returns `None` without touching storage when there is nothing to report,
/// and logs a warning when the upload fails.
#[tracing::instrument(skip(store, rejections), fields(rejected = rejections.len()))]
pub async fn report(
    store: &dyn ObjectStore,
    kind: RecordKind,
    rejections: &[Rejection],
) -> Option<String> {
    if rejections.is_empty() {
        return None;
    }

    let data = match render(kind, rejections) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(table = %kind, error = %e, "Failed to render error report");
            return None;
        },
    };

    match store.put(&error_report_key(kind), data, "text/csv").await {
        Ok(location) => {
            tracing::info!(table = %kind, location = %location, "Error report uploaded");
            Some(location)
        },
        Err(e) => {
            tracing::warn!(table = %kind, error = %e, "Failed to upload error report");
            None
        },
    }
}
