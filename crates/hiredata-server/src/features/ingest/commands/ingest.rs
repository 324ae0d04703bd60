use crate::config::LimitsConfig;
use crate::db::records;
use crate::features::ingest::error_sink::{self, Rejection};
use crate::features::shared::{constraint_detail, is_unique_violation};
use crate::models::{parse_row, Department, Employee, Job, TableRecord};
use crate::storage::ObjectStore;
use mediator::Request;
use hiredata_common::RecordKind;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashSet;

/// Ingest one headerless CSV file; the table is chosen by file name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestCsvCommand {
    pub file_name: String,
    #[serde(skip)]
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestCsvResponse {
    pub file_name: String,
    pub table: RecordKind,
    pub inserted_rows: usize,
    pub error_rows: usize,
    /// Location of the rejected-rows report, when one was written
    pub error_report: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("File name is required and cannot be empty")]
    FileNameRequired,

    #[error(
        "Unsupported file '{0}'. The file name must contain one of: hired_employees, departments, jobs"
    )]
    UnsupportedRecordKind(String),

    #[error("File is not valid UTF-8: {0}")]
    Decode(String),

    #[error("Malformed CSV: {0}")]
    MalformedCsv(String),

    #[error("File has {rows} rows; at most {max} rows are accepted per upload")]
    BatchTooLarge { rows: usize, max: usize },

    #[error("Rows already exist in {table}: {detail}")]
    DuplicateRecord { table: RecordKind, detail: String },

    #[error("Failed to persist rows: {0}")]
    Persistence(#[source] sqlx::Error),
}

impl Request<Result<IngestCsvResponse, IngestError>> for IngestCsvCommand {}

impl IngestCsvCommand {
    pub fn validate(&self) -> Result<RecordKind, IngestError> {
        if self.file_name.trim().is_empty() {
            return Err(IngestError::FileNameRequired);
        }
        RecordKind::from_file_name(&self.file_name)
            .map_err(|_| IngestError::UnsupportedRecordKind(self.file_name.clone()))
    }
}

/// Rows of one file split into typed records and rejections
#[derive(Debug)]
pub struct Batch<T> {
    pub valid: Vec<T>,
    pub rejected: Vec<Rejection>,
}

/// Read headerless CSV text into raw rows; blank lines are skipped
pub fn read_rows(text: &str) -> Result<Vec<Vec<String>>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect())
                .map_err(|e| IngestError::MalformedCsv(e.to_string()))
        })
        .collect()
}

/// Classify every row: each one ends up either valid or with one reason
pub fn validate_rows<T: TableRecord>(rows: Vec<Vec<String>>) -> Batch<T> {
    let mut valid = Vec::new();
    let mut rejected = Vec::new();
    let mut seen = HashSet::new();

    for (index, fields) in rows.into_iter().enumerate() {
        let row = index + 1;
        let outcome = parse_row::<T>(row, &fields).and_then(|record| {
            if seen.insert(record.id()) {
                Ok(record)
            } else {
                Err(format!("Row {}: duplicate id {} in this file", row, record.id()))
            }
        });

        match outcome {
            Ok(record) => valid.push(record),
            Err(reason) => rejected.push(Rejection {
                row,
                fields,
                reason,
            }),
        }
    }

    Batch { valid, rejected }
}

#[tracing::instrument(
    skip(pool, error_store, limits, command),
    fields(file_name = %command.file_name, size = command.content.len())
)]
pub async fn handle(
    pool: PgPool,
    error_store: &dyn ObjectStore,
    limits: LimitsConfig,
    command: IngestCsvCommand,
) -> Result<IngestCsvResponse, IngestError> {
    let kind = command.validate()?;

    match kind {
        RecordKind::Employee => ingest::<Employee>(&pool, error_store, limits, command).await,
        RecordKind::Department => ingest::<Department>(&pool, error_store, limits, command).await,
        RecordKind::Job => ingest::<Job>(&pool, error_store, limits, command).await,
    }
}

async fn ingest<T: TableRecord>(
    pool: &PgPool,
    error_store: &dyn ObjectStore,
    limits: LimitsConfig,
    command: IngestCsvCommand,
) -> Result<IngestCsvResponse, IngestError> {
    let text =
        std::str::from_utf8(&command.content).map_err(|e| IngestError::Decode(e.to_string()))?;

    let rows = read_rows(text)?;
    if rows.len() > limits.max_upload_rows {
        return Err(IngestError::BatchTooLarge {
            rows: rows.len(),
            max: limits.max_upload_rows,
        });
    }

    let batch = validate_rows::<T>(rows);
    persist(pool, &batch.valid, limits.insert_batch_size).await?;

    tracing::info!(
        table = %T::KIND,
        inserted = batch.valid.len(),
        rejected = batch.rejected.len(),
        "CSV ingested"
    );

    let error_report = error_sink::report(error_store, T::KIND, &batch.rejected).await;

    Ok(IngestCsvResponse {
        file_name: command.file_name,
        table: T::KIND,
        inserted_rows: batch.valid.len(),
        error_rows: batch.rejected.len(),
        error_report,
    })
}

/// Insert all records in one transaction, or none of them
async fn persist<T: TableRecord>(
    pool: &PgPool,
    valid: &[T],
    batch_size: usize,
) -> Result<(), IngestError> {
    if valid.is_empty() {
        return Ok(());
    }

    let map_err = |e: sqlx::Error| {
        if is_unique_violation(&e) {
            IngestError::DuplicateRecord {
                table: T::KIND,
                detail: constraint_detail(&e),
            }
        } else {
            IngestError::Persistence(e)
        }
    };

    let mut tx = pool.begin().await.map_err(map_err)?;
    records::insert_records(&mut tx, valid, batch_size)
        .await
        .map_err(map_err)?;
    tx.commit().await.map_err(map_err)?;

    Ok(())
}
