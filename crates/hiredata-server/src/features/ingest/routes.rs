use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::{DispatchError, FeatureState};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::commands::{IngestCsvCommand, IngestCsvResponse, IngestError, S3EventNotification};

/// What happened to one file of a multi-file upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadOutcome {
    Processed(IngestCsvResponse),
    Failed {
        file_name: String,
        code: String,
        message: String,
    },
}

impl UploadOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            UploadOutcome::Processed(_) => "processed",
            UploadOutcome::Failed { .. } => "failed",
        }
    }
}

/// Aggregate result of a multi-file upload; row counts cover processed files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadCsvBatchResponse {
    pub files: Vec<UploadOutcome>,
    pub inserted_rows: usize,
    pub error_rows: usize,
}

impl UploadCsvBatchResponse {
    pub fn from_outcomes(files: Vec<UploadOutcome>) -> Self {
        let processed = || {
            files.iter().filter_map(|outcome| match outcome {
                UploadOutcome::Processed(result) => Some(result),
                UploadOutcome::Failed { .. } => None,
            })
        };

        Self {
            inserted_rows: processed().map(|r| r.inserted_rows).sum(),
            error_rows: processed().map(|r| r.error_rows).sum(),
            files,
        }
    }
}

pub fn ingest_routes() -> Router<FeatureState> {
    Router::new()
        .route("/upload_csv", post(upload_csv))
        .route("/upload-csv", post(upload_csv_files))
        .route("/upload-csv/", post(upload_csv_files))
        .route("/events/s3", post(process_s3_event))
}

struct UploadedFile {
    file_name: String,
    content: Vec<u8>,
}

/// Collect file parts; with `only_field`, other fields are ignored
async fn read_files(
    multipart: &mut Multipart,
    only_field: Option<&str>,
) -> Result<Vec<UploadedFile>, IngestApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| IngestApiError::Multipart(format!("Failed to read multipart field: {}", e)))?
    {
        if let Some(expected) = only_field {
            if field.name() != Some(expected) {
                continue;
            }
        }

        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        let data = field
            .bytes()
            .await
            .map_err(|e| IngestApiError::Multipart(format!("Failed to read file bytes: {}", e)))?;

        files.push(UploadedFile {
            file_name,
            content: data.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(IngestApiError::Multipart("No file found in multipart data".to_string()));
    }

    Ok(files)
}

#[tracing::instrument(skip(state, multipart))]
async fn upload_csv(
    State(state): State<FeatureState>,
    mut multipart: Multipart,
) -> Result<Response, IngestApiError> {
    let file = read_files(&mut multipart, Some("file"))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| IngestApiError::Multipart("No file field found".to_string()))?;

    let response = ingest_file(&state, file).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

/// Each file is its own unit of work: every file is attempted and the
/// response reports each one as processed or failed.
#[tracing::instrument(skip(state, multipart))]
async fn upload_csv_files(
    State(state): State<FeatureState>,
    mut multipart: Multipart,
) -> Result<Response, IngestApiError> {
    let files = read_files(&mut multipart, None).await?;

    let mut outcomes = Vec::with_capacity(files.len());
    for file in files {
        let file_name = file.file_name.clone();
        let outcome = match ingest_file(&state, file).await {
            Ok(result) => UploadOutcome::Processed(result),
            Err(e) => {
                tracing::warn!(file_name = %file_name, error = %e, "File upload failed");
                UploadOutcome::Failed {
                    file_name,
                    code: e.code().to_string(),
                    message: e.public_message(),
                }
            },
        };
        outcomes.push(outcome);
    }

    let response = UploadCsvBatchResponse::from_outcomes(outcomes);
    let meta = status_counts(response.files.iter().map(UploadOutcome::status));

    Ok((StatusCode::OK, Json(ApiResponse::success_with_meta(response, meta))).into_response())
}

async fn ingest_file(
    state: &FeatureState,
    file: UploadedFile,
) -> Result<IngestCsvResponse, IngestApiError> {
    let command = IngestCsvCommand {
        file_name: file.file_name,
        content: file.content,
    };

    let response = state.send(command).await??;

    tracing::info!(
        file_name = %response.file_name,
        inserted_rows = response.inserted_rows,
        error_rows = response.error_rows,
        "CSV uploaded via API"
    );

    Ok(response)
}

/// `{"processed": n, "failed": n, ...}` over every status seen
fn status_counts<'a>(statuses: impl Iterator<Item = &'a str>) -> serde_json::Value {
    let mut counts = serde_json::Map::new();
    for status in statuses {
        let count = counts.get(status).and_then(|c| c.as_u64()).unwrap_or(0);
        counts.insert(status.to_string(), json!(count + 1));
    }
    serde_json::Value::Object(counts)
}

#[tracing::instrument(skip(state, event))]
async fn process_s3_event(
    State(state): State<FeatureState>,
    Json(event): Json<S3EventNotification>,
) -> Result<Response, IngestApiError> {
    let response = state.send(event).await?;

    let mut meta = json!({ "processed": 0, "skipped": 0, "failed": 0 });
    for outcome in &response.records {
        meta[outcome.status()] = json!(meta[outcome.status()].as_u64().unwrap_or(0) + 1);
    }

    Ok((StatusCode::OK, Json(ApiResponse::success_with_meta(response, meta))).into_response())
}

#[derive(Debug)]
enum IngestApiError {
    Multipart(String),
    Ingest(IngestError),
    Dispatch(DispatchError),
}

impl From<IngestError> for IngestApiError {
    fn from(err: IngestError) -> Self {
        Self::Ingest(err)
    }
}

impl From<DispatchError> for IngestApiError {
    fn from(err: DispatchError) -> Self {
        Self::Dispatch(err)
    }
}

impl IngestApiError {
    fn status(&self) -> StatusCode {
        match self {
            IngestApiError::Multipart(_)
            | IngestApiError::Ingest(IngestError::FileNameRequired)
            | IngestApiError::Ingest(IngestError::UnsupportedRecordKind(_))
            | IngestApiError::Ingest(IngestError::Decode(_))
            | IngestApiError::Ingest(IngestError::MalformedCsv(_))
            | IngestApiError::Ingest(IngestError::BatchTooLarge { .. }) => StatusCode::BAD_REQUEST,
            IngestApiError::Ingest(IngestError::DuplicateRecord { .. }) => StatusCode::CONFLICT,
            IngestApiError::Ingest(IngestError::Persistence(_)) | IngestApiError::Dispatch(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    fn code(&self) -> &'static str {
        match self {
            IngestApiError::Ingest(IngestError::DuplicateRecord { .. }) => "DUPLICATE_RECORD",
            IngestApiError::Ingest(IngestError::Persistence(_)) => "PERSISTENCE_ERROR",
            IngestApiError::Dispatch(_) => "INTERNAL_ERROR",
            _ => "VALIDATION_ERROR",
        }
    }

    /// Message safe to return to clients; server faults stay in the logs
    fn public_message(&self) -> String {
        match self {
            IngestApiError::Ingest(IngestError::Persistence(_)) => {
                "Failed to persist ingested rows".to_string()
            },
            IngestApiError::Dispatch(_) => "Request could not be dispatched".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for IngestApiError {
    fn into_response(self) -> Response {
        if self.status() == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Ingestion failed: {}", self);
        }

        let error = ErrorResponse::new(self.code(), self.public_message());
        (self.status(), Json(error)).into_response()
    }
}

impl std::fmt::Display for IngestApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Multipart(message) => write!(f, "{}", message),
            Self::Ingest(e) => write!(f, "{}", e),
            Self::Dispatch(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiredata_common::RecordKind;

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (IngestError::UnsupportedRecordKind("a.csv".to_string()), StatusCode::BAD_REQUEST),
            (IngestError::BatchTooLarge { rows: 1001, max: 1000 }, StatusCode::BAD_REQUEST),
            (IngestError::Decode("bad".to_string()), StatusCode::BAD_REQUEST),
            (
                IngestError::DuplicateRecord {
                    table: RecordKind::Job,
                    detail: "Key (id)=(1) already exists.".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (IngestError::Persistence(sqlx::Error::PoolTimedOut), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(IngestApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_error_codes_and_messages() {
        let duplicate = IngestApiError::from(IngestError::DuplicateRecord {
            table: RecordKind::Job,
            detail: "Key (id)=(1) already exists.".to_string(),
        });
        assert_eq!(duplicate.code(), "DUPLICATE_RECORD");
        assert!(duplicate.public_message().contains("Key (id)=(1)"));

        let persistence = IngestApiError::from(IngestError::Persistence(sqlx::Error::PoolClosed));
        assert_eq!(persistence.code(), "PERSISTENCE_ERROR");
        assert_eq!(persistence.public_message(), "Failed to persist ingested rows");
    }

    #[test]
    fn test_batch_totals_cover_processed_files() {
        let processed = |file_name: &str, inserted_rows, error_rows| {
            UploadOutcome::Processed(IngestCsvResponse {
                file_name: file_name.to_string(),
                table: RecordKind::Job,
                inserted_rows,
                error_rows,
                error_report: None,
            })
        };

        let response = UploadCsvBatchResponse::from_outcomes(vec![
            processed("jobs.csv", 3, 1),
            UploadOutcome::Failed {
                file_name: "x.csv".to_string(),
                code: "VALIDATION_ERROR".to_string(),
                message: "Unsupported file".to_string(),
            },
            processed("more_jobs.csv", 2, 0),
        ]);

        assert_eq!(response.inserted_rows, 5);
        assert_eq!(response.error_rows, 1);
        assert_eq!(
            status_counts(response.files.iter().map(UploadOutcome::status)),
            json!({ "processed": 2, "failed": 1 })
        );
    }

    #[test]
    fn test_outcome_serialization() {
        let failed = UploadOutcome::Failed {
            file_name: "x.csv".to_string(),
            code: "VALIDATION_ERROR".to_string(),
            message: "Unsupported file".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({
                "status": "failed",
                "file_name": "x.csv",
                "code": "VALIDATION_ERROR",
                "message": "Unsupported file"
            })
        );
    }

    #[test]
    fn test_multipart_error_display() {
        let err = IngestApiError::Multipart("No file found in multipart data".to_string());
        assert_eq!(err.to_string(), "No file found in multipart data");
    }
}
