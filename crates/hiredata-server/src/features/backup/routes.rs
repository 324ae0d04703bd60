use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::{DispatchError, FeatureState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::{
    artifact::ArtifactError,
    commands::{BackupError, BackupTablesCommand, RestoreError, RestoreTableCommand},
};

pub fn backup_routes() -> Router<FeatureState> {
    Router::new()
        .route("/backup", get(backup_tables))
        .route("/restore/:table_name", post(restore_table))
}

#[tracing::instrument(skip(state))]
async fn backup_tables(State(state): State<FeatureState>) -> Result<Response, BackupApiError> {
    let response = state.send(BackupTablesCommand).await??;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(state))]
async fn restore_table(
    State(state): State<FeatureState>,
    Path(table_name): Path<String>,
) -> Result<Response, BackupApiError> {
    let command = RestoreTableCommand { table_name };

    let response = state.send(command).await??;

    tracing::info!(
        table = %response.table,
        restored_rows = response.restored_rows,
        "Table restored via API"
    );

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[derive(Debug)]
enum BackupApiError {
    Backup(BackupError),
    Restore(RestoreError),
    Dispatch(DispatchError),
}

impl From<DispatchError> for BackupApiError {
    fn from(err: DispatchError) -> Self {
        Self::Dispatch(err)
    }
}

impl From<BackupError> for BackupApiError {
    fn from(err: BackupError) -> Self {
        Self::Backup(err)
    }
}

impl From<RestoreError> for BackupApiError {
    fn from(err: RestoreError) -> Self {
        Self::Restore(err)
    }
}

impl IntoResponse for BackupApiError {
    fn into_response(self) -> Response {
        match self {
            BackupApiError::Backup(BackupError::Incomplete {
                ref completed,
                ref failed,
            }) => {
                tracing::error!("Backup incomplete: {}", self);
                let error = ErrorResponse::with_details(
                    "BACKUP_FAILED",
                    self.to_string(),
                    json!({ "completed": completed, "failed": failed }),
                );
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            BackupApiError::Backup(_) => {
                tracing::error!("Backup error: {}", self);
                let error = ErrorResponse::new("BACKUP_FAILED", "Backup failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },

            BackupApiError::Restore(RestoreError::UnsupportedRecordKind(_)) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            BackupApiError::Restore(RestoreError::NotFound(_)) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            BackupApiError::Restore(RestoreError::Artifact(ArtifactError::Empty)) => {
                let error = ErrorResponse::new("EMPTY_ARTIFACT", self.to_string());
                (StatusCode::UNPROCESSABLE_ENTITY, Json(error)).into_response()
            },
            BackupApiError::Restore(RestoreError::Artifact(_)) => {
                tracing::error!("Unreadable backup artifact: {}", self);
                let error = ErrorResponse::new("CORRUPT_ARTIFACT", "Backup artifact is corrupt");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            BackupApiError::Restore(RestoreError::Storage(_)) => {
                tracing::error!("Storage error during restore: {}", self);
                let error = ErrorResponse::new("STORAGE_ERROR", "A storage error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            BackupApiError::Restore(RestoreError::RestoreFailed(_)) => {
                tracing::error!("Restore rolled back: {}", self);
                let error =
                    ErrorResponse::new("RESTORE_FAILED", "Restore failed and was rolled back");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            BackupApiError::Dispatch(e) => e.into_response(),
        }
    }
}

impl std::fmt::Display for BackupApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backup(e) => write!(f, "{}", e),
            Self::Restore(e) => write!(f, "{}", e),
            Self::Dispatch(e) => write!(f, "{}", e),
        }
    }
}
