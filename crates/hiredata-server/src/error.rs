//! Service-level error type

use crate::api::response::ErrorResponse;
use crate::db::DbError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hiredata_common::RecordKind;
use serde_json::json;
use thiserror::Error;

/// Errors raised outside the feature slices (service status, health)
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database unavailable: {0}")]
    Database(#[from] DbError),

    #[error("Missing tables: {}", table_list(.0))]
    MissingTables(Vec<RecordKind>),
}

fn table_list(kinds: &[RecordKind]) -> String {
    kinds
        .iter()
        .map(|kind| kind.table_name())
        .collect::<Vec<_>>()
        .join(", ")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database health check failed: {}", e);
                ErrorResponse::new("DATABASE_UNAVAILABLE", "Database is unreachable")
            },
            AppError::MissingTables(ref missing) => {
                tracing::warn!("Health check found missing tables: {}", self);
                ErrorResponse::with_details(
                    "MISSING_TABLES",
                    self.to_string(),
                    json!({ "missing": missing }),
                )
            },
        };

        (StatusCode::SERVICE_UNAVAILABLE, Json(error)).into_response()
    }
}
