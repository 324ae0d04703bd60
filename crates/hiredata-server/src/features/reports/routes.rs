use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::{DispatchError, FeatureState};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::queries::{DepartmentsAboveMeanQuery, HiresPerQuarterQuery, ReportError};

pub fn reports_routes() -> Router<FeatureState> {
    Router::new()
        .route("/employees_hired_per_quarter", get(employees_hired_per_quarter))
        .route("/departments_above_mean_hires", get(departments_above_mean_hires))
}

#[tracing::instrument(skip(state))]
async fn employees_hired_per_quarter(
    State(state): State<FeatureState>,
    Query(query): Query<HiresPerQuarterQuery>,
) -> Result<Response, ReportApiError> {
    let rows = state.send(query).await??;
    Ok((StatusCode::OK, Json(ApiResponse::success(rows))).into_response())
}

#[tracing::instrument(skip(state))]
async fn departments_above_mean_hires(
    State(state): State<FeatureState>,
    Query(query): Query<DepartmentsAboveMeanQuery>,
) -> Result<Response, ReportApiError> {
    let rows = state.send(query).await??;
    Ok((StatusCode::OK, Json(ApiResponse::success(rows))).into_response())
}

#[derive(Debug)]
enum ReportApiError {
    Report(ReportError),
    Dispatch(DispatchError),
}

impl From<ReportError> for ReportApiError {
    fn from(err: ReportError) -> Self {
        Self::Report(err)
    }
}

impl From<DispatchError> for ReportApiError {
    fn from(err: DispatchError) -> Self {
        Self::Dispatch(err)
    }
}

impl IntoResponse for ReportApiError {
    fn into_response(self) -> Response {
        match self {
            ReportApiError::Report(ReportError::InvalidYear(year)) => {
                let error = ErrorResponse::new(
                    "VALIDATION_ERROR",
                    ReportError::InvalidYear(year).to_string(),
                );
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            ReportApiError::Report(ReportError::Database(e)) => {
                tracing::error!("Database error in report: {}", e);
                let error = ErrorResponse::new("DATABASE_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            ReportApiError::Dispatch(e) => e.into_response(),
        }
    }
}
