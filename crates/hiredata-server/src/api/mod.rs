//! HTTP surface: service routes plus every feature router, with the
//! middleware stack applied once at the top.

pub mod response;

use crate::config::CorsConfig;
use crate::db;
use crate::error::AppError;
use crate::features::{self, FeatureState};
use crate::middleware;
use axum::{
    extract::{DefaultBodyLimit, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use hiredata_common::RecordKind;
use serde_json::json;
use sqlx::PgPool;
use tower_http::compression::CompressionLayer;

/// Build the application router
pub fn create_router(state: FeatureState, cors: &CorsConfig) -> Router {
    let body_limit = state.limits.max_upload_bytes;

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .with_state(state.db.clone())
        .merge(features::router(state))
        // Apply layers from innermost to outermost
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(cors))
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Hiredata Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// Database reachable and every record table present
async fn health_check(State(db): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    db::health_check(&db).await?;

    let missing = db::missing_tables(&db).await?;
    if !missing.is_empty() {
        return Err(AppError::MissingTables(missing));
    }

    let tables: Vec<&str> = RecordKind::ALL.iter().map(|kind| kind.table_name()).collect();

    Ok(Json(json!({
        "status": "healthy",
        "database": "connected",
        "tables": tables
    })))
}
