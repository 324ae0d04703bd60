//! Feature modules implementing the Hiredata API
//!
//! Each feature is a vertical slice with its own commands or queries and
//! routes:
//!
//! - **ingest**: CSV uploads, S3 event notifications, rejected-row reports
//! - **backup**: table backups to Parquet artifacts and restores from them
//! - **reports**: read-only analytic queries over ingested hires
//!
//! Handlers stay thin: they build a command or query, send it through the
//! mediator held by [`FeatureState`] and map the feature's error enum onto the
//! shared error envelope.

pub mod backup;
pub mod ingest;
pub mod reports;
pub mod shared;

use crate::api::response::ErrorResponse;
use crate::config::LimitsConfig;
use crate::cqrs::{self, AppMediator, AsyncMediator, FeatureStores};
use crate::storage::ObjectStore;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use mediator::Request;
use std::sync::Arc;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// PostgreSQL connection pool
    pub db: sqlx::PgPool,
    pub limits: LimitsConfig,
    /// Dispatches every feature command and query
    pub mediator: AppMediator,
}

impl FeatureState {
    pub fn new(db: sqlx::PgPool, stores: FeatureStores, limits: LimitsConfig) -> Self {
        let mediator = cqrs::build_mediator(db.clone(), stores, limits);
        Self {
            db,
            limits,
            mediator,
        }
    }

    /// State with one store serving every role
    pub fn with_single_store(
        db: sqlx::PgPool,
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        limits: LimitsConfig,
    ) -> Self {
        Self::new(db, FeatureStores::single(store, bucket), limits)
    }

    /// Run `request` through its registered handler
    pub async fn send<Req, Res>(&self, request: Req) -> Result<Res, DispatchError>
    where
        Req: Request<Res> + Send + 'static,
        Res: Send + 'static,
    {
        let mut mediator = self.mediator.clone();
        mediator
            .send(request)
            .await
            .map_err(|e| DispatchError(e.to_string()))
    }
}

/// No handler could take a request
#[derive(Debug, thiserror::Error)]
#[error("Request dispatch failed: {0}")]
pub struct DispatchError(pub String);

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self);
        let error = ErrorResponse::new("INTERNAL_ERROR", "Request could not be dispatched");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
    }
}

/// Creates the router with all feature routes mounted at the root
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .merge(ingest::ingest_routes())
        .merge(backup::backup_routes())
        .merge(reports::reports_routes())
        .with_state(state)
}
