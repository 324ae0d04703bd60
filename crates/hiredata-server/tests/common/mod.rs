//! Shared helpers for the HTTP integration tests
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use hiredata_server::{
    api,
    config::{CorsConfig, LimitsConfig},
    features::FeatureState,
    storage::MemoryStore,
};
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceExt;

pub const RAW_BUCKET: &str = "raw";

const BOUNDARY: &str = "hiredata-test-boundary";

/// Router wired to `pool` with one in-memory store for every role
pub fn test_app(pool: PgPool) -> (Router, Arc<MemoryStore>) {
    test_app_with_limits(pool, LimitsConfig::default())
}

pub fn test_app_with_limits(pool: PgPool, limits: LimitsConfig) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    // The mediator builder uses `block_in_place`, which needs a multi-thread
    // runtime; `#[sqlx::test]` runs on a current-thread one.
    let state = {
        let store = store.clone();
        std::thread::spawn(move || {
            tokio::runtime::Builder::new_multi_thread()
                .build()
                .unwrap()
                .block_on(async move {
                    FeatureState::with_single_store(pool, store, RAW_BUCKET, limits)
                })
        })
        .join()
        .unwrap()
    };
    let cors = CorsConfig {
        allowed_origins: vec!["*".to_string()],
        allow_credentials: false,
    };
    (api::create_router(state, &cors), store)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_empty(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .method("POST")
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST a multipart body with one part per `(field, file_name, content)`
pub async fn post_files(
    app: &Router,
    uri: &str,
    parts: &[(&str, &str, &[u8])],
) -> (StatusCode, Value) {
    let mut body = Vec::new();
    for (field, file_name, content) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: text/csv\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let request = Request::builder()
        .uri(uri)
        .method("POST")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn count_rows(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}
