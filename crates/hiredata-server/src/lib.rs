//! Hiredata Server Library
//!
//! HTTP service that migrates hiring data into PostgreSQL and keeps Parquet
//! backups of it in object storage.
//!
//! # Overview
//!
//! - **Ingestion**: headerless CSV files for `hired_employees`, `departments`
//!   and `jobs` are validated row by row. Valid rows are inserted in one
//!   transaction and rejected rows are reported as `errors_<table>.csv`.
//! - **Backup / restore**: each table round-trips through a Parquet artifact
//!   at `backups/<table>_backup.parquet`. A restore replaces the table inside
//!   one transaction.
//! - **Reports**: hires per quarter and departments hiring above the mean.
//!
//! # Architecture
//!
//! Features are vertical slices under [`features`]: each has its commands or
//! queries (plain structs with a `validate` method and an async `handle`
//! function) and a `routes.rs` mapping its error enum onto HTTP responses.
//! Routes dispatch through the mediator built in [`cqrs`].
//! Object storage is reached through the [`storage::ObjectStore`] trait, so
//! tests run against [`storage::MemoryStore`].
//!
//! # Example
//!
//! ```no_run
//! use hiredata_server::{api, config::Config, features::FeatureState};
//! use hiredata_server::storage::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn run(pool: sqlx::PgPool) -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let state = FeatureState::with_single_store(
//!     pool,
//!     Arc::new(MemoryStore::new()),
//!     "hiredata",
//!     config.limits,
//! );
//! let app = api::create_router(state, &config.cors);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod cqrs;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod models;
pub mod storage;

pub use error::AppError;
