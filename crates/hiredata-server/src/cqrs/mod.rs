//! Command and query dispatch
//!
//! Every feature command and query implements [`mediator::Request`]. The
//! handlers registered here close over the pool and the stores each one
//! needs, so routes only hand a request to the mediator.

pub use mediator::{AsyncMediator, DefaultAsyncMediator};

use crate::config::LimitsConfig;
use crate::features::ingest::commands::RawSource;
use crate::storage::ObjectStore;
use sqlx::PgPool;
use std::sync::Arc;

pub type AppMediator = DefaultAsyncMediator;

/// Object stores by role
#[derive(Clone)]
pub struct FeatureStores {
    /// Destination of rejected-row reports
    pub error: Arc<dyn ObjectStore>,
    /// Destination and source of backup artifacts
    pub backup: Arc<dyn ObjectStore>,
    /// Source of event-announced CSV objects
    pub raw: Arc<dyn ObjectStore>,
    /// Bucket name that event notifications must refer to
    pub raw_bucket: String,
}

impl FeatureStores {
    /// One store serving every role
    pub fn single(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            error: store.clone(),
            backup: store.clone(),
            raw: store,
            raw_bucket: bucket.into(),
        }
    }
}

pub fn build_mediator(pool: PgPool, stores: FeatureStores, limits: LimitsConfig) -> AppMediator {
    DefaultAsyncMediator::builder()
        // Ingest
        .add_handler({
            let pool = pool.clone();
            let error_store = stores.error.clone();
            move |cmd| {
                let pool = pool.clone();
                let error_store = error_store.clone();
                async move {
                    crate::features::ingest::commands::ingest::handle(
                        pool,
                        error_store.as_ref(),
                        limits,
                        cmd,
                    )
                    .await
                }
            }
        })
        .add_handler({
            let pool = pool.clone();
            let stores = stores.clone();
            move |event| {
                let pool = pool.clone();
                let stores = stores.clone();
                async move {
                    let raw = RawSource {
                        store: stores.raw.as_ref(),
                        bucket: &stores.raw_bucket,
                    };
                    crate::features::ingest::commands::process_event::handle(
                        pool,
                        stores.error.as_ref(),
                        raw,
                        limits,
                        event,
                    )
                    .await
                }
            }
        })
        // Backup
        .add_handler({
            let pool = pool.clone();
            let backup_store = stores.backup.clone();
            move |cmd| {
                let pool = pool.clone();
                let backup_store = backup_store.clone();
                async move {
                    crate::features::backup::commands::backup::handle(
                        pool,
                        backup_store.as_ref(),
                        cmd,
                    )
                    .await
                }
            }
        })
        .add_handler({
            let pool = pool.clone();
            let backup_store = stores.backup.clone();
            move |cmd| {
                let pool = pool.clone();
                let backup_store = backup_store.clone();
                async move {
                    crate::features::backup::commands::restore::handle(
                        pool,
                        backup_store.as_ref(),
                        limits.insert_batch_size,
                        cmd,
                    )
                    .await
                }
            }
        })
        // Reports
        .add_handler({
            let pool = pool.clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::reports::queries::hires_per_quarter::handle(pool, query).await }
            }
        })
        .add_handler({
            let pool = pool.clone();
            move |query| {
                let pool = pool.clone();
                async move {
                    crate::features::reports::queries::departments_above_mean::handle(pool, query)
                        .await
                }
            }
        })
        .build()
}
