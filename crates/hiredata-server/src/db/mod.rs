//! Database access
//!
//! Pool construction and health checks live here; generic record I/O shared
//! by ingestion and restore lives in [`records`].

use crate::config::DatabaseConfig;
use hiredata_common::RecordKind;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use thiserror::Error;

pub mod records;

/// Database operation errors with contextual information
#[derive(Error, Debug)]
pub enum DbError {
    /// SQL query or connection error
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Database configuration is invalid or missing
    #[error("Database configuration error: {0}. Check DATABASE_URL and connection settings.")]
    Config(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Create the connection pool
pub async fn create_pool(config: &DatabaseConfig) -> DbResult<PgPool> {
    if config.url.is_empty() {
        return Err(DbError::Config("DATABASE_URL is empty".to_string()));
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database connection pool created"
    );

    Ok(pool)
}

pub async fn health_check(pool: &PgPool) -> DbResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(DbError::from)
}

/// Record tables that do not exist in the connected database
pub async fn missing_tables(pool: &PgPool) -> DbResult<Vec<RecordKind>> {
    let mut missing = Vec::new();

    for kind in RecordKind::ALL {
        let exists: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
            .bind(kind.table_name())
            .fetch_one(pool)
            .await?;

        if !exists {
            missing.push(kind);
        }
    }

    Ok(missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_url_is_config_error() {
        let config = DatabaseConfig {
            url: String::new(),
            max_connections: 1,
            min_connections: 0,
            connect_timeout_secs: 1,
            idle_timeout_secs: 1,
        };

        let err = create_pool(&config).await.unwrap_err();
        assert!(matches!(err, DbError::Config(_)));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_health_and_tables(pool: PgPool) -> sqlx::Result<()> {
        assert!(health_check(&pool).await.is_ok());
        assert!(missing_tables(&pool).await.unwrap().is_empty());

        sqlx::query("DROP TABLE jobs").execute(&pool).await?;
        assert_eq!(missing_tables(&pool).await.unwrap(), vec![RecordKind::Job]);
        Ok(())
    }
}
