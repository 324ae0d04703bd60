use crate::db::records;
use crate::features::backup::artifact::{self, ArtifactError, ColumnarRecord};
use crate::models::{Department, Employee, Job};
use crate::storage::{backup_key, ObjectStore, StorageError};
use hiredata_common::RecordKind;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::BTreeMap;

/// Snapshot every record table into the backup bucket
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupTablesCommand;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupTablesResponse {
    pub message: String,
    /// Artifact location per table
    pub files: BTreeMap<RecordKind, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("Failed to read table {table}: {source}")]
    Database {
        table: RecordKind,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("Failed to upload backup artifact: {0}")]
    Storage(#[from] StorageError),

    #[error("Backup failed for {}", failed_tables(.failed))]
    Incomplete {
        completed: BTreeMap<RecordKind, String>,
        failed: BTreeMap<RecordKind, String>,
    },
}

impl Request<Result<BackupTablesResponse, BackupError>> for BackupTablesCommand {}

fn failed_tables(failed: &BTreeMap<RecordKind, String>) -> String {
    failed.keys().map(|kind| kind.table_name()).collect::<Vec<_>>().join(", ")
}

/// Back up all three tables.
///
/// Tables are independent: one failing does not stop the others, and
/// artifacts already written stay in place. Any failure turns the whole call
/// into [`BackupError::Incomplete`], listing what succeeded and what did not.
#[tracing::instrument(skip(pool, store, _command))]
pub async fn handle(
    pool: PgPool,
    store: &dyn ObjectStore,
    _command: BackupTablesCommand,
) -> Result<BackupTablesResponse, BackupError> {
    let mut completed = BTreeMap::new();
    let mut failed = BTreeMap::new();

    for kind in RecordKind::ALL {
        let result = match kind {
            RecordKind::Employee => backup_table::<Employee>(&pool, store).await,
            RecordKind::Department => backup_table::<Department>(&pool, store).await,
            RecordKind::Job => backup_table::<Job>(&pool, store).await,
        };

        match result {
            Ok(location) => {
                completed.insert(kind, location);
            },
            Err(e) => {
                tracing::error!(table = %kind, error = %e, "Table backup failed");
                failed.insert(kind, e.to_string());
            },
        }
    }

    if !failed.is_empty() {
        return Err(BackupError::Incomplete { completed, failed });
    }

    tracing::info!(tables = completed.len(), "Backup completed");

    Ok(BackupTablesResponse {
        message: "Backup completed successfully".to_string(),
        files: completed,
    })
}

/// Read, encode and upload one table; returns the artifact location
pub async fn backup_table<T: ColumnarRecord>(
    pool: &PgPool,
    store: &dyn ObjectStore,
) -> Result<String, BackupError> {
    let records = records::fetch_all::<T>(pool)
        .await
        .map_err(|source| BackupError::Database {
            table: T::KIND,
            source,
        })?;

    let data = artifact::encode(&records)?;
    let key = backup_key(T::KIND);
    let location = store.put(&key, data, "application/vnd.apache.parquet").await?;

    tracing::info!(table = %T::KIND, rows = records.len(), location = %location, "Table backed up");

    Ok(location)
}
