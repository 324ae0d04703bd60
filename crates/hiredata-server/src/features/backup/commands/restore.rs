use crate::db::records;
use crate::features::backup::artifact::{self, ArtifactError, ColumnarRecord};
use crate::models::{Department, Employee, Job};
use crate::storage::{backup_key, ObjectStore, StorageError};
use hiredata_common::RecordKind;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Replace one table's contents with its backup artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreTableCommand {
    pub table_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreTableResponse {
    pub message: String,
    pub table: RecordKind,
    pub restored_rows: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    #[error("Unsupported table '{0}'. Expected one of: hired_employees, departments, jobs")]
    UnsupportedRecordKind(String),

    #[error("No backup found for table {0}")]
    NotFound(RecordKind),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("Failed to fetch backup artifact: {0}")]
    Storage(String),

    #[error("Restore failed and was rolled back: {0}")]
    RestoreFailed(#[from] sqlx::Error),
}

impl Request<Result<RestoreTableResponse, RestoreError>> for RestoreTableCommand {}

impl RestoreTableCommand {
    pub fn validate(&self) -> Result<RecordKind, RestoreError> {
        self.table_name
            .parse()
            .map_err(|_| RestoreError::UnsupportedRecordKind(self.table_name.clone()))
    }
}

/// Restore one table from `backups/<table>_backup.parquet`.
///
/// The delete and every insert batch share one transaction: the table ends
/// up either fully restored or exactly as it was.
#[tracing::instrument(skip(pool, store, command), fields(table = %command.table_name))]
pub async fn handle(
    pool: PgPool,
    store: &dyn ObjectStore,
    batch_size: usize,
    command: RestoreTableCommand,
) -> Result<RestoreTableResponse, RestoreError> {
    let kind = command.validate()?;

    let restored_rows = match kind {
        RecordKind::Employee => restore_table::<Employee>(&pool, store, batch_size).await?,
        RecordKind::Department => restore_table::<Department>(&pool, store, batch_size).await?,
        RecordKind::Job => restore_table::<Job>(&pool, store, batch_size).await?,
    };

    Ok(RestoreTableResponse {
        message: format!("Table {} restored successfully with {} rows", kind, restored_rows),
        table: kind,
        restored_rows,
    })
}

async fn restore_table<T: ColumnarRecord>(
    pool: &PgPool,
    store: &dyn ObjectStore,
    batch_size: usize,
) -> Result<u64, RestoreError> {
    let data = store
        .get(&backup_key(T::KIND))
        .await
        .map_err(|e| match e {
            StorageError::NotFound(_) => RestoreError::NotFound(T::KIND),
            StorageError::Backend(message) => RestoreError::Storage(message),
        })?;

    let restored = artifact::decode::<T>(data)?;

    let mut tx = pool.begin().await?;
    let deleted = records::delete_all::<T>(&mut tx).await?;
    let inserted = records::insert_records(&mut tx, &restored, batch_size).await?;
    tx.commit().await?;

    tracing::info!(table = %T::KIND, deleted, inserted, "Table restored");

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn command(table_name: &str) -> RestoreTableCommand {
        RestoreTableCommand {
            table_name: table_name.to_string(),
        }
    }

    async fn seed_backup(store: &MemoryStore, jobs: &[Job]) {
        let data = artifact::encode(jobs).unwrap();
        store
            .put(&backup_key(RecordKind::Job), data, "application/vnd.apache.parquet")
            .await
            .unwrap();
    }

    fn jobs(ids: impl IntoIterator<Item = i32>) -> Vec<Job> {
        ids.into_iter()
            .map(|id| Job {
                id,
                name: format!("Job {}", id),
            })
            .collect()
    }

    async fn stored_jobs(pool: &PgPool) -> Vec<Job> {
        records::fetch_all::<Job>(pool).await.unwrap()
    }

    #[test]
    fn test_validate_table_name() {
        assert_eq!(command("jobs").validate().unwrap(), RecordKind::Job);
        assert_eq!(command("HIRED_EMPLOYEES").validate().unwrap(), RecordKind::Employee);
        assert!(matches!(
            command("salaries").validate(),
            Err(RestoreError::UnsupportedRecordKind(name)) if name == "salaries"
        ));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_restore_replaces_table(pool: PgPool) -> sqlx::Result<()> {
        sqlx::query("INSERT INTO jobs (id, name) VALUES (100, 'Stale')")
            .execute(&pool)
            .await?;

        let store = MemoryStore::new();
        seed_backup(&store, &jobs(1..=3)).await;

        let response = handle(pool.clone(), &store, 1000, command("jobs")).await.unwrap();
        assert_eq!(response.restored_rows, 3);
        assert_eq!(response.message, "Table jobs restored successfully with 3 rows");
        assert_eq!(stored_jobs(&pool).await, jobs(1..=3));

        // restoring again yields the same contents
        handle(pool.clone(), &store, 1000, command("jobs")).await.unwrap();
        assert_eq!(stored_jobs(&pool).await, jobs(1..=3));
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_missing_backup_leaves_table_untouched(pool: PgPool) -> sqlx::Result<()> {
        sqlx::query("INSERT INTO jobs (id, name) VALUES (1, 'Keep me')")
            .execute(&pool)
            .await?;

        let store = MemoryStore::new();
        let err = handle(pool.clone(), &store, 1000, command("jobs")).await.unwrap_err();

        assert!(matches!(err, RestoreError::NotFound(RecordKind::Job)));
        assert_eq!(stored_jobs(&pool).await.len(), 1);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_failed_batch_rolls_back_delete(pool: PgPool) -> sqlx::Result<()> {
        sqlx::query("INSERT INTO jobs (id, name) VALUES (1, 'Original')")
            .execute(&pool)
            .await?;

        // second batch repeats id 1 and violates the primary key
        let mut artifact_jobs = jobs(1..=1000);
        artifact_jobs.push(Job {
            id: 1,
            name: "Duplicate".to_string(),
        });

        let store = MemoryStore::new();
        seed_backup(&store, &artifact_jobs).await;

        let err = handle(pool.clone(), &store, 1000, command("jobs")).await.unwrap_err();
        assert!(matches!(err, RestoreError::RestoreFailed(_)));

        let remaining = stored_jobs(&pool).await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Original");
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_empty_and_corrupt_artifacts(pool: PgPool) -> sqlx::Result<()> {
        let store = MemoryStore::new();
        seed_backup(&store, &[]).await;

        let err = handle(pool.clone(), &store, 1000, command("jobs")).await.unwrap_err();
        assert!(matches!(err, RestoreError::Artifact(ArtifactError::Empty)));

        store
            .put(&backup_key(RecordKind::Job), b"garbage".to_vec(), "text/plain")
            .await
            .unwrap();
        let err = handle(pool.clone(), &store, 1000, command("jobs")).await.unwrap_err();
        assert!(matches!(err, RestoreError::Artifact(ArtifactError::Corrupt(_))));
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_storage_outage(pool: PgPool) -> sqlx::Result<()> {
        let store = MemoryStore::unavailable();
        let err = handle(pool.clone(), &store, 1000, command("departments")).await.unwrap_err();
        assert!(matches!(err, RestoreError::Storage(_)));
        Ok(())
    }
}
