use serde::{Deserialize, Serialize};
use std::env;

/// S3 connection and bucket layout.
///
/// `bucket` holds error reports and is required; backups and the event
/// source bucket default to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub endpoint: Option<String>,
    pub region: String,
    pub bucket: String,
    pub backup_bucket: String,
    pub raw_bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub path_style: bool,
}

impl StorageConfig {
    /// Read the storage configuration from the environment.
    ///
    /// A missing `S3_BUCKET` or missing credentials is a startup error.
    pub fn from_env() -> anyhow::Result<Self> {
        let bucket = env::var("S3_BUCKET")
            .ok()
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("S3_BUCKET environment variable is not set"))?;

        let access_key = env::var("S3_ACCESS_KEY")
            .or_else(|_| env::var("AWS_ACCESS_KEY_ID"))
            .map_err(|_| anyhow::anyhow!("S3_ACCESS_KEY or AWS_ACCESS_KEY_ID must be set"))?;
        let secret_key = env::var("S3_SECRET_KEY")
            .or_else(|_| env::var("AWS_SECRET_ACCESS_KEY"))
            .map_err(|_| anyhow::anyhow!("S3_SECRET_KEY or AWS_SECRET_ACCESS_KEY must be set"))?;

        Ok(Self {
            endpoint: env::var("S3_ENDPOINT").ok(),
            region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            backup_bucket: env::var("S3_BACKUP_BUCKET").unwrap_or_else(|_| bucket.clone()),
            raw_bucket: env::var("S3_RAW_BUCKET").unwrap_or_else(|_| bucket.clone()),
            bucket,
            access_key,
            secret_key,
            path_style: env::var("S3_PATH_STYLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        })
    }

    /// Local MinIO layout with every role in one bucket
    pub fn for_minio(endpoint: impl Into<String>, bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        Self {
            endpoint: Some(endpoint.into()),
            region: "us-east-1".to_string(),
            backup_bucket: bucket.clone(),
            raw_bucket: bucket.clone(),
            bucket,
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            path_style: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [
            "S3_BUCKET",
            "S3_BACKUP_BUCKET",
            "S3_RAW_BUCKET",
            "S3_ACCESS_KEY",
            "S3_SECRET_KEY",
            "AWS_ACCESS_KEY_ID",
            "AWS_SECRET_ACCESS_KEY",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_for_minio() {
        let config = StorageConfig::for_minio("http://localhost:9000", "test-bucket");
        assert_eq!(config.endpoint, Some("http://localhost:9000".to_string()));
        assert_eq!(config.bucket, "test-bucket");
        assert_eq!(config.backup_bucket, "test-bucket");
        assert!(config.path_style);
    }

    #[test]
    #[serial]
    fn test_missing_bucket_is_fatal() {
        clear_env();
        env::set_var("S3_ACCESS_KEY", "key");
        env::set_var("S3_SECRET_KEY", "secret");

        let err = StorageConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("S3_BUCKET"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_secondary_buckets_default_to_primary() {
        clear_env();
        env::set_var("S3_BUCKET", "hiredata-errors");
        env::set_var("S3_BACKUP_BUCKET", "hiredata-backups");
        env::set_var("AWS_ACCESS_KEY_ID", "key");
        env::set_var("AWS_SECRET_ACCESS_KEY", "secret");

        let config = StorageConfig::from_env().unwrap();
        assert_eq!(config.bucket, "hiredata-errors");
        assert_eq!(config.backup_bucket, "hiredata-backups");
        assert_eq!(config.raw_bucket, "hiredata-errors");
        assert_eq!(config.access_key, "key");

        clear_env();
    }
}
