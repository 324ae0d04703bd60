//! Object storage
//!
//! The pipelines only need two capabilities from object storage, captured by
//! [`ObjectStore`]: `put(key, bytes) -> location` and `get(key) -> bytes`.
//! [`Storage`] implements them on top of S3 (or any S3-compatible service);
//! [`MemoryStore`] keeps objects in process and backs the test suites.

use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::{DisplayErrorContext, ProvideErrorMetadata},
    primitives::ByteStream,
    Client,
};
use hiredata_common::RecordKind;
use tracing::{debug, info, instrument};

pub mod config;
pub mod memory;

pub use memory::MemoryStore;

/// Errors returned by object storage backends
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object '{0}' not found")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Minimal object storage capability used by the pipelines
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`, overwriting any existing object, and return
    /// the object's location.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str)
        -> Result<String, StorageError>;

    /// Fetch the full contents of `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;
}

/// Key of the backup artifact for a record kind
pub fn backup_key(kind: RecordKind) -> String {
    format!("backups/{}_backup.parquet", kind.table_name())
}

/// Key of the rejected-rows report for a record kind
pub fn error_report_key(kind: RecordKind) -> String {
    format!("errors_{}.csv", kind.table_name())
}

/// S3-backed object store bound to one bucket
#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
    endpoint: Option<String>,
}

impl Storage {
    /// Build a client for the primary bucket of `config`
    pub fn new(config: &config::StorageConfig) -> Self {
        debug!(
            region = %config.region,
            endpoint = ?config.endpoint,
            "Initializing storage client"
        );

        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "hiredata-storage",
        );

        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .force_path_style(config.path_style);

        if let Some(endpoint) = &config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(s3_config_builder.build());

        info!("Storage client initialized for bucket: {}", config.bucket);

        Self {
            client,
            bucket: config.bucket.clone(),
            endpoint: config.endpoint.clone(),
        }
    }

    /// Same client, different bucket
    pub fn with_bucket(&self, bucket: impl Into<String>) -> Self {
        Self {
            client: self.client.clone(),
            bucket: bucket.into(),
            endpoint: self.endpoint.clone(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Public location of `key` in this bucket
    pub fn location(&self, key: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => {
                format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key)
            },
            None => format!("https://{}.s3.amazonaws.com/{}", self.bucket, key),
        }
    }
}

#[async_trait]
impl ObjectStore for Storage {
    #[instrument(skip(self, data), fields(bucket = %self.bucket))]
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let size = data.len();
        let checksum = calculate_sha256(&data);

        debug!("Uploading {} bytes to s3://{}/{}", size, self.bucket, key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                StorageError::Backend(format!(
                    "Failed to upload s3://{}/{}: {}",
                    self.bucket,
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        info!(size, checksum = %checksum, "Uploaded s3://{}/{}", self.bucket, key);

        Ok(self.location(key))
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        debug!("Downloading from s3://{}/{}", self.bucket, key);

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(service_error)
                    if service_error.is_no_such_key()
                        || is_missing_object(service_error.code()) =>
                {
                    debug!(code = ?service_error.code(), "Object s3://{}/{} is missing", self.bucket, key);
                    StorageError::NotFound(key.to_string())
                },
                _ => StorageError::Backend(format!(
                    "Failed to download s3://{}/{}: {}",
                    self.bucket,
                    key,
                    DisplayErrorContext(&e)
                )),
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| {
                StorageError::Backend(format!("Failed to read S3 response body for {}: {}", key, e))
            })?
            .into_bytes()
            .to_vec();

        debug!("Downloaded {} bytes from s3://{}/{}", data.len(), self.bucket, key);

        Ok(data)
    }
}

/// Error codes S3 uses for an absent object. Without `s3:ListBucket` a missing
/// key comes back as `AccessDenied` instead of `NoSuchKey`.
fn is_missing_object(code: Option<&str>) -> bool {
    matches!(code, Some("NoSuchKey" | "NotFound" | "AccessDenied"))
}

fn calculate_sha256(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
