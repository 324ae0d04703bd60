//! HTTP API client for the Hiredata server

use crate::api::{endpoints, types::*};
use crate::error::{CliError, Result};
use hiredata_common::RecordKind;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// API Client Constants
// ============================================================================

/// Default timeout for API requests in seconds.
/// Can be overridden via HIREDATA_API_TIMEOUT_SECS.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 300;

/// Server URL used when neither the flag nor HIREDATA_SERVER_URL is set.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let timeout_secs = timeout_secs(std::env::var("HIREDATA_API_TIMEOUT_SECS").ok())?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Health check; an unhealthy server comes back as [`CliError::Api`]
    pub async fn health(&self) -> Result<HealthStatus> {
        let response = self.client.get(endpoints::health_url(&self.base_url)).send().await?;
        read_body(response).await
    }

    /// Upload CSV files in one multipart request
    #[tracing::instrument(skip(self, paths), fields(files = paths.len()))]
    pub async fn upload_csv<P: AsRef<Path>>(&self, paths: &[P]) -> Result<UploadSummary> {
        let mut form = Form::new();

        for path in paths {
            let path = path.as_ref();
            let content = tokio::fs::read(path).await.map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => CliError::FileNotFound(path.display().to_string()),
                _ => CliError::Io(e),
            })?;

            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| CliError::FileNotFound(path.display().to_string()))?;

            tracing::debug!(file_name = %file_name, size = content.len(), "Adding file to upload");
            let part = Part::bytes(content).file_name(file_name).mime_str("text/csv")?;
            form = form.part("files", part);
        }

        let response = self
            .client
            .post(endpoints::upload_url(&self.base_url))
            .multipart(form)
            .send()
            .await?;

        read_envelope(response).await
    }

    pub async fn backup(&self) -> Result<BackupSummary> {
        let response = self.client.get(endpoints::backup_url(&self.base_url)).send().await?;
        read_envelope(response).await
    }

    pub async fn restore(&self, kind: RecordKind) -> Result<RestoreSummary> {
        let response = self
            .client
            .post(endpoints::restore_url(&self.base_url, kind))
            .send()
            .await?;
        read_envelope(response).await
    }

    pub async fn hires_per_quarter(&self, year: Option<i32>) -> Result<Vec<QuarterlyHires>> {
        let url = endpoints::hires_per_quarter_url(&self.base_url, year);
        let response = self.client.get(url).send().await?;
        read_envelope(response).await
    }

    pub async fn departments_above_mean(&self, year: Option<i32>) -> Result<Vec<DepartmentHires>> {
        let url = endpoints::departments_above_mean_url(&self.base_url, year);
        let response = self.client.get(url).send().await?;
        read_envelope(response).await
    }
}

fn timeout_secs(value: Option<String>) -> Result<u64> {
    match value {
        Some(value) => value.parse().map_err(|_| {
            CliError::config(format!("HIREDATA_API_TIMEOUT_SECS must be a number, got '{}'", value))
        }),
        None => Ok(DEFAULT_API_TIMEOUT_SECS),
    }
}

async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<T> {
    let envelope: ApiResponse<T> = read_body(response).await?;
    Ok(envelope.data)
}

/// Decode a success body, or turn an error status into [`CliError::Api`]
async fn read_body<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return Ok(serde_json::from_str(&body)?);
    }

    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(envelope) => Err(CliError::Api {
            status: status.as_u16(),
            code: envelope.error.code,
            message: envelope.error.message,
        }),
        Err(_) => Err(CliError::UnexpectedResponse {
            status: status.as_u16(),
            body,
        }),
    }
}
