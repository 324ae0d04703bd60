//! Wire types returned by the Hiredata server

use hiredata_common::RecordKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Success envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

/// Error envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub file_name: String,
    pub table: RecordKind,
    pub inserted_rows: usize,
    pub error_rows: usize,
    #[serde(default)]
    pub error_report: Option<String>,
}

/// One file of a multi-file upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadOutcome {
    Processed(IngestSummary),
    Failed {
        file_name: String,
        code: String,
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSummary {
    pub files: Vec<UploadOutcome>,
    pub inserted_rows: usize,
    pub error_rows: usize,
}

impl UploadSummary {
    pub fn failed_files(&self) -> usize {
        self.files
            .iter()
            .filter(|outcome| matches!(outcome, UploadOutcome::Failed { .. }))
            .count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupSummary {
    pub message: String,
    pub files: BTreeMap<RecordKind, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreSummary {
    pub message: String,
    pub table: RecordKind,
    pub restored_rows: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterlyHires {
    pub department: String,
    pub job: String,
    pub q1: i64,
    pub q2: i64,
    pub q3: i64,
    pub q4: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentHires {
    pub id: i32,
    pub department: String,
    pub hired: i64,
}

/// Body of `GET /health` when the service is healthy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
    #[serde(default)]
    pub tables: Vec<String>,
}
