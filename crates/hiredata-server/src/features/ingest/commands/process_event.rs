use super::ingest::{self, IngestCsvCommand, IngestCsvResponse};
use crate::config::LimitsConfig;
use crate::storage::ObjectStore;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// S3 event notification, as delivered by bucket notifications
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct S3EventNotification {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Object {
    pub key: String,
}

/// What happened to one notification record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EventOutcome {
    Processed { key: String, result: IngestCsvResponse },
    Skipped { key: String, reason: String },
    Failed { key: String, message: String },
}

impl EventOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            EventOutcome::Processed { .. } => "processed",
            EventOutcome::Skipped { .. } => "skipped",
            EventOutcome::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessEventResponse {
    pub records: Vec<EventOutcome>,
}

impl Request<ProcessEventResponse> for S3EventNotification {}

/// Where event-triggered objects are read from
pub struct RawSource<'a> {
    pub store: &'a dyn ObjectStore,
    pub bucket: &'a str,
}

/// Decode an S3 notification key (`+` is a space, then percent-decoding)
pub fn decode_key(key: &str) -> Result<String, std::string::FromUtf8Error> {
    urlencoding::decode(&key.replace('+', " ")).map(|decoded| decoded.into_owned())
}

/// Ingest every CSV object named in `event`.
///
/// Records are independent: a failing object is reported and the rest are
/// still processed.
#[tracing::instrument(
    skip(pool, error_store, raw, limits, event),
    fields(records = event.records.len())
)]
pub async fn handle(
    pool: PgPool,
    error_store: &dyn ObjectStore,
    raw: RawSource<'_>,
    limits: LimitsConfig,
    event: S3EventNotification,
) -> ProcessEventResponse {
    let mut outcomes = Vec::with_capacity(event.records.len());

    for record in event.records {
        let outcome = process_record(&pool, error_store, &raw, limits, record).await;
        if let EventOutcome::Failed { key, message } = &outcome {
            tracing::warn!(key = %key, error = %message, "Event-triggered ingestion failed");
        }
        outcomes.push(outcome);
    }

    ProcessEventResponse { records: outcomes }
}

async fn process_record(
    pool: &PgPool,
    error_store: &dyn ObjectStore,
    raw: &RawSource<'_>,
    limits: LimitsConfig,
    record: S3EventRecord,
) -> EventOutcome {
    let key = match decode_key(&record.s3.object.key) {
        Ok(key) => key,
        Err(e) => {
            return EventOutcome::Failed {
                key: record.s3.object.key,
                message: format!("Invalid object key: {}", e),
            }
        },
    };

    if record.s3.bucket.name != raw.bucket {
        return EventOutcome::Skipped {
            reason: format!("Bucket '{}' is not the raw bucket", record.s3.bucket.name),
            key,
        };
    }

    if !key.to_ascii_lowercase().ends_with(".csv") {
        return EventOutcome::Skipped {
            key,
            reason: "Not a CSV file".to_string(),
        };
    }

    let content = match raw.store.get(&key).await {
        Ok(content) => content,
        Err(e) => {
            return EventOutcome::Failed {
                key,
                message: e.to_string(),
            }
        },
    };

    let file_name = key.rsplit('/').next().unwrap_or(&key).to_string();
    let command = IngestCsvCommand { file_name, content };

    match ingest::handle(pool.clone(), error_store, limits, command).await {
        Ok(result) => EventOutcome::Processed { key, result },
        Err(e) => EventOutcome::Failed {
            key,
            message: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn event(records: &[(&str, &str)]) -> S3EventNotification {
        S3EventNotification {
            records: records
                .iter()
                .map(|(bucket, key)| S3EventRecord {
                    s3: S3Entity {
                        bucket: S3Bucket {
                            name: bucket.to_string(),
                        },
                        object: S3Object {
                            key: key.to_string(),
                        },
                    },
                })
                .collect(),
        }
    }

    #[test]
    fn test_decode_key() {
        assert_eq!(decode_key("uploads/hired+employees%202021.csv").unwrap(), "uploads/hired employees 2021.csv");
        assert_eq!(decode_key("jobs.csv").unwrap(), "jobs.csv");
        assert!(decode_key("bad%FF.csv").is_err());
    }

    #[test]
    fn test_parse_notification() {
        let json = r#"{"Records":[{"eventName":"ObjectCreated:Put","s3":{"bucket":{"name":"raw"},"object":{"key":"jobs.csv","size":12}}}]}"#;
        let event: S3EventNotification = serde_json::from_str(json).unwrap();
        assert_eq!(event.records.len(), 1);
        assert_eq!(event.records[0].s3.object.key, "jobs.csv");

        let empty: S3EventNotification = serde_json::from_str("{}").unwrap();
        assert!(empty.records.is_empty());
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = EventOutcome::Skipped {
            key: "a.txt".to_string(),
            reason: "Not a CSV file".to_string(),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "skipped");
        assert_eq!(value["key"], "a.txt");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_records_are_independent(pool: PgPool) -> sqlx::Result<()> {
        let raw_store = MemoryStore::new();
        raw_store
            .put("incoming/jobs.csv", b"1,Recruiter\n2,Engineer\n".to_vec(), "text/csv")
            .await
            .unwrap();
        raw_store
            .put("incoming/salaries.csv", b"1,100\n".to_vec(), "text/csv")
            .await
            .unwrap();

        let error_store = MemoryStore::new();
        let raw = RawSource {
            store: &raw_store,
            bucket: "raw",
        };

        let response = handle(
            pool.clone(),
            &error_store,
            raw,
            LimitsConfig::default(),
            event(&[
                ("raw", "incoming/salaries.csv"),
                ("raw", "incoming/jobs.csv"),
                ("raw", "incoming/readme.txt"),
                ("other", "incoming/jobs.csv"),
                ("raw", "incoming/missing_departments.csv"),
            ]),
        )
        .await;

        let statuses: Vec<&str> = response.records.iter().map(EventOutcome::status).collect();
        assert_eq!(statuses, vec!["failed", "processed", "skipped", "skipped", "failed"]);

        match &response.records[1] {
            EventOutcome::Processed { result, .. } => {
                assert_eq!(result.file_name, "jobs.csv");
                assert_eq!(result.inserted_rows, 2);
            },
            other => panic!("unexpected outcome: {other:?}"),
        }
        Ok(())
    }
}
