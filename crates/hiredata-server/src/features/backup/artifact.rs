//! Backup artifact codec
//!
//! One Snappy-compressed Parquet file per table. Every column is non-nullable
//! and typed exactly as [`ColumnarRecord::schema`] describes; decoding checks
//! the file's schema against it before reading any rows.

use crate::models::{Department, Employee, Job, TableRecord};
use arrow::array::{Array, ArrayRef, Int32Array, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use chrono::DateTime;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::errors::ParquetError;
use parquet::file::properties::WriterProperties;
use std::sync::Arc;

/// Timezone stored on timestamp columns
const UTC: &str = "+00:00";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Backup artifact is corrupt: {0}")]
    Corrupt(String),

    #[error("Backup artifact contains no records")]
    Empty,

    #[error("Failed to encode backup artifact: {0}")]
    Encode(String),
}

impl From<ParquetError> for ArtifactError {
    fn from(err: ParquetError) -> Self {
        Self::Encode(err.to_string())
    }
}

/// A record with a fixed columnar layout
pub trait ColumnarRecord: TableRecord {
    fn schema() -> SchemaRef;

    fn columns(records: &[Self]) -> Vec<ArrayRef>;

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>, ArtifactError>;
}

/// Serialize `records` into a Parquet file
pub fn encode<T: ColumnarRecord>(records: &[T]) -> Result<Vec<u8>, ArtifactError> {
    let schema = T::schema();
    let batch = RecordBatch::try_new(schema.clone(), T::columns(records))
        .map_err(|e| ArtifactError::Encode(e.to_string()))?;

    let properties = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, schema, Some(properties))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(buffer)
}

/// Deserialize a Parquet file written by [`encode`].
///
/// Zero rows is [`ArtifactError::Empty`]; anything unreadable or shaped
/// differently from `T`'s schema is [`ArtifactError::Corrupt`].
pub fn decode<T: ColumnarRecord>(data: Vec<u8>) -> Result<Vec<T>, ArtifactError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(data))
        .map_err(|e| ArtifactError::Corrupt(e.to_string()))?;

    check_schema(&T::schema(), builder.schema())?;

    let reader = builder
        .build()
        .map_err(|e| ArtifactError::Corrupt(e.to_string()))?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|e: ArrowError| ArtifactError::Corrupt(e.to_string()))?;
        records.extend(T::from_batch(&batch)?);
    }

    if records.is_empty() {
        return Err(ArtifactError::Empty);
    }

    Ok(records)
}

fn check_schema(expected: &Schema, actual: &Schema) -> Result<(), ArtifactError> {
    let matches = expected.fields().len() == actual.fields().len()
        && expected
            .fields()
            .iter()
            .zip(actual.fields().iter())
            .all(|(e, a)| e.name() == a.name() && e.data_type() == a.data_type());

    if matches {
        Ok(())
    } else {
        Err(ArtifactError::Corrupt(format!(
            "unexpected schema: expected [{}], found [{}]",
            describe(expected),
            describe(actual)
        )))
    }
}

fn describe(schema: &Schema) -> String {
    schema
        .fields()
        .iter()
        .map(|f| format!("{}: {}", f.name(), f.data_type()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Typed, null-free column by name
fn column<'a, A: Array + 'static>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<&'a A, ArtifactError> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| ArtifactError::Corrupt(format!("missing column '{}'", name)))?;

    if column.null_count() > 0 {
        return Err(ArtifactError::Corrupt(format!("column '{}' contains nulls", name)));
    }

    column.as_any().downcast_ref::<A>().ok_or_else(|| {
        ArtifactError::Corrupt(format!("column '{}' has type {}", name, column.data_type()))
    })
}

fn id_name_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int32, false),
        Field::new("name", DataType::Utf8, false),
    ]))
}

fn id_name_columns<'a>(rows: impl Iterator<Item = (i32, &'a str)> + Clone) -> Vec<ArrayRef> {
    vec![
        Arc::new(Int32Array::from_iter_values(rows.clone().map(|(id, _)| id))),
        Arc::new(StringArray::from_iter_values(rows.map(|(_, name)| name))),
    ]
}

fn id_name_rows(batch: &RecordBatch) -> Result<Vec<(i32, String)>, ArtifactError> {
    let ids = column::<Int32Array>(batch, "id")?;
    let names = column::<StringArray>(batch, "name")?;

    Ok((0..batch.num_rows())
        .map(|i| (ids.value(i), names.value(i).to_string()))
        .collect())
}

impl ColumnarRecord for Department {
    fn schema() -> SchemaRef {
        id_name_schema()
    }

    fn columns(records: &[Self]) -> Vec<ArrayRef> {
        id_name_columns(records.iter().map(|r| (r.id, r.name.as_str())))
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>, ArtifactError> {
        Ok(id_name_rows(batch)?
            .into_iter()
            .map(|(id, name)| Self { id, name })
            .collect())
    }
}

impl ColumnarRecord for Job {
    fn schema() -> SchemaRef {
        id_name_schema()
    }

    fn columns(records: &[Self]) -> Vec<ArrayRef> {
        id_name_columns(records.iter().map(|r| (r.id, r.name.as_str())))
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>, ArtifactError> {
        Ok(id_name_rows(batch)?
            .into_iter()
            .map(|(id, name)| Self { id, name })
            .collect())
    }
}

impl ColumnarRecord for Employee {
    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int32, false),
            Field::new("name", DataType::Utf8, false),
            Field::new(
                "hired_at",
                DataType::Timestamp(TimeUnit::Microsecond, Some(UTC.into())),
                false,
            ),
            Field::new("department_id", DataType::Int32, false),
            Field::new("job_id", DataType::Int32, false),
        ]))
    }

    fn columns(records: &[Self]) -> Vec<ArrayRef> {
        vec![
            Arc::new(Int32Array::from_iter_values(records.iter().map(|r| r.id))),
            Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.name.as_str()))),
            Arc::new(
                TimestampMicrosecondArray::from_iter_values(
                    records.iter().map(|r| r.hired_at.timestamp_micros()),
                )
                .with_timezone(UTC),
            ),
            Arc::new(Int32Array::from_iter_values(records.iter().map(|r| r.department_id))),
            Arc::new(Int32Array::from_iter_values(records.iter().map(|r| r.job_id))),
        ]
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>, ArtifactError> {
        let ids = column::<Int32Array>(batch, "id")?;
        let names = column::<StringArray>(batch, "name")?;
        let hired_at = column::<TimestampMicrosecondArray>(batch, "hired_at")?;
        let department_ids = column::<Int32Array>(batch, "department_id")?;
        let job_ids = column::<Int32Array>(batch, "job_id")?;

        (0..batch.num_rows())
            .map(|i| {
                let micros = hired_at.value(i);
                let hired_at = DateTime::from_timestamp_micros(micros).ok_or_else(|| {
                    ArtifactError::Corrupt(format!("timestamp {} out of range", micros))
                })?;

                Ok(Self {
                    id: ids.value(i),
                    name: names.value(i).to_string(),
                    hired_at,
                    department_id: department_ids.value(i),
                    job_id: job_ids.value(i),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn employees() -> Vec<Employee> {
        vec![
            Employee {
                id: 1,
                name: "Harold Vogt".to_string(),
                hired_at: Utc.with_ymd_and_hms(2021, 11, 7, 2, 48, 42).unwrap(),
                department_id: 2,
                job_id: 96,
            },
            Employee {
                id: 2,
                name: "Ty Hofer".to_string(),
                hired_at: Utc.with_ymd_and_hms(2021, 5, 30, 5, 43, 46).unwrap(),
                department_id: 8,
                job_id: 1,
            },
        ]
    }

    #[test]
    fn test_employee_round_trip() {
        let records = employees();
        let data = encode(&records).unwrap();
        assert_eq!(&data[..4], b"PAR1");

        let decoded: Vec<Employee> = decode(data).unwrap();
        assert_eq!(decoded, records);
    }

    #[test]
    fn test_empty_table_encodes_but_does_not_decode() {
        let data = encode::<Job>(&[]).unwrap();
        assert!(matches!(decode::<Job>(data), Err(ArtifactError::Empty)));
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let err = decode::<Department>(b"definitely not parquet".to_vec()).unwrap_err();
        assert!(matches!(err, ArtifactError::Corrupt(_)));
    }

    #[test]
    fn test_schema_mismatch_is_corrupt() {
        let jobs = vec![Job {
            id: 1,
            name: "Recruiter".to_string(),
        }];
        let data = encode(&jobs).unwrap();

        let err = decode::<Employee>(data).unwrap_err();
        assert!(matches!(err, ArtifactError::Corrupt(msg) if msg.contains("unexpected schema")));
    }

    #[test]
    fn test_same_shape_kinds_are_interchangeable() {
        let departments = vec![Department {
            id: 3,
            name: "Sales".to_string(),
        }];
        let data = encode(&departments).unwrap();

        let jobs: Vec<Job> = decode(data).unwrap();
        assert_eq!(jobs[0].id, 3);
        assert_eq!(jobs[0].name, "Sales");
    }

    #[test]
    fn test_nullable_column_with_nulls_is_corrupt() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int32, true),
            Field::new("name", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int32Array::from(vec![Some(1), None])),
                Arc::new(StringArray::from(vec![Some("a"), Some("b")])),
            ],
        )
        .unwrap();

        let mut data = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut data, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let err = decode::<Job>(data).unwrap_err();
        assert!(matches!(err, ArtifactError::Corrupt(msg) if msg.contains("nulls")));
    }
}
