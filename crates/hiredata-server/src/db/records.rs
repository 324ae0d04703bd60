//! Generic record I/O over the three record tables

use crate::models::TableRecord;
use hiredata_common::RecordKind;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

/// Postgres caps one statement at this many bind parameters
pub const MAX_BIND_PARAMS: usize = u16::MAX as usize;

/// Largest row count one `INSERT` of `kind` can bind
pub fn max_chunk_rows(kind: RecordKind) -> usize {
    MAX_BIND_PARAMS / kind.arity()
}

/// Insert `records` with multi-row `INSERT` statements of at most
/// `chunk_size` rows each, clamped to what one statement can bind.
///
/// Runs on the caller's connection so the caller owns the transaction.
pub async fn insert_records<T: TableRecord>(
    conn: &mut PgConnection,
    records: &[T],
    chunk_size: usize,
) -> Result<u64, sqlx::Error> {
    let table = T::KIND.table_name();
    let columns = T::KIND.field_names().join(", ");
    let chunk_size = chunk_size.clamp(1, max_chunk_rows(T::KIND));
    let mut inserted = 0;

    for chunk in records.chunks(chunk_size) {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO {} ({}) ", table, columns));

        builder.push_values(chunk, |mut tuple, record| {
            record.push_binds(&mut tuple);
        });

        inserted += builder.build().execute(&mut *conn).await?.rows_affected();
    }

    tracing::debug!(table, inserted, "Inserted records");

    Ok(inserted)
}

/// Every stored record of `T`'s table, ordered by id
pub async fn fetch_all<T: TableRecord>(pool: &PgPool) -> Result<Vec<T>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM {} ORDER BY id",
        T::KIND.field_names().join(", "),
        T::KIND.table_name()
    );

    sqlx::query_as::<_, T>(&sql).fetch_all(pool).await
}

/// Remove every row of `T`'s table
pub async fn delete_all<T: TableRecord>(conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
    let sql = format!("DELETE FROM {}", T::KIND.table_name());
    let result = sqlx::query(&sql).execute(&mut *conn).await?;
    Ok(result.rows_affected())
}
