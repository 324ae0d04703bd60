//! Database error handling utilities
//!
//! ```rust,ignore
//! use hiredata_server::features::shared::error_helpers::is_unique_violation;
//!
//! builder.build().execute(&mut *tx).await.map_err(|e| {
//!     if is_unique_violation(&e) {
//!         IngestError::DuplicateRecord { .. }
//!     } else {
//!         IngestError::Persistence(e)
//!     }
//! })?;
//! ```

use sqlx::Error as SqlxError;

/// Check if the error is a unique constraint violation
pub fn is_unique_violation(error: &SqlxError) -> bool {
    if let SqlxError::Database(db_err) = error {
        return db_err.is_unique_violation();
    }
    false
}

/// Human-readable description of a constraint violation.
///
/// Postgres puts the offending key in the `DETAIL` field
/// (`Key (id)=(1) already exists.`); falls back to the error message.
pub fn constraint_detail(error: &SqlxError) -> String {
    match error {
        SqlxError::Database(db_err) => db_err
            .try_downcast_ref::<sqlx::postgres::PgDatabaseError>()
            .and_then(|pg| pg.detail())
            .map(str::to_string)
            .unwrap_or_else(|| db_err.message().to_string()),
        other => other.to_string(),
    }
}
