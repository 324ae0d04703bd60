//! Backup and restore of the record tables
//!
//! `GET /backup` writes one Parquet artifact per table to the backup bucket;
//! `POST /restore/:table_name` replaces a table with its artifact.

pub mod artifact;
pub mod commands;
pub mod routes;

pub use artifact::{ArtifactError, ColumnarRecord};
pub use commands::{
    BackupError, BackupTablesCommand, BackupTablesResponse, RestoreError, RestoreTableCommand,
    RestoreTableResponse,
};
pub use routes::backup_routes;
