pub mod backup;
pub mod restore;

pub use backup::{BackupError, BackupTablesCommand, BackupTablesResponse};
pub use restore::{RestoreError, RestoreTableCommand, RestoreTableResponse};
