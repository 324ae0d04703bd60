//! `hiredata restore` command implementation

use crate::api::ApiClient;
use crate::error::Result;
use colored::Colorize;
use hiredata_common::RecordKind;

/// Replace one table with its backup
pub async fn run(client: &ApiClient, table: &str) -> Result<()> {
    let kind: RecordKind = table.parse()?;
    let summary = client.restore(kind).await?;
    println!("{}", summary.message.green());
    Ok(())
}
