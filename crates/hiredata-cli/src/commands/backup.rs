//! `hiredata backup` command implementation

use crate::api::ApiClient;
use crate::error::Result;
use colored::Colorize;

/// Back up every table
pub async fn run(client: &ApiClient) -> Result<()> {
    let summary = client.backup().await?;

    println!("{}", summary.message.green());
    for (table, location) in &summary.files {
        println!("  {:<16} {}", table.to_string(), location);
    }

    Ok(())
}
