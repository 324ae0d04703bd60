//! `hiredata status` command implementation

use crate::api::ApiClient;
use crate::error::Result;
use colored::Colorize;

/// Show server health and table availability
pub async fn run(client: &ApiClient) -> Result<()> {
    let health = client.health().await?;

    println!("{} {}", "Server:".cyan().bold(), client.base_url());
    println!("  Status:   {}", health.status.green());
    println!("  Database: {}", health.database);
    println!("  Tables:   {}", health.tables.join(", "));

    Ok(())
}
