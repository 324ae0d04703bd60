//! Hiredata CLI - Main entry point

use clap::Parser;
use hiredata_cli::{api::ApiClient, commands, Cli, Commands};
use hiredata_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.verbose { LogLevel::Debug } else { LogLevel::Warn };
    let log_config = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .log_file_prefix("hiredata-cli")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI works without logging
    let _log_guard = init_logging(&log_config).ok();

    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn execute_command(cli: &Cli) -> hiredata_cli::Result<()> {
    let client = ApiClient::new(cli.server_url.clone())?;

    match &cli.command {
        Commands::Upload { files } => commands::upload::run(&client, files).await,
        Commands::Backup => commands::backup::run(&client).await,
        Commands::Restore { table } => commands::restore::run(&client, table).await,
        Commands::Report { kind, year, json } => {
            commands::report::run(&client, *kind, *year, *json).await
        },
        Commands::Status => commands::status::run(&client).await,
    }
}
