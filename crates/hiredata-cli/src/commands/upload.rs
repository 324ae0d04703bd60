//! `hiredata upload` command implementation

use crate::api::{ApiClient, UploadOutcome, UploadSummary};
use crate::error::{CliError, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Upload CSV files; the table for each file is chosen by its name
pub async fn run(client: &ApiClient, files: &[PathBuf]) -> Result<()> {
    let summary = client.upload_csv(files).await?;
    print!("{}", render(&summary));

    match summary.failed_files() {
        0 => Ok(()),
        failed => Err(CliError::UploadIncomplete {
            failed,
            total: summary.files.len(),
        }),
    }
}

pub fn render(summary: &UploadSummary) -> String {
    let mut out = String::new();

    for outcome in &summary.files {
        match outcome {
            UploadOutcome::Processed(file) => {
                out.push_str(&format!(
                    "{} -> {}: {} inserted, {} rejected\n",
                    file.file_name.green(),
                    file.table,
                    file.inserted_rows,
                    file.error_rows
                ));
                if let Some(report) = &file.error_report {
                    out.push_str(&format!("  Rejected rows: {}\n", report));
                }
            },
            UploadOutcome::Failed {
                file_name,
                code,
                message,
            } => {
                out.push_str(&format!("{} failed ({}): {}\n", file_name.red(), code, message));
            },
        }
    }

    out.push_str(&format!(
        "{} {} rows inserted, {} rows rejected\n",
        "Total:".cyan().bold(),
        summary.inserted_rows,
        summary.error_rows
    ));
    out
}
