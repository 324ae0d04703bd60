//! `hiredata report` command implementation
//!
//! Prints the analytic reports as tables, or as JSON with `--json`.

use crate::api::{ApiClient, DepartmentHires, QuarterlyHires};
use crate::error::Result;
use crate::ReportKind;
use comfy_table::{presets::UTF8_FULL, Table};

pub async fn run(client: &ApiClient, kind: ReportKind, year: Option<i32>, json: bool) -> Result<()> {
    let output = match kind {
        ReportKind::HiresPerQuarter => {
            let rows = client.hires_per_quarter(year).await?;
            if json {
                serde_json::to_string_pretty(&rows)?
            } else {
                hires_per_quarter_table(&rows)
            }
        },
        ReportKind::DepartmentsAboveMean => {
            let rows = client.departments_above_mean(year).await?;
            if json {
                serde_json::to_string_pretty(&rows)?
            } else {
                departments_above_mean_table(&rows)
            }
        },
    };

    println!("{}", output);
    Ok(())
}

pub fn hires_per_quarter_table(rows: &[QuarterlyHires]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Department", "Job", "Q1", "Q2", "Q3", "Q4"]);

    for row in rows {
        table.add_row(vec![
            row.department.clone(),
            row.job.clone(),
            row.q1.to_string(),
            row.q2.to_string(),
            row.q3.to_string(),
            row.q4.to_string(),
        ]);
    }

    table.to_string()
}

pub fn departments_above_mean_table(rows: &[DepartmentHires]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Id", "Department", "Hired"]);

    for row in rows {
        table.add_row(vec![row.id.to_string(), row.department.clone(), row.hired.to_string()]);
    }

    table.to_string()
}
