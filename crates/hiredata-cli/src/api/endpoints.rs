//! URL builders for the server routes

use hiredata_common::RecordKind;

fn join(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

pub fn health_url(base_url: &str) -> String {
    join(base_url, "/health")
}

pub fn upload_url(base_url: &str) -> String {
    join(base_url, "/upload-csv")
}

pub fn backup_url(base_url: &str) -> String {
    join(base_url, "/backup")
}

pub fn restore_url(base_url: &str, kind: RecordKind) -> String {
    join(base_url, &format!("/restore/{}", kind.table_name()))
}

pub fn hires_per_quarter_url(base_url: &str, year: Option<i32>) -> String {
    with_year(join(base_url, "/employees_hired_per_quarter"), year)
}

pub fn departments_above_mean_url(base_url: &str, year: Option<i32>) -> String {
    with_year(join(base_url, "/departments_above_mean_hires"), year)
}

fn with_year(url: String, year: Option<i32>) -> String {
    match year {
        Some(year) => format!("{}?year={}", url, year),
        None => url,
    }
}
