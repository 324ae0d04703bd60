//! End-to-end tests for the hiredata binary against a mocked server

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn hiredata(server: &MockServer) -> Command {
    let mut cmd = Command::cargo_bin("hiredata").unwrap();
    cmd.env_remove("HIREDATA_API_TIMEOUT_SECS")
        .env("NO_COLOR", "1")
        .arg("--server-url")
        .arg(server.uri());
    cmd
}

#[tokio::test]
async fn test_status_healthy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "database": "connected",
            "tables": ["hired_employees", "departments", "jobs"]
        })))
        .mount(&server)
        .await;

    hiredata(&server)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("healthy"))
        .stdout(predicate::str::contains("hired_employees, departments, jobs"));
}

#[tokio::test]
async fn test_status_unhealthy_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "success": false,
            "error": {
                "code": "MISSING_TABLES",
                "message": "Missing tables: jobs",
                "details": { "missing": ["jobs"] }
            }
        })))
        .mount(&server)
        .await;

    hiredata(&server)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("503 MISSING_TABLES"));
}

#[tokio::test]
async fn test_upload_files() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload-csv"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "files": [{
                    "status": "processed",
                    "file_name": "jobs.csv",
                    "table": "jobs",
                    "inserted_rows": 1,
                    "error_rows": 1,
                    "error_report": "http://localhost:9000/raw/errors_jobs.csv"
                }],
                "inserted_rows": 1,
                "error_rows": 1
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("jobs.csv");
    std::fs::write(&file, "1,Recruiter\n2,\n").unwrap();

    hiredata(&server)
        .arg("upload")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("jobs.csv -> jobs: 1 inserted, 1 rejected"))
        .stdout(predicate::str::contains("errors_jobs.csv"));
}

#[tokio::test]
async fn test_upload_with_failed_file_exits_nonzero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload-csv"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "files": [
                    {
                        "status": "processed",
                        "file_name": "departments.csv",
                        "table": "departments",
                        "inserted_rows": 3,
                        "error_rows": 0,
                        "error_report": null
                    },
                    {
                        "status": "failed",
                        "file_name": "jobs.csv",
                        "code": "DUPLICATE_RECORD",
                        "message": "Rows already exist in jobs"
                    }
                ],
                "inserted_rows": 3,
                "error_rows": 0
            },
            "meta": { "processed": 1, "failed": 1 }
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let departments = dir.path().join("departments.csv");
    let jobs = dir.path().join("jobs.csv");
    std::fs::write(&departments, "1,Sales\n2,Legal\n3,Staff\n").unwrap();
    std::fs::write(&jobs, "1,Recruiter\n").unwrap();

    hiredata(&server)
        .arg("upload")
        .arg(&departments)
        .arg(&jobs)
        .assert()
        .failure()
        .stdout(predicate::str::contains("departments.csv -> departments: 3 inserted, 0 rejected"))
        .stdout(predicate::str::contains("jobs.csv failed (DUPLICATE_RECORD)"))
        .stderr(predicate::str::contains("1 of 2 files failed to upload"));
}

#[tokio::test]
async fn test_backup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/backup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "message": "Backup completed successfully",
                "files": {
                    "hired_employees": "https://backups.s3.amazonaws.com/backups/hired_employees_backup.parquet",
                    "departments": "https://backups.s3.amazonaws.com/backups/departments_backup.parquet",
                    "jobs": "https://backups.s3.amazonaws.com/backups/jobs_backup.parquet"
                }
            }
        })))
        .mount(&server)
        .await;

    hiredata(&server)
        .arg("backup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup completed successfully"))
        .stdout(predicate::str::contains("jobs_backup.parquet"));
}

#[tokio::test]
async fn test_restore_rejects_unknown_table_locally() {
    let server = MockServer::start().await;

    hiredata(&server)
        .arg("restore")
        .arg("salaries")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported record kind 'salaries'"));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_restore_accepts_kind_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/restore/hired_employees"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "message": "Table hired_employees restored successfully with 42 rows",
                "table": "hired_employees",
                "restored_rows": 42
            }
        })))
        .mount(&server)
        .await;

    hiredata(&server)
        .arg("restore")
        .arg("Employee")
        .assert()
        .success()
        .stdout(predicate::str::contains("restored successfully with 42 rows"));
}

#[tokio::test]
async fn test_restore_missing_backup() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/restore/jobs"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "error": { "code": "NOT_FOUND", "message": "No backup found for table jobs" }
        })))
        .mount(&server)
        .await;

    hiredata(&server)
        .arg("restore")
        .arg("jobs")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No backup found for table jobs"));
}

#[tokio::test]
async fn test_report_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/employees_hired_per_quarter"))
        .and(query_param("year", "2021"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                { "department": "Staff", "job": "Recruiter", "q1": 3, "q2": 0, "q3": 7, "q4": 11 }
            ]
        })))
        .mount(&server)
        .await;

    hiredata(&server)
        .args(["report", "hires-per-quarter", "--year", "2021", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"department\": \"Staff\""))
        .stdout(predicate::str::contains("\"q4\": 11"));
}

#[tokio::test]
async fn test_report_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/departments_above_mean_hires"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{ "id": 8, "department": "Support", "hired": 221 }]
        })))
        .mount(&server)
        .await;

    hiredata(&server)
        .args(["report", "departments-above-mean"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Support"))
        .stdout(predicate::str::contains("221"));
}
