use super::{validate_year, ReportError, DEFAULT_REPORT_YEAR};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Hires per quarter of `year`, by department and job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HiresPerQuarterQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct QuarterlyHires {
    pub department: String,
    pub job: String,
    pub q1: i64,
    pub q2: i64,
    pub q3: i64,
    pub q4: i64,
}

impl Request<Result<Vec<QuarterlyHires>, ReportError>> for HiresPerQuarterQuery {}

impl HiresPerQuarterQuery {
    pub fn validate(&self) -> Result<i32, ReportError> {
        validate_year(self.year.unwrap_or(DEFAULT_REPORT_YEAR))
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: HiresPerQuarterQuery,
) -> Result<Vec<QuarterlyHires>, ReportError> {
    let year = query.validate()?;

    let rows = sqlx::query_as::<_, QuarterlyHires>(
        r#"
        SELECT d.name AS department,
               j.name AS job,
               COUNT(*) FILTER (WHERE EXTRACT(QUARTER FROM e.hired_at AT TIME ZONE 'UTC')::int = 1) AS q1,
               COUNT(*) FILTER (WHERE EXTRACT(QUARTER FROM e.hired_at AT TIME ZONE 'UTC')::int = 2) AS q2,
               COUNT(*) FILTER (WHERE EXTRACT(QUARTER FROM e.hired_at AT TIME ZONE 'UTC')::int = 3) AS q3,
               COUNT(*) FILTER (WHERE EXTRACT(QUARTER FROM e.hired_at AT TIME ZONE 'UTC')::int = 4) AS q4
        FROM hired_employees e
        JOIN departments d ON d.id = e.department_id
        JOIN jobs j ON j.id = e.job_id
        WHERE EXTRACT(YEAR FROM e.hired_at AT TIME ZONE 'UTC')::int = $1
        GROUP BY d.name, j.name
        ORDER BY d.name, j.name
        "#,
    )
    .bind(year)
    .fetch_all(&pool)
    .await?;

    Ok(rows)
}
