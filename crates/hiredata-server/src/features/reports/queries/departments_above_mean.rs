use super::{validate_year, ReportError, DEFAULT_REPORT_YEAR};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Departments that hired more than the per-department mean in `year`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepartmentsAboveMeanQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DepartmentHires {
    pub id: i32,
    pub department: String,
    pub hired: i64,
}

impl Request<Result<Vec<DepartmentHires>, ReportError>> for DepartmentsAboveMeanQuery {}

impl DepartmentsAboveMeanQuery {
    pub fn validate(&self) -> Result<i32, ReportError> {
        validate_year(self.year.unwrap_or(DEFAULT_REPORT_YEAR))
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: DepartmentsAboveMeanQuery,
) -> Result<Vec<DepartmentHires>, ReportError> {
    let year = query.validate()?;

    let rows = sqlx::query_as::<_, DepartmentHires>(
        r#"
        WITH hires AS (
            SELECT d.id, d.name, COUNT(*) AS hired
            FROM hired_employees e
            JOIN departments d ON d.id = e.department_id
            WHERE EXTRACT(YEAR FROM e.hired_at AT TIME ZONE 'UTC')::int = $1
            GROUP BY d.id, d.name
        )
        SELECT id, name AS department, hired
        FROM hires
        WHERE hired > (SELECT AVG(hired) FROM hires)
        ORDER BY hired DESC, id
        "#,
    )
    .bind(year)
    .fetch_all(&pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_departments_above_mean(pool: PgPool) -> sqlx::Result<()> {
        sqlx::raw_sql(
            r#"
            INSERT INTO departments (id, name) VALUES (1, 'Staff'), (2, 'Accounting'), (3, 'Legal');
            INSERT INTO hired_employees (id, name, hired_at, department_id, job_id) VALUES
                (1, 'A', '2021-01-15T10:00:00Z', 1, 1),
                (2, 'B', '2021-02-15T10:00:00Z', 1, 1),
                (3, 'C', '2021-08-15T10:00:00Z', 1, 1),
                (4, 'D', '2021-03-01T10:00:00Z', 2, 1),
                (5, 'E', '2021-04-01T10:00:00Z', 3, 1),
                (6, 'F', '2020-04-01T10:00:00Z', 3, 1),
                (7, 'G', '2020-05-01T10:00:00Z', 3, 1);
            "#,
        )
        .execute(&pool)
        .await?;

        // 2021 hires: Staff 3, Accounting 1, Legal 1; mean 5/3
        let rows = handle(pool.clone(), DepartmentsAboveMeanQuery::default())
            .await
            .unwrap();
        assert_eq!(
            rows,
            vec![DepartmentHires {
                id: 1,
                department: "Staff".to_string(),
                hired: 3,
            }]
        );

        let none = handle(pool.clone(), DepartmentsAboveMeanQuery { year: Some(2019) })
            .await
            .unwrap();
        assert!(none.is_empty());
        Ok(())
    }
}
