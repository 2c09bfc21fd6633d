use async_trait::async_trait;
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use super::{CompanyJobCount, Document, Filter, JobStore, StoreError, StoredJob};

/// Job documents stored as JSONB rows in the `job_posts` table.
/// `seq` preserves insertion order for "first match" semantics.
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct JobRow {
    id: Uuid,
    doc: Value,
}

impl TryFrom<JobRow> for StoredJob {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        match row.doc {
            Value::Object(doc) => Ok(StoredJob { id: row.id, doc }),
            other => Err(StoreError::Corrupt(format!(
                "job {} holds a non-object payload: {other}",
                row.id
            ))),
        }
    }
}

#[derive(Debug, FromRow)]
struct CompanyRow {
    company_name: Value,
    job_count: i64,
}

/// Appends the SQL predicate for `filter`, binding its operands.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    match filter {
        Filter::Eq { field, value } => {
            // A missing key compares as JSON null, matching `Filter::matches`.
            builder.push("COALESCE(doc -> ");
            builder.push_bind(field.clone());
            builder.push(", 'null'::jsonb) = ");
            builder.push_bind(value.clone());
        }
        Filter::Range { field, min, max } => {
            builder.push("CASE WHEN jsonb_typeof(doc -> ");
            builder.push_bind(field.clone());
            builder.push(") = 'number' THEN (doc ->> ");
            builder.push_bind(field.clone());
            builder.push(")::float8 END BETWEEN ");
            builder.push_bind(*min);
            builder.push(" AND ");
            builder.push_bind(*max);
        }
    }
}

/// `WHERE` subquery selecting the id of the first document matching `filter`.
fn push_first_match(builder: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    builder.push(" WHERE id = (SELECT id FROM job_posts WHERE ");
    push_filter(builder, filter);
    builder.push(" ORDER BY seq LIMIT 1)");
}

fn select_query(filter: &Filter, limit_one: bool) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT id, doc FROM job_posts WHERE ");
    push_filter(&mut builder, filter);
    builder.push(" ORDER BY seq");
    if limit_one {
        builder.push(" LIMIT 1");
    }
    builder
}

fn count_by_company_query(filter: &Filter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(
        "SELECT COALESCE(doc -> 'company_name', 'null'::jsonb) AS company_name, \
         COUNT(*) AS job_count FROM job_posts WHERE ",
    );
    push_filter(&mut builder, filter);
    builder.push(" GROUP BY 1 ORDER BY job_count DESC");
    builder
}

#[async_trait]
impl JobStore for PgJobStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_one(&self, doc: Document) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO job_posts (id, doc) VALUES ($1, $2)")
            .bind(id)
            .bind(Value::Object(doc))
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<StoredJob>, StoreError> {
        let row = select_query(filter, true)
            .build_query_as::<JobRow>()
            .fetch_optional(&self.pool)
            .await?;
        row.map(StoredJob::try_from).transpose()
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<StoredJob>, StoreError> {
        select_query(filter, false)
            .build_query_as::<JobRow>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(StoredJob::try_from)
            .collect()
    }

    async fn replace_one(&self, filter: &Filter, doc: Document) -> Result<bool, StoreError> {
        let mut builder = QueryBuilder::new("UPDATE job_posts SET doc = ");
        builder.push_bind(Value::Object(doc));
        push_first_match(&mut builder, filter);
        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_one(&self, filter: &Filter) -> Result<bool, StoreError> {
        let mut builder = QueryBuilder::new("DELETE FROM job_posts");
        push_first_match(&mut builder, filter);
        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_by_company(&self, filter: &Filter) -> Result<Vec<CompanyJobCount>, StoreError> {
        let rows = count_by_company_query(filter)
            .build_query_as::<CompanyRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| CompanyJobCount {
                company_name: row.company_name,
                job_count: row.job_count,
            })
            .collect())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_select_by_eq_sql() {
        let builder = select_query(&Filter::eq("id", 3), true);
        assert_eq!(
            builder.sql(),
            "SELECT id, doc FROM job_posts WHERE COALESCE(doc -> $1, 'null'::jsonb) = $2 \
             ORDER BY seq LIMIT 1"
        );
    }

    #[test]
    fn test_select_by_range_sql_guards_non_numbers() {
        let builder = select_query(&Filter::range("average_salary", 0.0, f64::INFINITY), false);
        assert_eq!(
            builder.sql(),
            "SELECT id, doc FROM job_posts WHERE CASE WHEN jsonb_typeof(doc -> $1) = 'number' \
             THEN (doc ->> $2)::float8 END BETWEEN $3 AND $4 ORDER BY seq"
        );
    }

    #[test]
    fn test_delete_targets_first_match_only() {
        let mut builder = QueryBuilder::new("DELETE FROM job_posts");
        push_first_match(&mut builder, &Filter::eq("title", "Engineer"));
        assert_eq!(
            builder.sql(),
            "DELETE FROM job_posts WHERE id = (SELECT id FROM job_posts WHERE \
             COALESCE(doc -> $1, 'null'::jsonb) = $2 ORDER BY seq LIMIT 1)"
        );
    }

    #[test]
    fn test_count_by_company_sql() {
        let builder = count_by_company_query(&Filter::eq("industry", "Tech"));
        assert!(builder.sql().ends_with(
            "WHERE COALESCE(doc -> $1, 'null'::jsonb) = $2 GROUP BY 1 ORDER BY job_count DESC"
        ));
    }

    #[test]
    fn test_non_object_row_is_corrupt() {
        let row = JobRow {
            id: Uuid::new_v4(),
            doc: json!([1, 2, 3]),
        };
        assert!(matches!(
            StoredJob::try_from(row),
            Err(StoreError::Corrupt(_))
        ));
    }
}
