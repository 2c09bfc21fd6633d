use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to PostgreSQL")?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the job document table and its index if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS job_posts (
            seq BIGSERIAL,
            id  UUID PRIMARY KEY,
            doc JSONB NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("failed to create job_posts table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS job_posts_doc_idx ON job_posts USING GIN (doc)")
        .execute(pool)
        .await
        .context("failed to create job_posts doc index")?;

    info!("job_posts schema ready");
    Ok(())
}
