use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::resume::{ResumeRow, ResumeSummaryRow};

pub async fn insert_resume(
    pool: &PgPool,
    username: &str,
    email: &str,
    cv_data: &str,
) -> Result<ResumeRow, sqlx::Error> {
    let row = sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes (id, username, email, cv_data)
        VALUES ($1, $2, $3, $4::json)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(cv_data)
    .fetch_one(pool)
    .await?;

    info!("Stored resume {} for {}", row.id, row.username);
    Ok(row)
}

pub async fn get_resume(pool: &PgPool, id: Uuid) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Most recently updated first.
pub async fn list_resumes(pool: &PgPool) -> Result<Vec<ResumeSummaryRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeSummaryRow>(
        r#"
        SELECT id, username, email, markdown IS NOT NULL AS rendered, updated_at
        FROM resumes
        ORDER BY updated_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Replaces the record. Rendered artifacts describe the old record, so they are cleared.
pub async fn update_cv_data(
    pool: &PgPool,
    id: Uuid,
    cv_data: &str,
) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>(
        r#"
        UPDATE resumes
        SET cv_data = $2::json,
            markdown = NULL,
            yaml_content = NULL,
            s3_markdown_key = NULL,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(cv_data)
    .fetch_optional(pool)
    .await
}

pub struct RenderArtifacts<'a> {
    pub markdown: &'a str,
    pub yaml_content: &'a str,
    pub s3_markdown_key: &'a str,
}

pub async fn record_render(
    pool: &PgPool,
    id: Uuid,
    artifacts: RenderArtifacts<'_>,
) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>(
        r#"
        UPDATE resumes
        SET markdown = $2,
            yaml_content = $3,
            s3_markdown_key = $4,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(artifacts.markdown)
    .bind(artifacts.yaml_content)
    .bind(artifacts.s3_markdown_key)
    .fetch_optional(pool)
    .await
}
