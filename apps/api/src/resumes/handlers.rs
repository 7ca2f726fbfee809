use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ingest::pdf::extract_text;
use crate::models::cv::CvDocument;
use crate::models::resume::{encode_cv, ResumeRow, ResumeSummaryRow};
use crate::render::handlers::require_name;
use crate::render::{render_markdown, to_rendercv_yaml};
use crate::resumes::snapshot::upload_markdown;
use crate::resumes::store::{
    get_resume, insert_resume, list_resumes, record_render, update_cv_data, RenderArtifacts,
};
use crate::state::AppState;

/// Upload size cap for resume PDFs.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=50;
const FILE_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub resume: ResumeRow,
    pub structurer: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub id: Uuid,
    pub markdown: String,
    pub yaml_content: String,
    pub s3_markdown_key: String,
}

/// POST /api/v1/resumes/upload?username=&email=
///
/// Multipart upload of a resume PDF in the `file` field. The text is extracted, structured into a
/// CV record and stored.
pub async fn handle_upload(
    State(state): State<AppState>,
    Query(owner): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    validate_owner(&owner)?;

    let mut pdf = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some(FILE_FIELD) {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
            pdf = Some(data);
            break;
        }
    }
    let pdf = pdf.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;

    let text = extract_text(pdf).await?;
    let cv = state.structurer.structure(&text).await?;
    let cv_data = encode_cv(&cv).map_err(|e| AppError::Internal(e.into()))?;

    let resume = insert_resume(&state.db, owner.username.trim(), owner.email.trim(), &cv_data).await?;
    info!(
        "Resume {} created from upload via {} structurer",
        resume.id,
        state.structurer.backend()
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            resume,
            structurer: state.structurer.backend(),
        }),
    ))
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResumeSummaryRow>>, AppError> {
    Ok(Json(list_resumes(&state.db).await?))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeRow>, AppError> {
    let resume = get_resume(&state.db, id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(resume))
}

/// PUT /api/v1/resumes/:id
///
/// Replaces the stored record. Previous render output is discarded.
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(cv): Json<CvDocument>,
) -> Result<Json<ResumeRow>, AppError> {
    require_name(&cv)?;
    let cv_data = encode_cv(&cv).map_err(|e| AppError::Internal(e.into()))?;
    let resume = update_cv_data(&state.db, id, &cv_data)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(resume))
}

/// POST /api/v1/resumes/:id/render
///
/// Renders markdown and RenderCV YAML, snapshots the markdown to S3 and stores both.
pub async fn handle_render_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RenderResponse>, AppError> {
    let resume = get_resume(&state.db, id).await?.ok_or_else(|| not_found(id))?;
    let cv = resume.cv().map_err(|e| {
        AppError::UnprocessableEntity(format!("Stored record for resume {id} is invalid: {e}"))
    })?;

    let markdown = render_markdown(&cv);
    let yaml_content = to_rendercv_yaml(&cv)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize RenderCV YAML: {e}")))?;

    let s3_markdown_key = upload_markdown(&state.s3, &state.config.s3_bucket, id, &markdown)
        .await
        .map_err(|e| AppError::S3(e.to_string()))?;

    record_render(
        &state.db,
        id,
        RenderArtifacts {
            markdown: &markdown,
            yaml_content: &yaml_content,
            s3_markdown_key: &s3_markdown_key,
        },
    )
    .await?
    .ok_or_else(|| not_found(id))?;

    Ok(Json(RenderResponse {
        id,
        markdown,
        yaml_content,
        s3_markdown_key,
    }))
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Resume {id} not found"))
}

fn validate_owner(owner: &UploadQuery) -> Result<(), AppError> {
    let username_len = owner.username.trim().chars().count();
    if !USERNAME_LEN.contains(&username_len) {
        return Err(AppError::Validation(format!(
            "username must be between {} and {} characters",
            USERNAME_LEN.start(),
            USERNAME_LEN.end()
        )));
    }
    let email = owner.email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AppError::Validation(format!("invalid email address: {email}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(username: &str, email: &str) -> UploadQuery {
        UploadQuery {
            username: username.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn test_valid_owner_passes() {
        assert!(validate_owner(&owner("jsmith", "john@example.com")).is_ok());
    }

    #[test]
    fn test_username_length_bounds() {
        assert!(validate_owner(&owner("ab", "a@b.io")).is_err());
        assert!(validate_owner(&owner("abc", "a@b.io")).is_ok());
        assert!(validate_owner(&owner(&"x".repeat(50), "a@b.io")).is_ok());
        assert!(validate_owner(&owner(&"x".repeat(51), "a@b.io")).is_err());
    }

    #[test]
    fn test_email_must_have_domain() {
        assert!(matches!(
            validate_owner(&owner("jsmith", "john")),
            Err(AppError::Validation(_))
        ));
        assert!(validate_owner(&owner("jsmith", "@example.com")).is_err());
        assert!(validate_owner(&owner("jsmith", "john@localhost")).is_err());
    }
}
