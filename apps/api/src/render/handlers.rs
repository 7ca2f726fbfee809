//! Axum route handlers for stateless rendering.

use axum::{
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::errors::AppError;
use crate::models::cv::CvDocument;
use crate::render::{parse_markdown, render_markdown, to_rendercv_yaml};

const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";
const YAML_CONTENT_TYPE: &str = "application/yaml";

/// POST /api/v1/render/markdown
///
/// Renders a CV record to markdown.
pub async fn handle_render_markdown(Json(cv): Json<CvDocument>) -> Result<Response, AppError> {
    require_name(&cv)?;
    let markdown = render_markdown(&cv);
    Ok(([(header::CONTENT_TYPE, MARKDOWN_CONTENT_TYPE)], markdown).into_response())
}

/// POST /api/v1/render/rendercv
///
/// Exports a CV record as a RenderCV input file.
pub async fn handle_render_rendercv(Json(cv): Json<CvDocument>) -> Result<Response, AppError> {
    require_name(&cv)?;
    let yaml = to_rendercv_yaml(&cv)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize RenderCV YAML: {e}")))?;
    Ok(([(header::CONTENT_TYPE, YAML_CONTENT_TYPE)], yaml).into_response())
}

/// POST /api/v1/render/parse
///
/// Reads a rendered markdown document (raw request body) back into a CV record.
pub async fn handle_parse_markdown(body: String) -> Result<Json<CvDocument>, AppError> {
    let cv = parse_markdown(&body).map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;
    Ok(Json(cv))
}

pub(crate) fn require_name(cv: &CvDocument) -> Result<(), AppError> {
    if cv.person.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    Ok(())
}
