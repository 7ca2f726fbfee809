use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::ingest::structurer::enhance_section;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EnhanceRequest {
    pub section_name: String,
    pub content: String,
    #[serde(default)]
    pub instructions: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EnhanceResponse {
    pub section: String,
    pub original: String,
    pub enhanced: String,
}

/// POST /api/v1/ai/enhance
pub async fn handle_enhance(
    State(state): State<AppState>,
    Json(req): Json<EnhanceRequest>,
) -> Result<Json<EnhanceResponse>, AppError> {
    if req.content.trim().is_empty() {
        return Err(AppError::Validation("Content is required".to_string()));
    }
    let llm = state.llm.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Section enhancement needs ANTHROPIC_API_KEY".to_string())
    })?;

    let enhanced = enhance_section(
        llm,
        &req.section_name,
        &req.content,
        req.instructions.as_deref(),
    )
    .await?;

    Ok(Json(EnhanceResponse {
        section: req.section_name,
        original: req.content,
        enhanced,
    }))
}
