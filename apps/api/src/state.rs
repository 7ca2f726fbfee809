use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::ingest::structurer::CvStructurer;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    /// Present only when an Anthropic key is configured.
    pub llm: Option<LlmClient>,
    pub config: Config,
    /// Pluggable structurer. `LlmCvStructurer` with a key, `HeuristicCvStructurer` otherwise.
    pub structurer: Arc<dyn CvStructurer>,
}
