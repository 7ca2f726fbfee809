use anyhow::{bail, Context, Result};

/// Which backend turns uploaded resume text into a CV record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructurerKind {
    Llm,
    Heuristic,
}

impl StructurerKind {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "llm" => Ok(StructurerKind::Llm),
            "heuristic" => Ok(StructurerKind::Heuristic),
            other => bail!("CV_STRUCTURER must be 'llm' or 'heuristic', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    /// Without a key, structuring falls back to the heuristic backend and enhancement is off.
    pub anthropic_api_key: Option<String>,
    pub structurer: StructurerKind,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let anthropic_api_key = optional_env("ANTHROPIC_API_KEY");
        let structurer = match optional_env("CV_STRUCTURER") {
            Some(value) => StructurerKind::parse(&value)?,
            None if anthropic_api_key.is_some() => StructurerKind::Llm,
            None => StructurerKind::Heuristic,
        };
        if structurer == StructurerKind::Llm && anthropic_api_key.is_none() {
            bail!("CV_STRUCTURER=llm requires ANTHROPIC_API_KEY");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key,
            structurer,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structurer_kind_parses_case_insensitively() {
        assert_eq!(StructurerKind::parse("LLM").unwrap(), StructurerKind::Llm);
        assert_eq!(
            StructurerKind::parse(" heuristic ").unwrap(),
            StructurerKind::Heuristic
        );
    }

    #[test]
    fn test_unknown_structurer_is_rejected() {
        let err = StructurerKind::parse("regex").unwrap_err();
        assert!(err.to_string().contains("'regex'"));
    }
}
