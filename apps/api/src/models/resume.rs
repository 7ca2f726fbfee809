use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::cv::CvDocument;

/// A stored resume: the CV record plus the artifacts of its last render.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub cv_data: Value,
    pub markdown: Option<String>,
    pub yaml_content: Option<String>,
    pub s3_markdown_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List view without the record body.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeSummaryRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub rendered: bool,
    pub updated_at: DateTime<Utc>,
}

/// Encodes a record as `cv_data` column text. The column is plain `JSON`, which keeps the text as
/// written, so the order of technology categories survives storage.
pub fn encode_cv(cv: &CvDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string(cv)
}

impl ResumeRow {
    /// Decodes the stored JSON as a CV record.
    pub fn cv(&self) -> Result<CvDocument, serde_json::Error> {
        serde_json::from_value(self.cv_data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cv::TechnologyCategory;
    use serde_json::json;

    fn row(cv_data: Value) -> ResumeRow {
        ResumeRow {
            id: Uuid::new_v4(),
            username: "jsmith".to_string(),
            email: "john@example.com".to_string(),
            cv_data,
            markdown: None,
            yaml_content: None,
            s3_markdown_key: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_cv_decodes_stored_json() {
        let cv = row(json!({"name": "John Smith", "skills": {"Languages": ["Rust"]}}))
            .cv()
            .unwrap();
        assert_eq!(cv.person.name, "John Smith");
        assert_eq!(cv.skills[0].details, vec!["Rust"]);
    }

    #[test]
    fn test_skills_order_survives_storage() {
        let mut cv = CvDocument::default();
        cv.person.name = "Ada".to_string();
        for label in ["Zeta", "Alpha", "Mid"] {
            cv.skills.push(TechnologyCategory {
                label: label.to_string(),
                details: vec![label.to_lowercase()],
            });
        }

        let stored: Value = serde_json::from_str(&encode_cv(&cv).unwrap()).unwrap();
        let labels: Vec<String> = row(stored)
            .cv()
            .unwrap()
            .skills
            .into_iter()
            .map(|c| c.label)
            .collect();
        assert_eq!(labels, vec!["Zeta", "Alpha", "Mid"]);

        let value = serde_json::to_value(&cv).unwrap();
        assert_eq!(row(value).cv().unwrap(), cv);
    }

    #[test]
    fn test_cv_rejects_wrong_shape() {
        assert!(row(json!(["not", "an", "object"])).cv().is_err());
    }
}
