//! Structuring: pluggable, trait-based conversion of extracted resume text into a `CvDocument`.
//!
//! `LlmCvStructurer` asks the model for the resume JSON; `HeuristicCvStructurer` is pure Rust,
//! deterministic and used when no API key is configured.
//!
//! `AppState` holds an `Arc<dyn CvStructurer>`, chosen at startup via config.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::ingest::prompts::{
    CV_PARSE_PROMPT, CV_PARSE_SYSTEM, DEFAULT_ENHANCE_INSTRUCTIONS, ENHANCE_PROMPT, ENHANCE_SYSTEM,
};
use crate::ingest::text::{
    build_parse_request, clean_text, detect_sections, DetectedSection, HEADER_SECTION,
};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;
use crate::models::cv::{
    CvDocument, EducationEntry, ExperienceEntry, Person, ProjectEntry, SocialLink, SocialNetwork,
    TechnologyCategory,
};

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Turns raw resume text into a CV record. Implement this to swap backends without touching the
/// upload handler.
#[async_trait]
pub trait CvStructurer: Send + Sync {
    async fn structure(&self, text: &str) -> Result<CvDocument, AppError>;

    /// Backend name, logged and returned to callers.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmCvStructurer
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmCvStructurer(pub LlmClient);

#[async_trait]
impl CvStructurer for LlmCvStructurer {
    async fn structure(&self, text: &str) -> Result<CvDocument, AppError> {
        let prompt = CV_PARSE_PROMPT.replace("{resume_request}", &build_parse_request(text));
        let system = format!("{CV_PARSE_SYSTEM} {JSON_ONLY_SYSTEM}");
        let cv: CvDocument = self
            .0
            .call_json(&prompt, &system)
            .await
            .map_err(|e| AppError::Llm(format!("Failed to structure resume: {e}")))?;

        if cv.person.name.trim().is_empty() {
            return Err(AppError::UnprocessableEntity(
                "Could not find a name in the resume".to_string(),
            ));
        }

        info!(
            "LLM structured resume: {} experience, {} education, {} projects",
            cv.experience.len(),
            cv.education.len(),
            cv.projects.len()
        );
        Ok(cv)
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HeuristicCvStructurer
// ────────────────────────────────────────────────────────────────────────────

/// Rule-based structurer over the detected sections. No network, same input → same record.
///
/// Within experience, education and project sections a run of non-bullet lines opens an entry
/// and the bullets beneath it become highlights.
pub struct HeuristicCvStructurer;

#[async_trait]
impl CvStructurer for HeuristicCvStructurer {
    async fn structure(&self, text: &str) -> Result<CvDocument, AppError> {
        let cv = structure_heuristically(text);
        if cv.person.name.is_empty() {
            return Err(AppError::UnprocessableEntity(
                "Could not find a name in the resume".to_string(),
            ));
        }
        Ok(cv)
    }

    fn backend(&self) -> &'static str {
        "heuristic"
    }
}

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());
static PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\+?\d[\d\s().-]{7,}\d").unwrap());
static LINKEDIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:https?://)?(?:[a-z]{2,3}\.)?linkedin\.com/[^\s|,)]+").unwrap()
});
static GITHUB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:https?://)?(?:www\.)?github\.com/[^\s|,)]+").unwrap());
static WEB_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)https?://[^\s|,)]+").unwrap());
static DATE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    let month = r"(?:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+)?";
    Regex::new(&format!(
        r"(?i)\b({month}\d{{4}})\s*(?:-|–|—|to)\s*({month}\d{{4}}|present|current|now)\b"
    ))
    .unwrap()
});
static GPA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bGPA\b[:\s]*([\d.]+(?:\s*/\s*[\d.]+)?)").unwrap());

const DEFAULT_SKILL_LABEL: &str = "Skills";

fn structure_heuristically(text: &str) -> CvDocument {
    let cleaned = clean_text(text);
    let sections = detect_sections(&cleaned);
    let section = |name: &str| section_text(&sections, name);

    let contact_text = [section(HEADER_SECTION), section("contact")].join("\n");
    let person = person_from(&contact_text, &cleaned);

    let summary = section("summary")
        .lines()
        .map(strip_bullet)
        .collect::<Vec<_>>()
        .join(" ");
    let summary = if summary.trim().is_empty() {
        Vec::new()
    } else {
        vec![summary]
    };

    let cv = CvDocument {
        person,
        summary,
        experience: blocks(section("experience"))
            .iter()
            .map(experience_from)
            .collect(),
        education: blocks(section("education"))
            .iter()
            .map(education_from)
            .collect(),
        skills: skills_from(section("skills")),
        projects: blocks(section("projects")).iter().map(project_from).collect(),
        certifications: section("certifications")
            .lines()
            .map(strip_bullet)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
    };

    debug!(
        "Heuristic structuring found sections {:?}",
        sections.iter().map(|s| s.name).collect::<Vec<_>>()
    );
    cv
}

fn section_text<'a>(sections: &'a [DetectedSection], name: &str) -> &'a str {
    sections
        .iter()
        .find(|s| s.name == name)
        .map(|s| s.text.as_str())
        .unwrap_or("")
}

fn person_from(contact_text: &str, full_text: &str) -> Person {
    let name = contact_text
        .lines()
        .chain(full_text.lines())
        .map(str::trim)
        .find(|l| looks_like_name(l))
        .unwrap_or("")
        .to_string();

    let email = EMAIL.find(full_text).map(|m| m.as_str().to_string());
    let phone = PHONE
        .find(contact_text)
        .map(|m| m.as_str().trim().to_string());
    let linkedin = LINKEDIN
        .find(full_text)
        .and_then(|m| SocialLink::from_profile(SocialNetwork::LinkedIn, m.as_str()));
    let github = GITHUB
        .find(full_text)
        .and_then(|m| SocialLink::from_profile(SocialNetwork::GitHub, m.as_str()));
    let website = WEB_URL
        .find_iter(full_text)
        .map(|m| m.as_str())
        .find(|url| !LINKEDIN.is_match(url) && !GITHUB.is_match(url))
        .map(str::to_string);

    Person {
        name,
        phone,
        email,
        website,
        linkedin,
        github,
    }
}

fn looks_like_name(line: &str) -> bool {
    !line.is_empty()
        && !line.starts_with('-')
        && !line.contains('@')
        && !line.contains("://")
        && !line.chars().any(|c| c.is_ascii_digit())
        && line.split_whitespace().count() <= 5
}

/// A run of non-bullet lines and the bullets that follow it.
#[derive(Debug, Default)]
struct Block<'a> {
    heads: Vec<&'a str>,
    bullets: Vec<&'a str>,
}

fn blocks(text: &str) -> Vec<Block<'_>> {
    let mut blocks: Vec<Block> = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let is_bullet = line.starts_with('-') || line.starts_with('*');
        match blocks.last_mut() {
            Some(block) if is_bullet => block.bullets.push(strip_bullet(line)),
            Some(block) if block.bullets.is_empty() => block.heads.push(line),
            _ if is_bullet => blocks.push(Block {
                bullets: vec![strip_bullet(line)],
                ..Default::default()
            }),
            _ => blocks.push(Block {
                heads: vec![line],
                ..Default::default()
            }),
        }
    }
    blocks
}

fn strip_bullet(line: &str) -> &str {
    line.trim()
        .trim_start_matches(['-', '*'])
        .trim_start()
}

/// Removes a date range from `line`, returning the remainder and the range as written.
fn take_date_range(line: &str) -> (String, Option<String>) {
    match DATE_RANGE.find(line) {
        Some(m) => {
            let rest = format!("{}{}", &line[..m.start()], &line[m.end()..]);
            let rest = rest
                .trim_matches(|c: char| c.is_whitespace() || matches!(c, '|' | ',' | '-' | '–'))
                .to_string();
            (rest, Some(m.as_str().to_string()))
        }
        None => (line.to_string(), None),
    }
}

fn split_heading(line: &str) -> (String, Option<String>) {
    let split = line.split_once(" | ").or_else(|| line.split_once(", "));
    match split {
        Some((first, second)) => (first.trim().to_string(), Some(second.trim().to_string())),
        None => (line.trim().to_string(), None),
    }
}

fn experience_from(block: &Block) -> ExperienceEntry {
    let mut entry = ExperienceEntry {
        highlights: block.bullets.iter().map(|b| b.to_string()).collect(),
        ..Default::default()
    };

    for (i, head) in block.heads.iter().enumerate() {
        let (rest, date) = take_date_range(head);
        if entry.date.is_none() {
            entry.date = date;
        }
        if rest.is_empty() {
            continue;
        }
        if i == 0 {
            let (company, position) = split_heading(&rest);
            entry.company = company;
            entry.position = position.unwrap_or_default();
        } else if entry.position.is_empty() {
            entry.position = rest;
        } else if entry.location.is_none() {
            entry.location = Some(rest);
        } else {
            entry.highlights.push(rest);
        }
    }
    entry
}

fn education_from(block: &Block) -> EducationEntry {
    let mut entry = EducationEntry::default();

    for (i, head) in block.heads.iter().enumerate() {
        if let Some(gpa) = GPA.captures(head) {
            entry.gpa = Some(gpa[1].to_string());
            continue;
        }
        let (rest, date) = take_date_range(head);
        if entry.date.is_none() {
            entry.date = date;
        }
        if rest.is_empty() {
            continue;
        }
        if i == 0 {
            entry.institution = rest;
        } else if entry.degree.is_none() {
            match rest.split_once(" in ") {
                Some((degree, area)) => {
                    entry.degree = Some(degree.trim().to_string());
                    entry.area = Some(area.trim().to_string());
                }
                None => entry.degree = Some(rest),
            }
        } else if entry.location.is_none() {
            entry.location = Some(rest);
        } else {
            entry.highlights.push(rest);
        }
    }

    for bullet in &block.bullets {
        match GPA.captures(bullet) {
            Some(gpa) if entry.gpa.is_none() => entry.gpa = Some(gpa[1].to_string()),
            _ => entry.highlights.push(bullet.to_string()),
        }
    }
    entry
}

fn project_from(block: &Block) -> ProjectEntry {
    let mut entry = ProjectEntry::default();
    for (i, head) in block.heads.iter().enumerate() {
        let (rest, date) = take_date_range(head);
        if entry.date.is_none() {
            entry.date = date;
        }
        if i == 0 {
            entry.name = rest;
        } else if !rest.is_empty() {
            entry.highlights.push(rest);
        }
    }
    entry
        .highlights
        .extend(block.bullets.iter().map(|b| b.to_string()));
    entry
}

/// `Label: a, b` lines become categories; unlabelled lines feed a default category.
fn skills_from(text: &str) -> Vec<TechnologyCategory> {
    let mut categories: Vec<TechnologyCategory> = Vec::new();
    for line in text.lines().map(strip_bullet).filter(|l| !l.is_empty()) {
        let (label, items) = match line.split_once(':') {
            Some((label, items)) if !label.trim().is_empty() => (label.trim(), items),
            _ => (DEFAULT_SKILL_LABEL, line),
        };
        let details = items
            .split([',', ';'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        match categories.iter_mut().find(|c| c.label == label) {
            Some(category) => category.details.extend(details),
            None => categories.push(TechnologyCategory {
                label: label.to_string(),
                details: details.collect(),
            }),
        }
    }
    categories.retain(|c| !c.details.is_empty());
    categories
}

// ────────────────────────────────────────────────────────────────────────────
// Section enhancement
// ────────────────────────────────────────────────────────────────────────────

/// Rewrites one resume section with the LLM. Blank content is rejected before any call.
pub async fn enhance_section(
    llm: &LlmClient,
    section_name: &str,
    content: &str,
    instructions: Option<&str>,
) -> Result<String, AppError> {
    if content.trim().is_empty() {
        return Err(AppError::Validation("Content is required".to_string()));
    }
    let instructions = instructions
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_ENHANCE_INSTRUCTIONS);

    let prompt = ENHANCE_PROMPT
        .replace("{section_name}", section_name)
        .replace("{content}", content)
        .replace("{instructions}", instructions);

    let enhanced = llm
        .call_text(&prompt, ENHANCE_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Failed to enhance section '{section_name}': {e}")))?;

    Ok(enhanced.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Jane Doe
jane@example.com | +1 555 0100 | linkedin.com/in/janedoe | https://github.com/jdoe
Summary
Platform engineer focused on reliability.
Experience
Acme Corp, Senior Engineer | Jan 2020 - Present
• Led the storage migration
• Cut p99 latency by 40%
Globex | 2016 - 2019
Software Engineer
• Built billing services
Education
State University
B.S. in Computer Science
GPA: 3.8/4.0
Skills
Languages: Rust, Go, Python
Tools: Docker, Kubernetes
Certifications
• AWS Solutions Architect
";

    #[tokio::test]
    async fn test_heuristic_extracts_contact_details() {
        let cv = HeuristicCvStructurer.structure(RESUME).await.unwrap();
        let person = &cv.person;
        assert_eq!(person.name, "Jane Doe");
        assert_eq!(person.email.as_deref(), Some("jane@example.com"));
        assert_eq!(person.phone.as_deref(), Some("+1 555 0100"));
        assert_eq!(person.linkedin.as_ref().unwrap().username, "janedoe");
        assert_eq!(person.github.as_ref().unwrap().username, "jdoe");
        assert_eq!(person.website, None);
    }

    #[tokio::test]
    async fn test_heuristic_groups_experience_entries() {
        let cv = HeuristicCvStructurer.structure(RESUME).await.unwrap();
        assert_eq!(cv.experience.len(), 2);

        let acme = &cv.experience[0];
        assert_eq!(acme.company, "Acme Corp");
        assert_eq!(acme.position, "Senior Engineer");
        assert_eq!(acme.date.as_deref(), Some("Jan 2020 - Present"));
        assert_eq!(
            acme.highlights,
            vec!["Led the storage migration", "Cut p99 latency by 40%"]
        );

        let globex = &cv.experience[1];
        assert_eq!(globex.company, "Globex");
        assert_eq!(globex.position, "Software Engineer");
        assert_eq!(globex.date.as_deref(), Some("2016 - 2019"));
    }

    #[tokio::test]
    async fn test_heuristic_reads_education_and_lists() {
        let cv = HeuristicCvStructurer.structure(RESUME).await.unwrap();

        let edu = &cv.education[0];
        assert_eq!(edu.institution, "State University");
        assert_eq!(edu.degree.as_deref(), Some("B.S."));
        assert_eq!(edu.area.as_deref(), Some("Computer Science"));
        assert_eq!(edu.gpa.as_deref(), Some("3.8/4.0"));

        assert_eq!(cv.summary, vec!["Platform engineer focused on reliability."]);
        assert_eq!(cv.skills.len(), 2);
        assert_eq!(cv.skills[0].label, "Languages");
        assert_eq!(cv.skills[0].details, vec!["Rust", "Go", "Python"]);
        assert_eq!(cv.certifications, vec!["AWS Solutions Architect"]);
    }

    #[tokio::test]
    async fn test_heuristic_is_deterministic() {
        let first = HeuristicCvStructurer.structure(RESUME).await.unwrap();
        let second = HeuristicCvStructurer.structure(RESUME).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_heuristic_without_name_is_unprocessable() {
        let result = HeuristicCvStructurer.structure("2019\n+1 555 0100\n").await;
        assert!(matches!(result, Err(AppError::UnprocessableEntity(_))));
    }

    #[test]
    fn test_unlabelled_skills_use_default_category() {
        let skills = skills_from("Rust, Go\n- SQL");
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].label, "Skills");
        assert_eq!(skills[0].details, vec!["Rust", "Go", "SQL"]);
    }

    #[test]
    fn test_take_date_range_strips_separators() {
        let (rest, date) = take_date_range("Globex | Mar 2016 – Dec 2019");
        assert_eq!(rest, "Globex");
        assert_eq!(date.as_deref(), Some("Mar 2016 – Dec 2019"));
    }

    #[tokio::test]
    async fn test_enhance_rejects_blank_content() {
        let llm = LlmClient::new("test-key".to_string());
        let result = enhance_section(&llm, "summary", "   \n", None).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
