//! Cleanup and sectioning of text extracted from resume PDFs.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::ingest::prompts::PARSE_REQUEST_TEMPLATE;

static TRIPLE_BLANK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n").unwrap());
static DOUBLE_BLANK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());
static HORIZONTAL_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static PADDED_NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]*\n[ \t]*").unwrap());
static PAGE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(Page \d+|\d+)$").unwrap());

const BULLET_GLYPHS: &[char] = &['•', '◦', '▪', '○'];

/// Headers longer than this are treated as content.
const MAX_HEADER_LEN: usize = 50;

/// Section keys with the words that open them, checked in order.
const SECTION_KEYWORDS: &[(&str, &str)] = &[
    ("contact", "contact|personal info"),
    ("summary", "summary|objective|profile|about"),
    ("experience", "experience|employment|work|career|professional"),
    ("education", "education|academic|qualifications?|degrees?"),
    ("skills", "skills|competencies|technical|technologies"),
    ("projects", "projects|portfolio"),
    ("certifications", "certifications?|certificates?|credentials?"),
    ("achievements", "achievements?|awards?|honou?rs?|accomplishments?"),
    ("volunteer", "volunteer|community|service"),
    ("languages", "languages?"),
    ("interests", "interests|hobbies"),
];

static SECTION_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    SECTION_KEYWORDS
        .iter()
        .map(|(key, words)| {
            let pattern = format!(r"(?i)^\W*({words})\b");
            (*key, Regex::new(&pattern).unwrap())
        })
        .collect()
});

/// Key for lines that appear before the first recognised header.
pub const HEADER_SECTION: &str = "header";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedSection {
    pub name: &'static str,
    pub text: String,
}

/// Normalises whitespace, turns bullet glyphs into `- ` and drops page numbers and stray
/// one-character lines.
pub fn clean_text(text: &str) -> String {
    let text = text.replace(BULLET_GLYPHS, "- ");
    let text = TRIPLE_BLANK.replace_all(&text, "\n\n");
    let text = DOUBLE_BLANK.replace_all(&text, "\n\n");
    let text = HORIZONTAL_RUNS.replace_all(&text, " ");
    let text = PADDED_NEWLINE.replace_all(&text, "\n");

    text.lines()
        .map(str::trim)
        .filter(|line| !PAGE_NUMBER.is_match(line))
        .filter(|line| line.chars().count() >= 2)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splits cleaned text into sections by recognising short header lines.
///
/// Sections are returned in first-seen order; a header seen twice appends to the earlier section.
pub fn detect_sections(text: &str) -> Vec<DetectedSection> {
    let mut sections: Vec<(&'static str, Vec<&str>)> = Vec::new();
    let mut current = HEADER_SECTION;

    for line in text.lines().map(str::trim) {
        if let Some(name) = section_header(line) {
            current = name;
            if !sections.iter().any(|(n, _)| *n == name) {
                sections.push((name, Vec::new()));
            }
            continue;
        }
        if line.is_empty() {
            continue;
        }
        match sections.iter_mut().find(|(n, _)| *n == current) {
            Some((_, lines)) => lines.push(line),
            None => sections.push((current, vec![line])),
        }
    }

    sections
        .into_iter()
        .filter(|(_, lines)| !lines.is_empty())
        .map(|(name, lines)| DetectedSection {
            name,
            text: lines.join("\n"),
        })
        .collect()
}

/// Returns the section key when `line` reads like a section header.
pub fn section_header(line: &str) -> Option<&'static str> {
    let line = line.trim();
    if line.is_empty()
        || line.chars().count() >= MAX_HEADER_LEN
        || line.starts_with("- ")
        || line.ends_with('.')
        || line.trim_end_matches(':').contains(':')
    {
        return None;
    }
    SECTION_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(line))
        .map(|(key, _)| *key)
}

/// Builds the resume portion of the structuring prompt: the cleaned text followed by the
/// sections detected in it.
pub fn build_parse_request(raw_text: &str) -> String {
    let cleaned = clean_text(raw_text);
    let detected = detect_sections(&cleaned)
        .iter()
        .map(|s| format!("{}:\n{}", s.name.to_uppercase(), s.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    PARSE_REQUEST_TEMPLATE
        .replace("{cleaned_text}", &cleaned)
        .replace("{detected_sections}", &detected)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTRACTED: &str = "John Smith\n\n\n\njohn@example.com   |  +1 555 0100\n\
        Page 1\n\
        SUMMARY\n\
        Backend engineer   with\t\tten years of experience.\n\
        \n\
        Experience\n\
        Acme Corp\n\
        • Built the billing pipeline\n\
        ▪ Cut latency by 40%\n\
        3\n\
        x\n\
        Technical Skills\n\
        Languages: Rust, Go\n";

    #[test]
    fn test_clean_text_normalises_whitespace_and_bullets() {
        let cleaned = clean_text(EXTRACTED);
        assert!(cleaned.contains("john@example.com | +1 555 0100"));
        assert!(cleaned.contains("Backend engineer with ten years of experience."));
        assert!(cleaned.contains("- Built the billing pipeline"));
        assert!(cleaned.contains("- Cut latency by 40%"));
    }

    #[test]
    fn test_clean_text_drops_page_numbers_and_fragments() {
        let cleaned = clean_text(EXTRACTED);
        assert!(!cleaned.lines().any(|l| l == "Page 1" || l == "3" || l == "x"));
        assert!(!cleaned.contains("\n\n"));
    }

    #[test]
    fn test_detect_sections_in_order() {
        let sections = detect_sections(&clean_text(EXTRACTED));
        let names: Vec<_> = sections.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["header", "summary", "experience", "skills"]);
        assert!(sections[0].text.starts_with("John Smith"));
        assert_eq!(sections[3].text, "Languages: Rust, Go");
    }

    #[test]
    fn test_header_detection_rejects_sentences_and_bullets() {
        assert_eq!(section_header("WORK HISTORY"), Some("experience"));
        assert_eq!(section_header("Certifications"), Some("certifications"));
        assert_eq!(section_header("- Work on the platform team"), None);
        assert_eq!(section_header("Worked on distributed storage."), None);
        assert_eq!(section_header("Workshop organiser"), None);
        assert_eq!(
            section_header("Experience leading a very large team across many time zones"),
            None
        );
    }

    #[test]
    fn test_repeated_header_appends_to_section() {
        let sections = detect_sections("Projects\nalpha\nSkills\nRust\nProjects\nbeta");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].text, "alpha\nbeta");
    }

    #[test]
    fn test_build_parse_request_includes_detected_sections() {
        let request = build_parse_request(EXTRACTED);
        assert!(request.contains("Backend engineer with ten years of experience."));
        assert!(request.contains("SKILLS:\nLanguages: Rust, Go"));
    }
}
