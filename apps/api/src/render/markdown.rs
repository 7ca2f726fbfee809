//! Markdown rendering of a CV record.
//!
//! Output layout, in fixed order: title and contact bullets, then `# Summary`, `# Experience`,
//! `# Education`, `# Technologies`, `# Projects`, `# Certificates`. Empty sections are left out.
//! Text is emitted as written and nothing is sorted or de-duplicated. Line structure is the only
//! thing adjusted: one-line fields lose their newlines, multi-line text loses its blank lines, and a
//! continuation line that would read as a heading or bullet is indented by one space. With that the
//! output always reads back through `parse_markdown`.

use crate::models::cv::{
    CvDocument, EducationEntry, ExperienceEntry, Person, ProjectEntry, SocialLink, SocialNetwork,
    TechnologyCategory,
};
use crate::render::dates::format_date_range;

pub const SUMMARY: &str = "Summary";
pub const EXPERIENCE: &str = "Experience";
pub const EDUCATION: &str = "Education";
pub const TECHNOLOGIES: &str = "Technologies";
pub const PROJECTS: &str = "Projects";
pub const CERTIFICATES: &str = "Certificates";

pub const TITLE_SUFFIX: &str = "'s CV";
pub const GPA_PREFIX: &str = "GPA: ";

/// Renders the whole document. Total over any record.
pub fn render_markdown(cv: &CvDocument) -> String {
    let mut doc = Document::default();

    doc.block(format!("# {}{TITLE_SUFFIX}", one_line(&cv.person.name)));
    doc.bullets(contact_lines(&cv.person));

    let summary: Vec<String> = cv
        .summary
        .iter()
        .map(|p| paragraph_text(p))
        .filter(|p| !p.is_empty())
        .collect();
    if !summary.is_empty() {
        doc.section(SUMMARY);
        for paragraph in summary {
            doc.block(paragraph);
        }
    }

    if !cv.experience.is_empty() {
        doc.section(EXPERIENCE);
        for entry in &cv.experience {
            write_experience(&mut doc, entry);
        }
    }

    if !cv.education.is_empty() {
        doc.section(EDUCATION);
        for entry in &cv.education {
            write_education(&mut doc, entry);
        }
    }

    if !cv.skills.is_empty() {
        doc.section(TECHNOLOGIES);
        doc.bullets(cv.skills.iter().map(technology_line).collect());
    }

    if !cv.projects.is_empty() {
        doc.section(PROJECTS);
        for entry in &cv.projects {
            write_project(&mut doc, entry);
        }
    }

    if !cv.certifications.is_empty() {
        doc.section(CERTIFICATES);
        doc.bullets(cv.certifications.clone());
    }

    doc.finish()
}

/// Blocks separated by exactly one blank line, ending in a single newline.
#[derive(Default)]
struct Document {
    blocks: Vec<String>,
}

impl Document {
    fn block(&mut self, text: String) {
        self.blocks.push(text);
    }

    fn section(&mut self, title: &str) {
        self.blocks.push(format!("# {title}"));
    }

    fn bullets(&mut self, items: Vec<String>) {
        if items.is_empty() {
            return;
        }
        let list = items
            .iter()
            .map(|item| format!("- {}", bullet_text(item)))
            .collect::<Vec<_>>()
            .join("\n");
        self.blocks.push(list);
    }

    fn finish(self) -> String {
        let mut out = self.blocks.join("\n\n");
        out.push('\n');
        out
    }
}

/// Contact bullets in display order. Blank fields produce no line.
pub fn contact_lines(person: &Person) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(phone) = non_blank(person.phone.as_deref()).map(one_line) {
        lines.push(format!("Phone: {phone}"));
    }
    if let Some(email) = non_blank(person.email.as_deref()).map(one_line) {
        lines.push(format!("Email: [{email}](mailto:{email})"));
    }
    if let Some(website) = non_blank(person.website.as_deref()).map(one_line) {
        lines.push(format!("Website: [{}]({website})", website_label(&website)));
    }
    for (network, link) in [
        (SocialNetwork::LinkedIn, &person.linkedin),
        (SocialNetwork::GitHub, &person.github),
    ] {
        if let Some(SocialLink { username, url }) = link {
            lines.push(format!(
                "{}: [{}]({})",
                network.label(),
                one_line(username),
                one_line(url)
            ));
        }
    }

    lines
}

/// `https://jane.dev/` is shown as `jane.dev`.
pub fn website_label(url: &str) -> &str {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    without_scheme.trim_end_matches('/')
}

fn write_experience(doc: &mut Document, entry: &ExperienceEntry) {
    doc.block(entry_heading(&[entry.company.as_str(), entry.position.as_str()]));

    let mut items = Vec::new();
    items.extend(format_date_range(
        entry.start_date.as_deref(),
        entry.end_date.as_deref(),
        entry.date.as_deref(),
    ));
    items.extend(non_blank(entry.location.as_deref()).map(str::to_string));
    items.extend(entry.highlights.iter().cloned());
    doc.bullets(items);
}

fn write_education(doc: &mut Document, entry: &EducationEntry) {
    let degree_line = match (
        non_blank(entry.degree.as_deref()),
        non_blank(entry.area.as_deref()),
    ) {
        (Some(degree), Some(area)) => format!("{degree} in {area}"),
        (Some(degree), None) => degree.to_string(),
        (None, Some(area)) => area.to_string(),
        (None, None) => String::new(),
    };
    doc.block(entry_heading(&[entry.institution.as_str(), degree_line.as_str()]));

    let mut items = Vec::new();
    items.extend(format_date_range(
        entry.start_date.as_deref(),
        entry.end_date.as_deref(),
        entry.date.as_deref(),
    ));
    items.extend(non_blank(entry.location.as_deref()).map(str::to_string));
    items.extend(non_blank(entry.gpa.as_deref()).map(|gpa| format!("{GPA_PREFIX}{gpa}")));
    items.extend(entry.highlights.iter().cloned());
    doc.bullets(items);
}

fn write_project(doc: &mut Document, entry: &ProjectEntry) {
    doc.block(entry_heading(&[entry.name.as_str()]));

    let mut items = Vec::new();
    items.extend(format_date_range(None, None, entry.date.as_deref()));
    items.extend(entry.highlights.iter().cloned());
    doc.bullets(items);
}

fn technology_line(category: &TechnologyCategory) -> String {
    let details: Vec<String> = category.details.iter().map(|d| one_line(d)).collect();
    format!("{}: {}", one_line(&category.label), details.join(", "))
}

/// `## part, part` from the trimmed non-blank parts.
fn entry_heading(parts: &[&str]) -> String {
    let parts: Vec<String> = parts
        .iter()
        .map(|p| one_line(p).trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    format!("## {}", parts.join(", "))
}

/// Line starts the reader treats as structure.
const LINE_MARKERS: [&str; 3] = ["# ", "## ", "- "];

fn one_line(text: &str) -> String {
    text.split(['\r', '\n']).collect::<Vec<_>>().join(" ")
}

/// Bullet text: the first line as given, then the non-blank continuation lines.
fn bullet_text(text: &str) -> String {
    let mut lines = text.split('\n').map(|line| line.trim_end_matches('\r'));
    let mut out = lines.next().unwrap_or_default().to_string();
    for line in lines.filter(|line| !line.trim().is_empty()) {
        out.push('\n');
        out.push_str(&unmarked(line));
    }
    out
}

/// Summary paragraph: non-blank lines only. Empty when nothing is left.
fn paragraph_text(text: &str) -> String {
    text.split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(unmarked)
        .collect::<Vec<_>>()
        .join("\n")
}

fn unmarked(line: &str) -> String {
    if LINE_MARKERS.iter().any(|marker| line.starts_with(marker)) {
        format!(" {line}")
    } else {
        line.to_string()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn john_smith() -> CvDocument {
        CvDocument {
            person: Person {
                name: "John Smith".to_string(),
                phone: Some("+1 555 0100".to_string()),
                email: Some("john@example.com".to_string()),
                website: Some("https://johnsmith.dev/".to_string()),
                linkedin: SocialLink::from_profile(SocialNetwork::LinkedIn, "johnsmith"),
                github: SocialLink::from_profile(SocialNetwork::GitHub, "jsmith"),
            },
            summary: vec![
                "Backend engineer focused on payments.".to_string(),
                "Enjoys making slow things fast.".to_string(),
            ],
            experience: vec![ExperienceEntry {
                company: "Acme Corp".to_string(),
                position: "Software Engineer".to_string(),
                location: Some("Berlin, Germany".to_string()),
                start_date: Some("2023-01".to_string()),
                highlights: vec![
                    "Cut invoice latency by 40%".to_string(),
                    "Owned the ledger service".to_string(),
                ],
                ..Default::default()
            }],
            education: vec![EducationEntry {
                institution: "State University".to_string(),
                degree: Some("Computer Science".to_string()),
                area: Some("Computer Science".to_string()),
                start_date: Some("2017".to_string()),
                end_date: Some("2021".to_string()),
                gpa: Some("3.8".to_string()),
                highlights: vec!["Thesis on consensus protocols".to_string()],
                ..Default::default()
            }],
            skills: vec![
                TechnologyCategory {
                    label: "Languages".to_string(),
                    details: vec!["Rust".to_string(), "Go".to_string(), "SQL".to_string()],
                },
                TechnologyCategory {
                    label: "Tools".to_string(),
                    details: vec!["Docker".to_string()],
                },
            ],
            projects: vec![ProjectEntry {
                name: "ledgerd".to_string(),
                date: Some("2022".to_string()),
                highlights: vec!["Double-entry ledger in 2k lines".to_string()],
            }],
            certifications: vec!["AWS Solutions Architect (2022)".to_string()],
        }
    }

    #[test]
    fn test_full_document_layout() {
        let expected = "\
# John Smith's CV

- Phone: +1 555 0100
- Email: [john@example.com](mailto:john@example.com)
- Website: [johnsmith.dev](https://johnsmith.dev/)
- LinkedIn: [johnsmith](https://linkedin.com/in/johnsmith)
- GitHub: [jsmith](https://github.com/jsmith)

# Summary

Backend engineer focused on payments.

Enjoys making slow things fast.

# Experience

## Acme Corp, Software Engineer

- Jan 2023 – present
- Berlin, Germany
- Cut invoice latency by 40%
- Owned the ledger service

# Education

## State University, Computer Science in Computer Science

- 2017 – 2021
- GPA: 3.8
- Thesis on consensus protocols

# Technologies

- Languages: Rust, Go, SQL
- Tools: Docker

# Projects

## ledgerd

- 2022
- Double-entry ledger in 2k lines

# Certificates

- AWS Solutions Architect (2022)
";
        assert_eq!(render_markdown(&john_smith()), expected);
    }

    #[test]
    fn test_experience_heading_joins_organization_and_title() {
        let md = render_markdown(&john_smith());
        assert!(md.contains("\n## Acme Corp, Software Engineer\n"));
        assert!(md.starts_with("# John Smith's CV\n"));
    }

    #[test]
    fn test_section_order_is_fixed() {
        let md = render_markdown(&john_smith());
        let positions: Vec<usize> = [
            "# Summary",
            "# Experience",
            "# Education",
            "# Technologies",
            "# Projects",
            "# Certificates",
        ]
        .iter()
        .map(|h| md.find(&format!("\n{h}\n")).expect(h))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_absent_contact_fields_produce_no_line() {
        let mut cv = john_smith();
        cv.person.phone = None;
        cv.person.website = Some("   ".to_string());
        cv.person.github = None;

        let md = render_markdown(&cv);
        assert!(!md.contains("Phone:"));
        assert!(!md.contains("Website:"));
        assert!(!md.contains("GitHub:"));
        assert!(md.contains("- Email: [john@example.com](mailto:john@example.com)\n"));
    }

    #[test]
    fn test_link_targets_match_labels() {
        let md = render_markdown(&john_smith());
        for line in md.lines().filter(|l| l.contains("](")) {
            let label = &line[line.find('[').unwrap() + 1..line.find("](").unwrap()];
            let target = &line[line.find("](").unwrap() + 2..line.len() - 1];
            if line.starts_with("- Email:") {
                assert_eq!(target, format!("mailto:{label}"));
            } else {
                assert!(target.starts_with("https://"), "{line}");
                assert!(target.contains(label), "{line}");
            }
        }
    }

    #[test]
    fn test_minimal_record_renders_title_only() {
        let cv = CvDocument {
            person: Person {
                name: "Ada".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(render_markdown(&cv), "# Ada's CV\n");
    }

    #[test]
    fn test_empty_bullet_list_renders_heading_only() {
        let cv = CvDocument {
            person: Person {
                name: "Ada".to_string(),
                ..Default::default()
            },
            projects: vec![ProjectEntry {
                name: "Engine".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(render_markdown(&cv), "# Ada's CV\n\n# Projects\n\n## Engine\n");
    }

    #[test]
    fn test_bullets_keep_order_and_duplicates() {
        let mut cv = john_smith();
        cv.experience[0].highlights = vec!["b".into(), "a".into(), "b".into()];
        let md = render_markdown(&cv);
        assert!(md.contains("- Berlin, Germany\n- b\n- a\n- b\n"));
    }

    #[test]
    fn test_special_characters_pass_through() {
        let mut cv = john_smith();
        cv.experience[0].highlights = vec!["Shipped *v2* of [core] & <api>".into()];
        assert!(render_markdown(&cv).contains("- Shipped *v2* of [core] & <api>\n"));
    }

    #[test]
    fn test_education_with_area_only() {
        let mut cv = john_smith();
        cv.education[0].degree = None;
        cv.education[0].area = Some("Mathematics".to_string());
        assert!(render_markdown(&cv).contains("## State University, Mathematics\n"));
    }

    #[test]
    fn test_multi_line_highlight_keeps_one_bullet() {
        let mut cv = john_smith();
        cv.experience[0].highlights = vec!["Led it\n\n- and more\r\n# really".into(), "".into()];
        let md = render_markdown(&cv);
        assert!(md.contains("- Berlin, Germany\n- Led it\n - and more\n # really\n- \n"), "{md}");
    }

    #[test]
    fn test_one_line_fields_lose_newlines() {
        let mut cv = john_smith();
        cv.person.name = "John\nSmith".to_string();
        cv.experience[0].company = " Acme\nCorp ".to_string();
        let md = render_markdown(&cv);
        assert!(md.starts_with("# John Smith's CV\n"));
        assert!(md.contains("\n## Acme Corp, Software Engineer\n"));
    }

    #[test]
    fn test_summary_paragraph_lines() {
        let mut cv = john_smith();
        cv.summary = vec!["# Lead\n \nengineer".into(), "\n\n".into()];
        let md = render_markdown(&cv);
        assert!(md.contains("# Summary\n\n # Lead\nengineer\n\n# Experience"), "{md}");
    }

    #[test]
    fn test_website_label_strips_scheme_and_slash() {
        assert_eq!(website_label("https://jane.dev/"), "jane.dev");
        assert_eq!(website_label("http://jane.dev/blog"), "jane.dev/blog");
        assert_eq!(website_label("jane.dev"), "jane.dev");
    }
}
