//! Reads a rendered CV document back into a record.
//!
//! The reader is the line-oriented inverse of `render_markdown`: re-rendering a parsed document
//! reproduces it byte for byte. Entry bullets are assigned by position (date, then location,
//! then GPA for education, then highlights) since the document does not label them. A bullet only
//! fills a slot when that slot would render it unchanged; the first one that does not, and every
//! bullet after it, is a highlight.

use thiserror::Error;

use crate::models::cv::{
    CvDocument, EducationEntry, ExperienceEntry, ProjectEntry, SocialLink, TechnologyCategory,
};
use crate::render::dates::is_display_date;
use crate::render::markdown::{
    CERTIFICATES, EDUCATION, EXPERIENCE, GPA_PREFIX, PROJECTS, SUMMARY, TECHNOLOGIES,
    TITLE_SUFFIX,
};

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("line {line}: expected a `# <name>'s CV` title")]
    MissingTitle { line: usize },

    #[error("line {line}: unknown section `{title}`")]
    UnknownSection { line: usize, title: String },

    #[error("line {line}: unknown contact field `{label}`")]
    UnknownContact { line: usize, label: String },

    #[error("line {line}: unexpected content `{text}`")]
    UnexpectedLine { line: usize, text: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Header,
    Summary,
    Experience,
    Education,
    Technologies,
    Projects,
    Certificates,
}

impl Section {
    fn from_title(title: &str) -> Option<Self> {
        match title {
            SUMMARY => Some(Section::Summary),
            EXPERIENCE => Some(Section::Experience),
            EDUCATION => Some(Section::Education),
            TECHNOLOGIES => Some(Section::Technologies),
            PROJECTS => Some(Section::Projects),
            CERTIFICATES => Some(Section::Certificates),
            _ => None,
        }
    }

    fn has_entries(self) -> bool {
        matches!(
            self,
            Section::Experience | Section::Education | Section::Projects
        )
    }
}

/// An entry heading and the bullets collected under it so far.
struct PendingEntry {
    heading: String,
    bullets: Vec<String>,
}

struct Reader {
    cv: CvDocument,
    section: Section,
    paragraph: Vec<String>,
    entry: Option<PendingEntry>,
}

/// Parses a document produced by `render_markdown`.
pub fn parse_markdown(text: &str) -> Result<CvDocument, ParseError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.strip_suffix('\r').unwrap_or(line)))
        .skip_while(|(_, line)| line.trim().is_empty());

    let (title_line, title) = lines.next().ok_or(ParseError::MissingTitle { line: 1 })?;
    let name = title
        .strip_prefix("# ")
        .and_then(|t| t.strip_suffix(TITLE_SUFFIX))
        .ok_or(ParseError::MissingTitle { line: title_line })?;

    let mut reader = Reader {
        cv: CvDocument::default(),
        section: Section::Header,
        paragraph: Vec::new(),
        entry: None,
    };
    reader.cv.person.name = name.to_string();

    for (number, line) in lines {
        reader.read_line(number, line)?;
    }

    reader.flush_paragraph();
    reader.flush_entry();
    Ok(reader.cv)
}

impl Reader {
    fn read_line(&mut self, number: usize, line: &str) -> Result<(), ParseError> {
        if line.trim().is_empty() {
            self.flush_paragraph();
            return Ok(());
        }

        if let Some(title) = line.strip_prefix("# ") {
            self.flush_paragraph();
            self.flush_entry();
            self.section = Section::from_title(title).ok_or_else(|| ParseError::UnknownSection {
                line: number,
                title: title.to_string(),
            })?;
            return Ok(());
        }

        if self.section == Section::Summary {
            self.paragraph.push(line.to_string());
            return Ok(());
        }

        if let Some(heading) = line.strip_prefix("## ") {
            if !self.section.has_entries() {
                return Err(unexpected(number, line));
            }
            self.flush_entry();
            self.entry = Some(PendingEntry {
                heading: heading.to_string(),
                bullets: Vec::new(),
            });
            return Ok(());
        }

        if let Some(item) = line.strip_prefix("- ") {
            return self.read_bullet(number, item);
        }

        // A line that continues a multi-line bullet.
        let last = match self.section {
            Section::Certificates => self.cv.certifications.last_mut(),
            _ => self.entry.as_mut().and_then(|e| e.bullets.last_mut()),
        };
        match last {
            Some(previous) => {
                previous.push('\n');
                previous.push_str(line);
                Ok(())
            }
            None => Err(unexpected(number, line)),
        }
    }

    fn read_bullet(&mut self, number: usize, item: &str) -> Result<(), ParseError> {
        match self.section {
            Section::Header => self.read_contact(number, item),
            Section::Technologies => {
                let (label, details) = item.split_once(": ").unwrap_or_else(|| {
                    (item.strip_suffix(':').unwrap_or(item), "")
                });
                self.cv.skills.push(TechnologyCategory {
                    label: label.to_string(),
                    details: if details.is_empty() {
                        Vec::new()
                    } else {
                        details.split(", ").map(str::to_string).collect()
                    },
                });
                Ok(())
            }
            Section::Certificates => {
                self.cv.certifications.push(item.to_string());
                Ok(())
            }
            Section::Experience | Section::Education | Section::Projects => match &mut self.entry {
                Some(entry) => {
                    entry.bullets.push(item.to_string());
                    Ok(())
                }
                None => Err(unexpected(number, item)),
            },
            Section::Summary => {
                self.paragraph.push(format!("- {item}"));
                Ok(())
            }
        }
    }

    fn read_contact(&mut self, number: usize, item: &str) -> Result<(), ParseError> {
        let (label, value) = item.split_once(": ").ok_or_else(|| ParseError::UnknownContact {
            line: number,
            label: item.to_string(),
        })?;
        let person = &mut self.cv.person;

        match label {
            "Phone" => person.phone = Some(value.to_string()),
            "Email" => {
                let (_, target) = split_link(value).ok_or_else(|| unexpected(number, item))?;
                let email = target.strip_prefix("mailto:").unwrap_or(target);
                person.email = Some(email.to_string());
            }
            "Website" => {
                let (_, target) = split_link(value).ok_or_else(|| unexpected(number, item))?;
                person.website = Some(target.to_string());
            }
            "LinkedIn" | "GitHub" => {
                let (username, url) = split_link(value).ok_or_else(|| unexpected(number, item))?;
                let link = Some(SocialLink {
                    username: username.to_string(),
                    url: url.to_string(),
                });
                if label == "LinkedIn" {
                    person.linkedin = link;
                } else {
                    person.github = link;
                }
            }
            _ => {
                return Err(ParseError::UnknownContact {
                    line: number,
                    label: label.to_string(),
                })
            }
        }
        Ok(())
    }

    fn flush_paragraph(&mut self) {
        if !self.paragraph.is_empty() {
            self.cv.summary.push(self.paragraph.join("\n"));
            self.paragraph.clear();
        }
    }

    fn flush_entry(&mut self) {
        let Some(PendingEntry { heading, bullets }) = self.entry.take() else {
            return;
        };
        let mut bullets = bullets.into_iter().peekable();

        match self.section {
            Section::Experience => {
                let (company, position) = split_heading(&heading);
                let date = bullets.next_if(|b| is_display_date(b));
                let location = bullets.next_if(|b| !is_blank(b));
                self.cv.experience.push(ExperienceEntry {
                    company,
                    position: position.unwrap_or_default(),
                    date,
                    location,
                    highlights: bullets.collect(),
                    ..Default::default()
                });
            }
            Section::Education => {
                let (institution, degree) = split_heading(&heading);
                let date = bullets.next_if(|b| is_display_date(b));
                let location = bullets.next_if(|b| !is_blank(b) && gpa_value(b).is_none());
                let gpa = bullets
                    .next_if(|b| gpa_value(b).is_some())
                    .and_then(|b| gpa_value(&b).map(str::to_string));
                self.cv.education.push(EducationEntry {
                    institution,
                    degree,
                    date,
                    location,
                    gpa,
                    highlights: bullets.collect(),
                    ..Default::default()
                });
            }
            Section::Projects => {
                self.cv.projects.push(ProjectEntry {
                    name: heading,
                    date: bullets.next_if(|b| is_display_date(b)),
                    highlights: bullets.collect(),
                });
            }
            _ => {}
        }
    }
}

/// `Acme Corp, Software Engineer` splits at the first comma.
fn split_heading(heading: &str) -> (String, Option<String>) {
    match heading.split_once(", ") {
        Some((first, rest)) => (first.to_string(), Some(rest.to_string())),
        None => (heading.to_string(), None),
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// The value of a `GPA: <value>` bullet, when the value is non-blank.
fn gpa_value(bullet: &str) -> Option<&str> {
    bullet.strip_prefix(GPA_PREFIX).filter(|value| !is_blank(value))
}

/// `[label](target)` into its parts.
fn split_link(value: &str) -> Option<(&str, &str)> {
    let inner = value.strip_prefix('[')?.strip_suffix(')')?;
    inner.rsplit_once("](")
}

fn unexpected(line: usize, text: &str) -> ParseError {
    ParseError::UnexpectedLine {
        line,
        text: text.to_string(),
    }
}
