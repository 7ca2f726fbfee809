//! Export to the YAML input format of the RenderCV typesetter.
//!
//! Only the `cv:` document is produced. Dates are cut to `YYYY-MM`, technology lists are joined
//! into one `details` string, and sections without content are left out.

use serde::Serialize;

use crate::models::cv::{CvDocument, SocialNetwork};
use crate::render::dates::month_precision;

#[derive(Debug, Serialize)]
struct RenderCvFile<'a> {
    cv: RenderCv<'a>,
}

#[derive(Debug, Serialize)]
struct RenderCv<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    website: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    social_networks: Vec<SocialNetworkItem<'a>>,
    sections: Sections<'a>,
}

#[derive(Debug, Serialize)]
struct SocialNetworkItem<'a> {
    network: &'static str,
    username: &'a str,
}

#[derive(Debug, Default, Serialize)]
struct Sections<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    experience: Option<Vec<ExperienceItem<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    education: Option<Vec<EducationItem<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    technologies: Option<Vec<OneLineItem<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    projects: Option<Vec<ProjectItem<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    certificates: Option<&'a [String]>,
}

#[derive(Debug, Serialize)]
struct ExperienceItem<'a> {
    company: &'a str,
    position: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<&'a str>,
    highlights: &'a [String],
}

#[derive(Debug, Serialize)]
struct EducationItem<'a> {
    institution: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    area: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    degree: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gpa: Option<&'a str>,
    highlights: &'a [String],
}

#[derive(Debug, Serialize)]
struct OneLineItem<'a> {
    label: &'a str,
    details: String,
}

#[derive(Debug, Serialize)]
struct ProjectItem<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<&'a str>,
    highlights: &'a [String],
}

/// Serializes the record as a RenderCV input file.
pub fn to_rendercv_yaml(cv: &CvDocument) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&build(cv))
}

fn build(cv: &CvDocument) -> RenderCvFile<'_> {
    let person = &cv.person;

    let social_networks = [
        (SocialNetwork::LinkedIn, &person.linkedin),
        (SocialNetwork::GitHub, &person.github),
    ]
    .into_iter()
    .filter_map(|(network, link)| {
        link.as_ref().map(|link| SocialNetworkItem {
            network: network.label(),
            username: &link.username,
        })
    })
    .collect();

    let sections = Sections {
        summary: non_empty(&cv.summary),
        experience: non_empty(&cv.experience).map(|entries| {
            entries
                .iter()
                .map(|e| ExperienceItem {
                    company: &e.company,
                    position: &e.position,
                    location: e.location.as_deref(),
                    start_date: e.start_date.as_deref().map(month_precision),
                    end_date: e.end_date.as_deref().map(month_precision),
                    date: e.date.as_deref(),
                    highlights: &e.highlights,
                })
                .collect()
        }),
        education: non_empty(&cv.education).map(|entries| {
            entries
                .iter()
                .map(|e| EducationItem {
                    institution: &e.institution,
                    area: e.area.as_deref(),
                    degree: e.degree.as_deref(),
                    location: e.location.as_deref(),
                    start_date: e.start_date.as_deref().map(month_precision),
                    end_date: e.end_date.as_deref().map(month_precision),
                    date: e.date.as_deref(),
                    gpa: e.gpa.as_deref(),
                    highlights: &e.highlights,
                })
                .collect()
        }),
        technologies: non_empty(&cv.skills).map(|categories| {
            categories
                .iter()
                .map(|c| OneLineItem {
                    label: &c.label,
                    details: c.details.join(", "),
                })
                .collect()
        }),
        projects: non_empty(&cv.projects).map(|entries| {
            entries
                .iter()
                .map(|p| ProjectItem {
                    name: &p.name,
                    date: p.date.as_deref(),
                    highlights: &p.highlights,
                })
                .collect()
        }),
        certificates: non_empty(&cv.certifications),
    };

    RenderCvFile {
        cv: RenderCv {
            name: &person.name,
            email: person.email.as_deref(),
            phone: person.phone.as_deref(),
            website: person.website.as_deref(),
            social_networks,
            sections,
        },
    }
}

fn non_empty<T>(items: &[T]) -> Option<&[T]> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
