//! The CV record consumed by the renderer, the RenderCV exporter and the resume store.
//!
//! The JSON shape matches the resume JSON produced by the structuring step: person fields live at
//! the top level, `skills` is an object of `{label: [names]}` and profile links travel as URLs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvDocument {
    #[serde(flatten)]
    pub person: Person,
    #[serde(
        default,
        deserialize_with = "de::paragraphs",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub summary: Vec<String>,
    #[serde(default, deserialize_with = "de::nullable_vec")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default, deserialize_with = "de::nullable_vec")]
    pub education: Vec<EducationEntry>,
    #[serde(
        default,
        deserialize_with = "de::categories",
        serialize_with = "ser::categories"
    )]
    pub skills: Vec<TechnologyCategory>,
    #[serde(default, deserialize_with = "de::nullable_vec")]
    pub projects: Vec<ProjectEntry>,
    #[serde(default, deserialize_with = "de::nullable_vec")]
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default, deserialize_with = "de::loose_string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "de::loose_string")]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(
        default,
        deserialize_with = "de::linkedin",
        serialize_with = "ser::profile_url"
    )]
    pub linkedin: Option<SocialLink>,
    #[serde(
        default,
        deserialize_with = "de::github",
        serialize_with = "ser::profile_url"
    )]
    pub github: Option<SocialLink>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialNetwork {
    LinkedIn,
    GitHub,
}

impl SocialNetwork {
    pub fn label(self) -> &'static str {
        match self {
            SocialNetwork::LinkedIn => "LinkedIn",
            SocialNetwork::GitHub => "GitHub",
        }
    }

    fn profile_base(self) -> &'static str {
        match self {
            SocialNetwork::LinkedIn => "https://linkedin.com/in/",
            SocialNetwork::GitHub => "https://github.com/",
        }
    }
}

/// A profile on a social network: the display username plus the link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialLink {
    pub username: String,
    pub url: String,
}

impl SocialLink {
    /// Builds a link from either a profile URL or a bare username.
    ///
    /// For URLs the username is the last non-empty path segment; a URL without a path keeps the
    /// whole URL as its username. Returns `None` for blank input.
    pub fn from_profile(network: SocialNetwork, raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let candidate = if raw.contains("://") {
            Some(raw.to_string())
        } else if raw.contains('/') && raw.contains('.') {
            Some(format!("https://{raw}"))
        } else {
            None
        };

        if let Some(url) = candidate.and_then(|c| Url::parse(&c).ok()) {
            let username = url
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                .map(str::to_string)
                .unwrap_or_else(|| raw.to_string());
            return Some(SocialLink {
                username,
                url: url.to_string(),
            });
        }

        let username = raw.trim_start_matches('@').to_string();
        Some(SocialLink {
            url: format!("{}{}", network.profile_base(), username),
            username,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default, deserialize_with = "de::loose_string_or_empty")]
    pub company: String,
    #[serde(default, deserialize_with = "de::loose_string_or_empty")]
    pub position: String,
    #[serde(default, deserialize_with = "de::loose_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "de::loose_string")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "de::loose_string")]
    pub end_date: Option<String>,
    /// Free-form date text; takes precedence over `start_date`/`end_date` when rendering.
    #[serde(
        default,
        deserialize_with = "de::loose_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "de::nullable_vec")]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default, deserialize_with = "de::loose_string_or_empty")]
    pub institution: String,
    #[serde(default, deserialize_with = "de::loose_string")]
    pub degree: Option<String>,
    #[serde(default, deserialize_with = "de::loose_string")]
    pub area: Option<String>,
    #[serde(default, deserialize_with = "de::loose_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "de::loose_string")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "de::loose_string")]
    pub end_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "de::loose_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "de::loose_string")]
    pub gpa: Option<String>,
    #[serde(default, deserialize_with = "de::nullable_vec")]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnologyCategory {
    pub label: String,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    #[serde(default, deserialize_with = "de::loose_string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "de::loose_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "de::nullable_vec")]
    pub highlights: Vec<String>,
}

mod de {
    use std::fmt;

    use serde::de::{self, DeserializeOwned, MapAccess, Visitor};

    use super::*;

    /// Scalars the structuring step emits for textual fields: strings, numbers (`2021`, `3.8`)
    /// and booleans. Blank strings collapse to `None`.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Text(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    impl Loose {
        fn into_text(self) -> Option<String> {
            let text = match self {
                Loose::Text(s) => s,
                Loose::Int(n) => n.to_string(),
                Loose::Float(f) => f.to_string(),
                Loose::Bool(b) => b.to_string(),
            };
            if text.trim().is_empty() {
                None
            } else {
                Some(text)
            }
        }
    }

    pub fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Loose>::deserialize(deserializer)?.and_then(Loose::into_text))
    }

    pub fn loose_string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(loose_string(deserializer)?.unwrap_or_default())
    }

    pub fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// Accepts a single string (paragraphs separated by blank lines) or a list of paragraphs.
    pub fn paragraphs<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Summary {
            One(String),
            Many(Vec<String>),
        }

        Ok(match Option::<Summary>::deserialize(deserializer)? {
            None => Vec::new(),
            Some(Summary::Many(list)) => list,
            Some(Summary::One(text)) => text
                .split("\n\n")
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }

    /// Reads `{label: [names]}` keeping the object's key order.
    pub fn categories<'de, D>(deserializer: D) -> Result<Vec<TechnologyCategory>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CategoriesVisitor;

        impl<'de> Visitor<'de> for CategoriesVisitor {
            type Value = Vec<TechnologyCategory>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping category labels to lists of technologies")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(Vec::new())
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(Vec::new())
            }

            fn visit_some<D2>(self, deserializer: D2) -> Result<Self::Value, D2::Error>
            where
                D2: Deserializer<'de>,
            {
                deserializer.deserialize_map(self)
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut categories = Vec::new();
                while let Some((label, details)) = map.next_entry::<String, Details>()? {
                    categories.push(TechnologyCategory {
                        label,
                        details: details.into_list(),
                    });
                }
                Ok(categories)
            }
        }

        deserializer.deserialize_option(CategoriesVisitor)
    }

    /// Category details may arrive as a list or as one comma-separated string.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Details {
        List(Vec<String>),
        Joined(String),
    }

    impl Details {
        fn into_list(self) -> Vec<String> {
            match self {
                Details::List(list) => list,
                Details::Joined(text) => text
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            }
        }
    }

    pub fn linkedin<'de, D>(deserializer: D) -> Result<Option<SocialLink>, D::Error>
    where
        D: Deserializer<'de>,
    {
        profile(deserializer, SocialNetwork::LinkedIn)
    }

    pub fn github<'de, D>(deserializer: D) -> Result<Option<SocialLink>, D::Error>
    where
        D: Deserializer<'de>,
    {
        profile(deserializer, SocialNetwork::GitHub)
    }

    fn profile<'de, D>(deserializer: D, network: SocialNetwork) -> Result<Option<SocialLink>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?
            .and_then(|raw| SocialLink::from_profile(network, &raw)))
    }
}

mod ser {
    use serde::ser::SerializeMap;

    use super::*;

    pub fn categories<S>(categories: &[TechnologyCategory], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(categories.len()))?;
        for category in categories {
            map.serialize_entry(&category.label, &category.details)?;
        }
        map.end()
    }

    pub fn profile_url<S>(link: &Option<SocialLink>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match link {
            Some(link) => serializer.serialize_some(&link.url),
            None => serializer.serialize_none(),
        }
    }
}
