//! The content record: one topic, condition, procedure or concept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::level::{LevelContent, Levels};
use super::tags::ContentTags;

/// Kind of record; also the category used for listings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContentType {
    Concept,
    Condition,
    Procedure,
    Topic,
    /// A type string outside the closed set, preserved for diagnostics
    Unrecognized(String),
}

impl ContentType {
    /// Every recognized category, in display order
    pub const KNOWN: [ContentType; 4] = [
        ContentType::Concept,
        ContentType::Condition,
        ContentType::Procedure,
        ContentType::Topic,
    ];

    pub fn is_recognized(&self) -> bool {
        !matches!(self, ContentType::Unrecognized(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            ContentType::Concept => "concept",
            ContentType::Condition => "condition",
            ContentType::Procedure => "procedure",
            ContentType::Topic => "topic",
            ContentType::Unrecognized(s) => s,
        }
    }
}

impl Default for ContentType {
    fn default() -> Self {
        ContentType::Unrecognized(String::new())
    }
}

impl From<String> for ContentType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "concept" => ContentType::Concept,
            "condition" => ContentType::Condition,
            "procedure" => ContentType::Procedure,
            "topic" => ContentType::Topic,
            _ => ContentType::Unrecognized(s),
        }
    }
}

impl From<ContentType> for String {
    fn from(t: ContentType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match ContentType::from(s.trim().to_lowercase()) {
            ContentType::Unrecognized(_) => anyhow::bail!("Unknown content type: {}", s),
            known => Ok(known),
        }
    }
}

/// Publication status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Authored but not yet admitted to query results
    #[default]
    Draft,

    /// Validated and eligible for query results
    Published,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Draft => write!(f, "draft"),
            Status::Published => write!(f, "published"),
        }
    }
}

/// Relationship carried by a cross-reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Relationship {
    Parent,
    Child,
    Sibling,
    Related,
    Unrecognized(String),
}

impl Relationship {
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Relationship::Unrecognized(_))
    }

    /// The edge the target is expected to declare back, if any.
    /// `related` carries no such expectation.
    pub fn inverse(&self) -> Option<Relationship> {
        match self {
            Relationship::Parent => Some(Relationship::Child),
            Relationship::Child => Some(Relationship::Parent),
            Relationship::Sibling => Some(Relationship::Sibling),
            Relationship::Related | Relationship::Unrecognized(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Relationship::Parent => "parent",
            Relationship::Child => "child",
            Relationship::Sibling => "sibling",
            Relationship::Related => "related",
            Relationship::Unrecognized(s) => s,
        }
    }
}

impl Default for Relationship {
    fn default() -> Self {
        Relationship::Related
    }
}

impl From<String> for Relationship {
    fn from(s: String) -> Self {
        match s.as_str() {
            "parent" => Relationship::Parent,
            "child" => Relationship::Child,
            "sibling" => Relationship::Sibling,
            "related" => Relationship::Related,
            _ => Relationship::Unrecognized(s),
        }
    }
}

impl From<Relationship> for String {
    fn from(r: Relationship) -> Self {
        r.as_str().to_string()
    }
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed, directed link to another record by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossReference {
    #[serde(default)]
    pub target_id: String,

    /// Target's record type as declared by the author (informational)
    #[serde(default)]
    pub target_type: String,

    #[serde(default)]
    pub relationship: Relationship,

    #[serde(default)]
    pub label: String,
}

impl CrossReference {
    pub fn new(target_id: impl Into<String>, relationship: Relationship) -> Self {
        Self {
            target_id: target_id.into(),
            relationship,
            ..Default::default()
        }
    }
}

/// Kind of cited source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationType {
    Article,
    Book,
    Guideline,
    Website,
    #[default]
    #[serde(other)]
    Other,
}

/// A bibliographic citation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    #[serde(default)]
    pub id: String,

    #[serde(default, rename = "type")]
    pub citation_type: CitationType,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Citation {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Media attachment (opaque to the core beyond its id)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    #[serde(default)]
    pub id: String,

    #[serde(default, rename = "type")]
    pub media_type: String,

    #[serde(default)]
    pub filename: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One topic/condition/procedure's complete structured entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    /// Globally unique, immutable once published
    #[serde(default)]
    pub id: String,

    #[serde(default, rename = "type")]
    pub content_type: ContentType,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub alternate_names: Vec<String>,

    #[serde(default)]
    pub levels: Levels,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<Media>,

    #[serde(default)]
    pub citations: Vec<Citation>,

    #[serde(default)]
    pub cross_references: Vec<CrossReference>,

    #[serde(default)]
    pub tags: ContentTags,

    #[serde(default)]
    pub status: Status,

    /// Bumped on every content change; starts at 1
    #[serde(default)]
    pub version: u32,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ContentRecord {
    /// Create a new draft record at version 1
    pub fn new(id: impl Into<String>, name: impl Into<String>, content_type: ContentType) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            content_type,
            name: name.into(),
            version: 1,
            created_at: Some(now),
            updated_at: Some(now),
            ..Default::default()
        }
    }

    /// Add a level
    pub fn with_level(mut self, level: LevelContent) -> Self {
        self.levels.insert(level);
        self
    }

    /// Add an alternate name
    pub fn with_alternate_name(mut self, name: impl Into<String>) -> Self {
        self.alternate_names.push(name.into());
        self
    }

    /// Add a citation
    pub fn with_citation(mut self, citation: Citation) -> Self {
        self.citations.push(citation);
        self
    }

    /// Add a cross-reference
    pub fn with_cross_reference(mut self, reference: CrossReference) -> Self {
        self.cross_references.push(reference);
        self
    }

    /// Replace the tag block
    pub fn with_tags(mut self, tags: ContentTags) -> Self {
        self.tags = tags;
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn is_published(&self) -> bool {
        self.status == Status::Published
    }

    /// Case-insensitive match against the name and alternate names
    pub fn matches_name(&self, query: &str) -> bool {
        let query_lower = query.trim().to_lowercase();
        if query_lower.is_empty() {
            return false;
        }

        self.name.to_lowercase().contains(&query_lower)
            || self
                .alternate_names
                .iter()
                .any(|n| n.to_lowercase().contains(&query_lower))
    }
}
