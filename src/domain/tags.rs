//! Indexing tags attached to each record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Clinical relevance of a record.
///
/// Unknown values are kept as `Unrecognized` so they surface as validation
/// findings instead of failing the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClinicalRelevance {
    Low,
    Medium,
    High,
    Critical,
    Unrecognized(String),
}

impl ClinicalRelevance {
    /// The four allowed values
    pub const KNOWN: [ClinicalRelevance; 4] = [
        ClinicalRelevance::Low,
        ClinicalRelevance::Medium,
        ClinicalRelevance::High,
        ClinicalRelevance::Critical,
    ];

    pub fn is_recognized(&self) -> bool {
        !matches!(self, ClinicalRelevance::Unrecognized(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            ClinicalRelevance::Low => "low",
            ClinicalRelevance::Medium => "medium",
            ClinicalRelevance::High => "high",
            ClinicalRelevance::Critical => "critical",
            ClinicalRelevance::Unrecognized(s) => s,
        }
    }
}

impl From<String> for ClinicalRelevance {
    fn from(s: String) -> Self {
        match s.as_str() {
            "low" => ClinicalRelevance::Low,
            "medium" => ClinicalRelevance::Medium,
            "high" => ClinicalRelevance::High,
            "critical" => ClinicalRelevance::Critical,
            _ => ClinicalRelevance::Unrecognized(s),
        }
    }
}

impl From<ClinicalRelevance> for String {
    fn from(r: ClinicalRelevance) -> Self {
        r.as_str().to_string()
    }
}

impl std::fmt::Display for ClinicalRelevance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Board-exam relevance flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExamRelevance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usmle: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbme: Option<bool>,

    /// Shelf exams this record is relevant for
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shelf: Vec<String>,

    /// Any other exam keys, kept verbatim so they can be reported
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

/// Tag sets used for indexing and filtering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTags {
    #[serde(default)]
    pub systems: Vec<String>,

    #[serde(default)]
    pub topics: Vec<String>,

    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_relevance: Option<ClinicalRelevance>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_relevance: Option<ExamRelevance>,
}

impl ContentTags {
    /// Normalized form used for tag lookups
    pub fn normalize(tag: &str) -> String {
        tag.trim().to_lowercase()
    }

    /// Distinct normalized tags across systems, topics and keywords,
    /// in first-seen order
    pub fn all_normalized(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for tag in self.systems.iter().chain(&self.topics).chain(&self.keywords) {
            let normalized = Self::normalize(tag);
            if !normalized.is_empty() && !seen.contains(&normalized) {
                seen.push(normalized);
            }
        }
        seen
    }
}
