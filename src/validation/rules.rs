//! Structural checks applied to candidate records.
//!
//! Every check runs on every call; nothing short-circuits. The validator is a
//! pure function of its settings and the record.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::findings::{Finding, FindingKind, ValidationResult};
use crate::domain::{ContentRecord, ContentTags, LevelContent, LevelNumber, Status};

/// Tunable validation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSettings {
    /// Whole-word markers that flag unfinished text (case-insensitive)
    #[serde(default = "default_placeholder_markers")]
    pub placeholder_markers: Vec<String>,

    /// Exam keys accepted in `tags.examRelevance`
    #[serde(default = "default_known_exam_types")]
    pub known_exam_types: Vec<String>,

    /// Levels at or above this one warn when clinical notes are absent
    #[serde(default = "default_clinical_notes_from_level")]
    pub clinical_notes_from_level: u32,
}

fn default_placeholder_markers() -> Vec<String> {
    vec!["TODO".to_string(), "FIXME".to_string(), "placeholder".to_string()]
}

fn default_known_exam_types() -> Vec<String> {
    vec!["usmle".to_string(), "nbme".to_string(), "shelf".to_string()]
}

fn default_clinical_notes_from_level() -> u32 {
    3
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            placeholder_markers: default_placeholder_markers(),
            known_exam_types: default_known_exam_types(),
            clinical_notes_from_level: default_clinical_notes_from_level(),
        }
    }
}

/// Validate a record with default settings
pub fn validate(record: &ContentRecord) -> ValidationResult {
    Validator::default().validate(record)
}

/// Schema enforcer for content records
#[derive(Debug, Clone, Default)]
pub struct Validator {
    settings: ValidationSettings,
}

impl Validator {
    pub fn new(settings: ValidationSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ValidationSettings {
        &self.settings
    }

    /// Validate a record, collecting every finding
    pub fn validate(&self, record: &ContentRecord) -> ValidationResult {
        let mut findings = Vec::new();

        self.check_identity(record, &mut findings);
        self.check_levels(record, &mut findings);
        self.check_citations(record, &mut findings);
        self.check_cross_references(record, &mut findings);
        self.check_tags(&record.tags, &mut findings);
        self.check_media(record, &mut findings);
        self.check_metadata(record, &mut findings);

        // A published record must be clean
        if record.status == Status::Published && findings.iter().any(Finding::is_error) {
            let errors = findings.iter().filter(|f| f.is_error()).count();
            findings.push(Finding::error(
                FindingKind::PublishedWithErrors,
                "status",
                format!("Record is marked published but has {} blocking finding(s)", errors),
            ));
        }

        ValidationResult::from_findings(findings)
    }

    /// Validate a record as though it were being published
    pub fn validate_for_publish(&self, record: &ContentRecord) -> ValidationResult {
        if record.status == Status::Published {
            return self.validate(record);
        }
        let mut candidate = record.clone();
        candidate.status = Status::Published;
        self.validate(&candidate)
    }

    fn check_identity(&self, record: &ContentRecord, findings: &mut Vec<Finding>) {
        if record.id.trim().is_empty() {
            findings.push(Finding::error(FindingKind::EmptyId, "id", "Missing or empty id"));
        } else if !is_valid_id(&record.id) {
            findings.push(Finding::error(
                FindingKind::InvalidIdFormat,
                "id",
                format!("Id '{}' must not contain whitespace or control characters", record.id),
            ));
        }

        if record.name.trim().is_empty() {
            findings.push(Finding::error(FindingKind::EmptyName, "name", "Missing or empty name"));
        } else {
            self.check_placeholder(&record.name, "name", findings);
        }

        if !record.content_type.is_recognized() {
            findings.push(Finding::error(
                FindingKind::UnknownContentType,
                "type",
                format!(
                    "Invalid content type '{}'. Must be one of: concept, condition, procedure, topic",
                    record.content_type
                ),
            ));
        }
    }

    fn check_levels(&self, record: &ContentRecord, findings: &mut Vec<Finding>) {
        for missing in record.levels.missing() {
            findings.push(Finding::error(
                FindingKind::MissingLevel,
                "levels",
                format!("Missing complexity level {}", missing),
            ));
        }

        for key in record.levels.unexpected() {
            findings.push(Finding::error(
                FindingKind::UnexpectedLevel,
                format!("levels.{}", key),
                format!("Unexpected level key {} (allowed: 1-5)", key),
            ));
        }

        for key in record.levels.malformed_keys() {
            findings.push(Finding::error(
                FindingKind::UnexpectedLevel,
                format!("levels.{}", key),
                format!("Level key \"{}\" is not a number (allowed: 1-5)", key),
            ));
        }

        for (key, content) in record.levels.iter() {
            if content.level != key {
                findings.push(Finding::error(
                    FindingKind::LevelMismatch,
                    format!("levels.{}.level", key),
                    format!("Level field {} does not match its key {}", content.level, key),
                ));
            }
            self.check_level_content(key, content, findings);
        }
    }

    fn check_level_content(&self, key: u32, content: &LevelContent, findings: &mut Vec<Finding>) {
        let prefix = format!("levels.{}", key);

        if content.summary.trim().is_empty() {
            findings.push(Finding::error(
                FindingKind::EmptySummary,
                format!("{}.summary", prefix),
                format!("Level {}: Missing or empty summary", key),
            ));
        } else {
            self.check_placeholder(&content.summary, &format!("{}.summary", prefix), findings);
        }

        if content.explanation.trim().is_empty() {
            findings.push(Finding::error(
                FindingKind::EmptyExplanation,
                format!("{}.explanation", prefix),
                format!("Level {}: Missing or empty explanation", key),
            ));
        } else {
            self.check_placeholder(&content.explanation, &format!("{}.explanation", prefix), findings);
        }

        if let Some(notes) = &content.clinical_notes {
            for line in notes.lines() {
                self.check_placeholder(line, &format!("{}.clinicalNotes", prefix), findings);
            }
        }

        let expects_notes = LevelNumber::new(key)
            .map(|l| l.get() >= self.settings.clinical_notes_from_level)
            .unwrap_or(false);
        if expects_notes && !content.has_clinical_notes() {
            findings.push(Finding::warning(
                FindingKind::MissingClinicalNotes,
                format!("{}.clinicalNotes", prefix),
                format!("Level {}: No clinical notes", key),
            ));
        }

        if content.key_terms.is_empty() {
            findings.push(Finding::warning(
                FindingKind::NoKeyTerms,
                format!("{}.keyTerms", prefix),
                format!("Level {}: No key terms", key),
            ));
        }

        let mut seen = HashSet::new();
        for (i, term) in content.key_terms.iter().enumerate() {
            let field = format!("{}.keyTerms[{}]", prefix, i);
            let normalized = term.term.trim().to_lowercase();

            if normalized.is_empty() {
                findings.push(Finding::error(
                    FindingKind::EmptyKeyTerm,
                    format!("{}.term", field),
                    format!("Level {}: Key term {} has empty term", key, i + 1),
                ));
            } else if !seen.insert(normalized) {
                findings.push(Finding::error(
                    FindingKind::DuplicateKeyTerm,
                    format!("{}.term", field),
                    format!("Level {}: Duplicate key term \"{}\"", key, term.term.trim()),
                ));
            }

            if term.definition.trim().is_empty() {
                findings.push(Finding::error(
                    FindingKind::EmptyDefinition,
                    format!("{}.definition", field),
                    format!("Level {}: Key term \"{}\" has empty definition", key, term.term),
                ));
            }

            self.check_placeholder(&term.term, &format!("{}.term", field), findings);
            self.check_placeholder(&term.definition, &format!("{}.definition", field), findings);
        }
    }

    fn check_citations(&self, record: &ContentRecord, findings: &mut Vec<Finding>) {
        let mut seen = HashSet::new();

        for (i, citation) in record.citations.iter().enumerate() {
            let field = format!("citations[{}]", i);

            if citation.id.trim().is_empty() {
                findings.push(Finding::error(
                    FindingKind::EmptyCitationId,
                    format!("{}.id", field),
                    format!("Citation {} has an empty id", i + 1),
                ));
            } else if !seen.insert(citation.id.as_str()) {
                findings.push(Finding::error(
                    FindingKind::DuplicateCitationId,
                    format!("{}.id", field),
                    format!("Duplicate citation id '{}'", citation.id),
                ));
            }

            if citation.title.trim().is_empty() {
                findings.push(Finding::warning(
                    FindingKind::EmptyCitationTitle,
                    format!("{}.title", field),
                    format!("Citation {} has an empty title", i + 1),
                ));
            }
        }
    }

    fn check_cross_references(&self, record: &ContentRecord, findings: &mut Vec<Finding>) {
        for (i, reference) in record.cross_references.iter().enumerate() {
            let field = format!("crossReferences[{}]", i);

            if reference.target_id.trim().is_empty() {
                findings.push(Finding::error(
                    FindingKind::EmptyReferenceTarget,
                    format!("{}.targetId", field),
                    format!("Cross-reference {}: Missing targetId", i + 1),
                ));
            } else if reference.target_id == record.id {
                findings.push(Finding::warning(
                    FindingKind::SelfReference,
                    format!("{}.targetId", field),
                    format!("Cross-reference {} points at the record itself", i + 1),
                ));
            }

            if !reference.relationship.is_recognized() {
                findings.push(Finding::error(
                    FindingKind::UnknownRelationship,
                    format!("{}.relationship", field),
                    format!(
                        "Cross-reference {}: Invalid relationship \"{}\". Must be one of: parent, child, sibling, related",
                        i + 1,
                        reference.relationship
                    ),
                ));
            }
        }
    }

    fn check_tags(&self, tags: &ContentTags, findings: &mut Vec<Finding>) {
        if let Some(relevance) = &tags.clinical_relevance {
            if !relevance.is_recognized() {
                findings.push(Finding::error(
                    FindingKind::UnknownClinicalRelevance,
                    "tags.clinicalRelevance",
                    format!(
                        "Invalid clinicalRelevance: {}. Must be one of: low, medium, high, critical",
                        relevance
                    ),
                ));
            }
        }

        if let Some(exam) = &tags.exam_relevance {
            for key in exam.other.keys() {
                if !self.settings.known_exam_types.iter().any(|k| k.eq_ignore_ascii_case(key)) {
                    findings.push(Finding::warning(
                        FindingKind::UnknownExamType,
                        format!("tags.examRelevance.{}", key),
                        format!("Unknown exam type in examRelevance: {}", key),
                    ));
                }
            }

            for (i, shelf) in exam.shelf.iter().enumerate() {
                if shelf.trim().is_empty() {
                    findings.push(Finding::error(
                        FindingKind::EmptyShelfExam,
                        format!("tags.examRelevance.shelf[{}]", i),
                        "Empty shelf exam entry",
                    ));
                }
            }
        }

        for (i, system) in tags.systems.iter().enumerate() {
            let looks_like_code = system.starts_with("ICD-11")
                || system.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false);
            if looks_like_code {
                let code = system.trim_start_matches("ICD-11:").trim();
                if !is_icd11_code(code) {
                    findings.push(Finding::warning(
                        FindingKind::SuspectIcdCode,
                        format!("tags.systems[{}]", i),
                        format!("Potentially invalid ICD-11 code format: {}", code),
                    ));
                }
            }
        }
    }

    fn check_media(&self, record: &ContentRecord, findings: &mut Vec<Finding>) {
        let mut seen = HashSet::new();
        for (i, media) in record.media.iter().enumerate() {
            if !media.id.is_empty() && !seen.insert(media.id.as_str()) {
                findings.push(Finding::warning(
                    FindingKind::DuplicateMediaId,
                    format!("media[{}].id", i),
                    format!("Duplicate media id '{}'", media.id),
                ));
            }
        }
    }

    fn check_metadata(&self, record: &ContentRecord, findings: &mut Vec<Finding>) {
        if record.version < 1 {
            findings.push(Finding::error(
                FindingKind::InvalidVersion,
                "version",
                format!("Invalid version: {}. Must be a positive number.", record.version),
            ));
        }

        match (record.created_at, record.updated_at) {
            (Some(created), Some(updated)) if updated < created => {
                findings.push(Finding::error(
                    FindingKind::TimestampOrder,
                    "updatedAt",
                    format!("updatedAt ({}) is earlier than createdAt ({})", updated, created),
                ));
            }
            (created, updated) => {
                if created.is_none() {
                    findings.push(Finding::warning(
                        FindingKind::MissingTimestamp,
                        "createdAt",
                        "Missing createdAt field",
                    ));
                }
                if updated.is_none() {
                    findings.push(Finding::warning(
                        FindingKind::MissingTimestamp,
                        "updatedAt",
                        "Missing updatedAt field",
                    ));
                }
            }
        }
    }

    fn check_placeholder(&self, text: &str, field: &str, findings: &mut Vec<Finding>) {
        if let Some(marker) = find_placeholder(text, &self.settings.placeholder_markers) {
            findings.push(Finding::error(
                FindingKind::PlaceholderText,
                field,
                format!("Contains placeholder text ({})", marker),
            ));
        }
    }
}

/// Ids are non-empty and contain no whitespace or control characters
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && !id.chars().any(|c| c.is_whitespace() || c.is_control())
}

/// Return the first marker that appears in `text` as a whole word
fn find_placeholder<'a>(text: &str, markers: &'a [String]) -> Option<&'a str> {
    let words: Vec<String> = text
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();

    markers
        .iter()
        .find(|m| {
            let marker = m.to_lowercase();
            words.iter().any(|w| *w == marker)
        })
        .map(String::as_str)
}

/// One letter followed by 1-2 digits, an optional dot and up to 3 digits
fn is_icd11_code(code: &str) -> bool {
    let mut chars = code.chars();
    if !chars.next().map(|c| c.is_ascii_uppercase()).unwrap_or(false) {
        return false;
    }
    let rest: &str = chars.as_str();
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());

    match rest.split_once('.') {
        Some((major, minor)) => {
            (1..=2).contains(&major.len()) && all_digits(major) && minor.len() <= 3 && all_digits(minor)
        }
        None => (1..=5).contains(&rest.len()) && all_digits(rest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_id() {
        assert!(is_valid_id("condition-sinusitis"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("has space"));
        assert!(!is_valid_id("tab\there"));
    }

    #[test]
    fn test_find_placeholder_whole_words_only() {
        let markers = default_placeholder_markers();
        assert_eq!(find_placeholder("todo: write this", &markers), Some("TODO"));
        assert_eq!(find_placeholder("A placeholder value", &markers), Some("placeholder"));
        assert_eq!(find_placeholder("Mastodon toddlers", &markers), None);
        assert_eq!(find_placeholder("placeholders are fine", &markers), None);
    }

    #[test]
    fn test_icd11_code_format() {
        assert!(is_icd11_code("J01"));
        assert!(is_icd11_code("J0.1"));
        assert!(is_icd11_code("A12.345"));
        assert!(!is_icd11_code("12AB"));
        assert!(!is_icd11_code("J"));
        assert!(!is_icd11_code("J01.1234"));
    }

    #[test]
    fn test_settings_defaults_from_empty_yaml() {
        let settings: ValidationSettings = serde_yaml::from_str("{}").unwrap();
        assert_eq!(settings, ValidationSettings::default());
    }
}
