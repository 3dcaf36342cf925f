//! Validation Integration Tests
//!
//! Tests for record validation and the draft -> published lifecycle.

mod common;

use chrono::{Duration, Utc};
use tierbook::domain::{
    Citation, ClinicalRelevance, ContentRecord, ContentTags, ContentType, KeyTerm, LevelContent, LevelNumber,
    Status,
};
use tierbook::validation::{validate, FindingKind, Severity, ValidationSettings, Validator};

use common::complete;

#[test]
fn test_complete_record_is_valid() {
    let record = complete("condition-asthma", "Asthma", ContentType::Condition);
    let result = validate(&record);

    assert!(result.ok, "unexpected findings: {:?}", result.findings);
    assert!(result.findings.is_empty());
}

#[test]
fn test_missing_level_is_blocking() {
    let mut record = complete("condition-asthma", "Asthma", ContentType::Condition);
    record.levels.remove(3);

    let result = validate(&record);

    assert!(!result.ok);
    let missing: Vec<_> = result
        .errors()
        .filter(|f| f.kind == FindingKind::MissingLevel)
        .collect();
    assert_eq!(missing.len(), 1);
    assert!(missing[0].message.contains('3'));
}

#[test]
fn test_every_problem_is_reported() {
    let mut record = ContentRecord::new("", "", ContentType::Unrecognized("disease".into()));
    record.version = 0;

    let result = validate(&record);

    assert!(!result.ok);
    assert!(result.has(FindingKind::EmptyId));
    assert!(result.has(FindingKind::EmptyName));
    assert!(result.has(FindingKind::UnknownContentType));
    assert!(result.has(FindingKind::InvalidVersion));
    // All five levels are absent
    assert_eq!(
        result.findings.iter().filter(|f| f.kind == FindingKind::MissingLevel).count(),
        5
    );
}

#[test]
fn test_warnings_do_not_block() {
    let mut record = complete("concept-anchoring", "Anchoring Bias", ContentType::Concept);
    let mut level_four = record.levels.get(LevelNumber::new(4).unwrap()).unwrap().clone();
    level_four.clinical_notes = None;
    level_four.key_terms.clear();
    record.levels.insert(level_four);

    let result = validate(&record);

    assert!(result.ok);
    assert!(result.warning_count() >= 2);
    assert!(result.warnings().all(|f| f.severity == Severity::Warning));
    assert!(result.has(FindingKind::MissingClinicalNotes));
    assert!(result.has(FindingKind::NoKeyTerms));
}

#[test]
fn test_placeholder_markers_are_configurable() {
    let mut record = complete("topic-sleep", "Sleep", ContentType::Topic);
    let mut level_one = record.levels.get(LevelNumber::MIN).unwrap().clone();
    level_one.summary = "Sleep helps the body rest. TBD".to_string();
    record.levels.insert(level_one);

    assert!(validate(&record).ok);

    let strict = Validator::new(ValidationSettings {
        placeholder_markers: vec!["tbd".to_string()],
        ..Default::default()
    });
    let result = strict.validate(&record);
    assert!(!result.ok);
    assert!(result.has(FindingKind::PlaceholderText));
}

fn asthma() -> ContentRecord {
    complete("condition-asthma", "Asthma", ContentType::Condition)
}

fn level(record: &ContentRecord, n: u32) -> LevelContent {
    record.levels.get(LevelNumber::new(n).unwrap()).unwrap().clone()
}

fn only_error(record: &ContentRecord, kind: FindingKind) -> String {
    let result = validate(record);
    assert!(!result.ok);
    let errors: Vec<_> = result.errors().collect();
    assert_eq!(errors.len(), 1, "expected only {:?}, got {:?}", kind, errors);
    assert_eq!(errors[0].kind, kind);
    errors[0].field.clone()
}

#[test]
fn test_level_field_must_match_key() {
    let mut record = asthma();
    let mut second = level(&record, 2);
    second.level = 4;
    record.levels.insert_at(2, second);

    assert_eq!(only_error(&record, FindingKind::LevelMismatch), "levels.2.level");
}

#[test]
fn test_level_key_out_of_range() {
    let mut record = asthma();
    let mut extra = level(&record, 5);
    extra.level = 7;
    record.levels.insert_at(7, extra);

    assert_eq!(only_error(&record, FindingKind::UnexpectedLevel), "levels.7");
}

#[test]
fn test_duplicate_key_term_ignores_case_and_spacing() {
    let mut record = asthma();
    let first = level(&record, 1).with_key_term(KeyTerm::new("  TERM 1 ", "again"));
    record.levels.insert(first);

    assert_eq!(
        only_error(&record, FindingKind::DuplicateKeyTerm),
        "levels.1.keyTerms[1].term"
    );
}

#[test]
fn test_empty_key_term() {
    let mut record = asthma();
    let third = level(&record, 3).with_key_term(KeyTerm::new("   ", "orphan definition"));
    record.levels.insert(third);

    assert_eq!(
        only_error(&record, FindingKind::EmptyKeyTerm),
        "levels.3.keyTerms[1].term"
    );
}

#[test]
fn test_duplicate_citation_id() {
    let record = asthma().with_citation(Citation::new("c1", "Another source"));

    assert_eq!(
        only_error(&record, FindingKind::DuplicateCitationId),
        "citations[1].id"
    );
}

#[test]
fn test_unknown_clinical_relevance() {
    let record = asthma().with_tags(ContentTags {
        clinical_relevance: Some(ClinicalRelevance::Unrecognized("urgent".to_string())),
        ..Default::default()
    });

    assert_eq!(
        only_error(&record, FindingKind::UnknownClinicalRelevance),
        "tags.clinicalRelevance"
    );
}

#[test]
fn test_updated_before_created() {
    let mut record = asthma();
    let created = Utc::now();
    record.created_at = Some(created);
    record.updated_at = Some(created - Duration::days(1));

    assert_eq!(only_error(&record, FindingKind::TimestampOrder), "updatedAt");
}

#[test]
fn test_publish_then_revise() {
    let validator = Validator::default();
    let draft = complete("procedure-lumbar-puncture", "Lumbar Puncture", ContentType::Procedure);
    assert_eq!(draft.status, Status::Draft);

    let published = validator.publish(&draft, Utc::now()).unwrap();
    assert_eq!(published.status, Status::Published);
    assert_eq!(published.version, draft.version);

    let revised = validator
        .revise(&published, Utc::now(), |r| {
            r.id = "renamed".to_string();
            r.alternate_names.push("Spinal tap".to_string());
        })
        .unwrap();
    assert_eq!(revised.id, "procedure-lumbar-puncture");
    assert_eq!(revised.version, published.version + 1);
    assert_eq!(revised.alternate_names, vec!["Spinal tap".to_string()]);

    // An edit that breaks a published record is refused
    let broken = validator.revise(&revised, Utc::now(), |r| {
        r.levels.remove(5);
    });
    let rejected = broken.unwrap_err();
    assert!(rejected.result.has(FindingKind::MissingLevel));
}

#[test]
fn test_publish_rejects_incomplete_draft() {
    let validator = Validator::default();
    let mut draft = complete("condition-gout", "Gout", ContentType::Condition);
    draft.levels.remove(1);

    let rejected = validator.publish(&draft, Utc::now()).unwrap_err();

    assert_eq!(rejected.id, "condition-gout");
    assert!(rejected.result.error_count() >= 1);
}
