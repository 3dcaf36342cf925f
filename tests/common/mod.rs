//! Shared record builders for integration tests

#![allow(dead_code)]

use tierbook::domain::{
    Citation, ContentRecord, ContentTags, ContentType, CrossReference, KeyTerm, LevelContent,
    LevelNumber, Relationship, Status,
};

/// A draft with all five levels filled in and no warnings
pub fn complete(id: &str, name: &str, content_type: ContentType) -> ContentRecord {
    LevelNumber::ALL
        .into_iter()
        .fold(ContentRecord::new(id, name, content_type), |record, level| {
            let mut content = LevelContent::new(
                level,
                format!("{} at level {}", name, level),
                format!("A longer explanation of {} for level {}.", name, level),
            )
            .with_key_term(KeyTerm::new(format!("term {}", level), "a definition"));
            if level.get() >= 3 {
                content = content.with_clinical_notes("Watch for red flags.");
            }
            record.with_level(content)
        })
        .with_citation(Citation::new("c1", "A reference text"))
}

pub fn published(id: &str, content_type: ContentType) -> ContentRecord {
    complete(id, id, content_type).with_status(Status::Published)
}

pub fn with_keywords(record: ContentRecord, keywords: &[&str]) -> ContentRecord {
    let tags = ContentTags {
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        ..Default::default()
    };
    record.with_tags(tags)
}

pub fn linking(record: ContentRecord, target: &str, relationship: Relationship) -> ContentRecord {
    record.with_cross_reference(CrossReference::new(target, relationship))
}
