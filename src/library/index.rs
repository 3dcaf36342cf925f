//! Category/Tag Index over published records.
//!
//! Built once from a record sequence and immutable afterwards, so it can be
//! shared between any number of readers. Updates require a rebuild.

use std::collections::{BTreeMap, HashMap};

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::domain::{ContentRecord, ContentTags, ContentType};
use crate::validation::Validator;

/// Errors that make a build fail
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("Duplicate content id '{id}' (records #{first} and #{second})")]
    DuplicateId {
        id: String,
        first: usize,
        second: usize,
    },
}

/// A lookup for an id that is not indexed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Content not found: {id}")]
pub struct NotFound {
    pub id: String,
}

/// Immutable query structure over published, valid records
#[derive(Debug, Clone, Default)]
pub struct ContentIndex {
    /// Indexed records in input order
    records: Vec<ContentRecord>,
    by_id: HashMap<String, usize>,
    by_category: HashMap<ContentType, Vec<usize>>,
    by_tag: HashMap<String, Vec<usize>>,
}

impl ContentIndex {
    /// Build with default validation settings
    pub fn build<I>(records: I) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = ContentRecord>,
    {
        Self::build_with(records, &Validator::default())
    }

    /// Build an index. Drafts and records with blocking findings are left
    /// out; a repeated id anywhere in the input fails the build.
    pub fn build_with<I>(records: I, validator: &Validator) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = ContentRecord>,
    {
        Self::from_admitted(records.into_iter().map(|record| {
            let admitted = record.is_published() && validator.validate(&record).ok;
            (record, admitted)
        }))
    }

    /// Build from records already judged by the caller. Every record takes
    /// part in duplicate detection; only admitted ones are indexed.
    pub fn from_admitted<I>(candidates: I) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = (ContentRecord, bool)>,
    {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut index = Self::default();

        for (position, (record, admitted)) in candidates.into_iter().enumerate() {
            if let Some(&first) = seen.get(&record.id) {
                tracing::error!(id = %record.id, first, second = position, "Duplicate content id");
                return Err(IndexError::DuplicateId {
                    id: record.id,
                    first,
                    second: position,
                });
            }
            seen.insert(record.id.clone(), position);

            if !admitted {
                tracing::debug!(id = %record.id, status = %record.status, "Record not admitted");
                continue;
            }

            index.insert(record);
        }

        tracing::debug!(indexed = index.len(), "Index built");
        Ok(index)
    }

    fn insert(&mut self, record: ContentRecord) {
        let idx = self.records.len();

        self.by_id.insert(record.id.clone(), idx);
        self.by_category
            .entry(record.content_type.clone())
            .or_default()
            .push(idx);
        for tag in record.tags.all_normalized() {
            self.by_tag.entry(tag).or_default().push(idx);
        }

        self.records.push(record);
    }

    /// O(1) lookup by id
    pub fn by_id(&self, id: &str) -> Result<&ContentRecord, NotFound> {
        self.by_id
            .get(id)
            .map(|&i| &self.records[i])
            .ok_or_else(|| NotFound { id: id.to_string() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Records of a category, in input order. Unknown categories yield
    /// an empty list.
    pub fn by_category(&self, category: &str) -> Vec<&ContentRecord> {
        match category.parse::<ContentType>() {
            Ok(content_type) => self.by_type(&content_type),
            Err(_) => Vec::new(),
        }
    }

    pub fn by_type(&self, content_type: &ContentType) -> Vec<&ContentRecord> {
        self.collect(self.by_category.get(content_type))
    }

    /// Records carrying a tag in systems, topics or keywords
    /// (case-insensitive), in input order
    pub fn by_tag(&self, tag: &str) -> Vec<&ContentRecord> {
        self.collect(self.by_tag.get(&ContentTags::normalize(tag)))
    }

    fn collect(&self, bucket: Option<&Vec<usize>>) -> Vec<&ContentRecord> {
        bucket
            .map(|ids| ids.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    /// Record count per category; every known category is present
    pub fn counts(&self) -> BTreeMap<String, usize> {
        ContentType::KNOWN
            .iter()
            .map(|t| {
                let count = self.by_category.get(t).map(Vec::len).unwrap_or(0);
                (t.to_string(), count)
            })
            .collect()
    }

    /// Name/alias substring search (case-insensitive), in input order
    pub fn search(&self, query: &str) -> Vec<&ContentRecord> {
        self.records.iter().filter(|r| r.matches_name(query)).collect()
    }

    /// All distinct tags, sorted
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.by_tag.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Indexed records in input order
    pub fn records(&self) -> &[ContentRecord] {
        &self.records
    }

    /// SHA256 over indexed (id, version) pairs in order
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for record in &self.records {
            hasher.update(record.id.as_bytes());
            hasher.update([0u8]);
            hasher.update(record.version.to_le_bytes());
        }
        hex::encode(hasher.finalize())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LevelContent, LevelNumber, Status};

    fn published(id: &str, content_type: ContentType, keywords: &[&str]) -> ContentRecord {
        let tags = ContentTags {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        };
        LevelNumber::ALL
            .into_iter()
            .fold(ContentRecord::new(id, id, content_type), |r, l| {
                r.with_level(LevelContent::new(l, "summary", "explanation"))
            })
            .with_tags(tags)
            .with_status(Status::Published)
    }

    #[test]
    fn test_by_id_not_found_is_explicit() {
        let index = ContentIndex::build(vec![published("a", ContentType::Topic, &[])]).unwrap();

        assert_eq!(index.by_id("a").unwrap().id, "a");
        assert_eq!(
            index.by_id("missing").unwrap_err(),
            NotFound {
                id: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_by_category_keeps_input_order() {
        let index = ContentIndex::build(vec![
            published("c2", ContentType::Condition, &[]),
            published("t1", ContentType::Topic, &[]),
            published("c1", ContentType::Condition, &[]),
        ])
        .unwrap();

        let ids: Vec<&str> = index.by_category("condition").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c1"]);
        assert!(index.by_category("structure").is_empty());
        assert!(index.by_category("procedure").is_empty());
    }

    #[test]
    fn test_by_tag_case_insensitive() {
        let index = ContentIndex::build(vec![
            published("a", ContentType::Condition, &["ABRS", "abrs"]),
            published("b", ContentType::Condition, &["sinus"]),
        ])
        .unwrap();

        assert_eq!(index.by_tag("abrs").len(), 1);
        assert_eq!(index.by_tag(" ABRS ").len(), 1);
        assert!(index.by_tag("unknown").is_empty());
        assert_eq!(index.tags(), vec!["abrs", "sinus"]);
    }

    #[test]
    fn test_counts_include_empty_categories() {
        let index = ContentIndex::build(vec![published("a", ContentType::Procedure, &[])]).unwrap();
        let counts = index.counts();

        assert_eq!(counts.len(), 4);
        assert_eq!(counts["procedure"], 1);
        assert_eq!(counts["concept"], 0);
    }

    #[test]
    fn test_duplicate_id_fails_build() {
        let mut draft = published("a", ContentType::Topic, &[]);
        draft.status = Status::Draft;

        let err = ContentIndex::build(vec![published("a", ContentType::Topic, &[]), draft]).unwrap_err();
        assert_eq!(
            err,
            IndexError::DuplicateId {
                id: "a".to_string(),
                first: 0,
                second: 1
            }
        );
    }

    #[test]
    fn test_from_admitted_trusts_caller() {
        let index = ContentIndex::from_admitted(vec![
            (published("kept", ContentType::Topic, &[]), true),
            (published("held", ContentType::Topic, &[]), false),
        ])
        .unwrap();

        assert!(index.contains("kept"));
        assert!(!index.contains("held"));

        // Records that are not admitted still count for duplicate detection
        let err = ContentIndex::from_admitted(vec![
            (published("x", ContentType::Topic, &[]), false),
            (published("x", ContentType::Topic, &[]), true),
        ])
        .unwrap_err();
        assert!(matches!(err, IndexError::DuplicateId { first: 0, second: 1, .. }));
    }

    #[test]
    fn test_fingerprint_tracks_versions() {
        let first = ContentIndex::build(vec![published("a", ContentType::Topic, &[])]).unwrap();
        let again = ContentIndex::build(vec![published("a", ContentType::Topic, &[])]).unwrap();
        assert_eq!(first.fingerprint(), again.fingerprint());

        let mut bumped = published("a", ContentType::Topic, &[]);
        bumped.version = 2;
        let changed = ContentIndex::build(vec![bumped]).unwrap();
        assert_ne!(first.fingerprint(), changed.fingerprint());
    }
}
