//! Catalog: the read API handed to renderers.
//!
//! A catalog is built in one pass (validate -> graph -> index) and never
//! mutated afterwards. Hot reload builds a fresh catalog and swaps it into a
//! [`SharedCatalog`].

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::index::{ContentIndex, IndexError, NotFound};
use crate::domain::{ContentRecord, Relationship, Status};
use crate::graph::{EdgeRef, ReferenceGraph, UnresolvedEdge};
use crate::validation::{Finding, ValidationResult, Validator};

/// A record left out of the index because of blocking findings
#[derive(Debug, Clone, Serialize)]
pub struct Rejected {
    pub id: String,
    pub result: ValidationResult,
}

/// What happened to each input record during a build
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    /// Ids admitted to the index
    pub indexed: Vec<String>,

    /// Ids skipped because they are drafts
    pub drafts: Vec<String>,

    /// Published records that failed validation
    pub rejected: Vec<Rejected>,

    /// Warnings on admitted records, keyed by id
    pub warnings: BTreeMap<String, Vec<Finding>>,

    /// Index fingerprint (see [`ContentIndex::fingerprint`])
    pub fingerprint: String,

    /// Fingerprint of every input record, drafts and rejects included
    pub source_fingerprint: String,
}

/// Validated, indexed and cross-linked content set
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    validator: Validator,
    index: ContentIndex,
    graph: ReferenceGraph,
    report: BuildReport,
}

impl Catalog {
    /// Build with default validation settings
    pub fn build(records: Vec<ContentRecord>) -> Result<Self, IndexError> {
        Self::build_with(records, Validator::default())
    }

    /// Build a catalog from candidate records
    pub fn build_with(records: Vec<ContentRecord>, validator: Validator) -> Result<Self, IndexError> {
        let mut graph = ReferenceGraph::new();
        let mut report = BuildReport {
            source_fingerprint: source_fingerprint(&records),
            ..Default::default()
        };
        let mut admitted = Vec::with_capacity(records.len());

        for record in &records {
            graph.add_record(record);

            if record.status == Status::Draft {
                report.drafts.push(record.id.clone());
                admitted.push(false);
                continue;
            }

            let result = validator.validate(record);
            admitted.push(result.ok);
            if result.ok {
                let warnings: Vec<Finding> = result.warnings().cloned().collect();
                if !warnings.is_empty() {
                    report.warnings.insert(record.id.clone(), warnings);
                }
            } else {
                tracing::warn!(
                    id = %record.id,
                    errors = result.error_count(),
                    "Published record rejected"
                );
                report.rejected.push(Rejected {
                    id: record.id.clone(),
                    result,
                });
            }
        }

        let index = ContentIndex::from_admitted(records.into_iter().zip(admitted))?;
        report.indexed = index.records().iter().map(|r| r.id.clone()).collect();
        report.fingerprint = index.fingerprint();

        tracing::info!(
            indexed = report.indexed.len(),
            drafts = report.drafts.len(),
            rejected = report.rejected.len(),
            edges = graph.edge_count(),
            "Catalog built"
        );

        Ok(Self {
            validator,
            index,
            graph,
            report,
        })
    }

    pub fn get_by_id(&self, id: &str) -> Result<&ContentRecord, NotFound> {
        self.index.by_id(id)
    }

    pub fn get_by_category(&self, category: &str) -> Vec<&ContentRecord> {
        self.index.by_category(category)
    }

    pub fn get_by_tag(&self, tag: &str) -> Vec<&ContentRecord> {
        self.index.by_tag(tag)
    }

    pub fn get_category_counts(&self) -> BTreeMap<String, usize> {
        self.index.counts()
    }

    /// Validate a candidate with this catalog's settings
    pub fn validate(&self, record: &ContentRecord) -> ValidationResult {
        self.validator.validate(record)
    }

    /// Cross-references whose target is not an indexed id
    pub fn unresolved_references(&self) -> Vec<UnresolvedEdge> {
        self.graph.unresolved_edges(|id| self.index.contains(id))
    }

    pub fn relationships_of(&self, id: &str) -> Vec<EdgeRef<'_>> {
        self.graph.relationships_of(id)
    }

    pub fn relationships_of_kind(&self, id: &str, kind: Option<&Relationship>) -> Vec<EdgeRef<'_>> {
        self.graph.relationships_of_kind(id, kind)
    }

    pub fn asymmetries(&self) -> Vec<Finding> {
        self.graph.asymmetries()
    }

    pub fn search(&self, query: &str) -> Vec<&ContentRecord> {
        self.index.search(query)
    }

    pub fn index(&self) -> &ContentIndex {
        &self.index
    }

    pub fn graph(&self) -> &ReferenceGraph {
        &self.graph
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn fingerprint(&self) -> &str {
        &self.report.fingerprint
    }

    /// Changes whenever any input record changes, even one left out of the
    /// index
    pub fn source_fingerprint(&self) -> &str {
        &self.report.source_fingerprint
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// SHA256 over the JSON form of every record, in input order
pub fn source_fingerprint(records: &[ContentRecord]) -> String {
    let mut hasher = Sha256::new();
    for record in records {
        match serde_json::to_vec(record) {
            Ok(bytes) => hasher.update(&bytes),
            Err(e) => {
                tracing::warn!(id = %record.id, "Record not serializable for fingerprint: {}", e);
                hasher.update(record.id.as_bytes());
            }
        }
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

/// Single-writer, many-reader handle to the current catalog.
///
/// Readers take an `Arc` snapshot and keep using it even if a reload swaps
/// in a newer catalog meanwhile.
#[derive(Debug, Clone, Default)]
pub struct SharedCatalog {
    current: Arc<RwLock<Arc<Catalog>>>,
}

impl SharedCatalog {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    /// The catalog as of now
    pub fn snapshot(&self) -> Arc<Catalog> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Replace the current catalog, returning the previous one
    pub fn swap(&self, catalog: Catalog) -> Arc<Catalog> {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, Arc::new(catalog))
    }
}
