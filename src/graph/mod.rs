//! Reference Graph: cross-references as a directed graph over record ids.
//!
//! Edges are plain id strings, so targets that have not been loaded yet are
//! simply stored and reported as unresolved. Nothing here requires the
//! corpus to be complete.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::{ContentRecord, Relationship};
use crate::validation::{Finding, FindingKind};

/// A directed, typed edge between two record ids
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub source_id: String,
    pub target_id: String,
    pub relationship: Relationship,
    #[serde(default)]
    pub label: String,
}

/// A `(sourceId, targetId)` pair whose target is not in the record set
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedEdge {
    pub source_id: String,
    pub target_id: String,
}

/// Which side of an edge a record is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// An edge seen from one of its endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeRef<'a> {
    pub direction: Direction,
    pub edge: &'a Edge,
}

type EdgeKey = (String, String, Relationship);

/// Forward and inverted adjacency over cross-references
#[derive(Debug, Clone, Default)]
pub struct ReferenceGraph {
    edges: Vec<Edge>,
    keys: HashSet<EdgeKey>,
    outgoing: HashMap<String, Vec<usize>>,
    incoming: HashMap<String, Vec<usize>>,
    /// Ids of every registered record, drafts included
    sources: HashSet<String>,
}

impl ReferenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record's outgoing edges. Targets need not exist yet.
    /// Returns the number of new edges.
    pub fn add_record(&mut self, record: &ContentRecord) -> usize {
        self.sources.insert(record.id.clone());

        let mut added = 0;
        for reference in &record.cross_references {
            if reference.target_id.trim().is_empty() {
                continue;
            }
            let edge = Edge {
                source_id: record.id.clone(),
                target_id: reference.target_id.clone(),
                relationship: reference.relationship.clone(),
                label: reference.label.clone(),
            };
            if self.insert(edge) {
                added += 1;
            }
        }
        added
    }

    fn insert(&mut self, edge: Edge) -> bool {
        let key = (
            edge.source_id.clone(),
            edge.target_id.clone(),
            edge.relationship.clone(),
        );
        if !self.keys.insert(key) {
            return false;
        }

        let idx = self.edges.len();
        self.outgoing.entry(edge.source_id.clone()).or_default().push(idx);
        self.incoming.entry(edge.target_id.clone()).or_default().push(idx);
        self.edges.push(edge);
        true
    }

    /// Distinct `(source, target)` pairs whose target fails `contains`,
    /// in insertion order
    pub fn unresolved_edges<F>(&self, contains: F) -> Vec<UnresolvedEdge>
    where
        F: Fn(&str) -> bool,
    {
        let mut seen = HashSet::new();
        self.edges
            .iter()
            .filter(|e| !contains(&e.target_id))
            .filter(|e| seen.insert((e.source_id.as_str(), e.target_id.as_str())))
            .map(|e| UnresolvedEdge {
                source_id: e.source_id.clone(),
                target_id: e.target_id.clone(),
            })
            .collect()
    }

    /// Outgoing then incoming edges for an id
    pub fn relationships_of(&self, id: &str) -> Vec<EdgeRef<'_>> {
        let outgoing = self
            .outgoing
            .get(id)
            .into_iter()
            .flatten()
            .map(|&i| EdgeRef {
                direction: Direction::Outgoing,
                edge: &self.edges[i],
            });
        let incoming = self
            .incoming
            .get(id)
            .into_iter()
            .flatten()
            .map(|&i| EdgeRef {
                direction: Direction::Incoming,
                edge: &self.edges[i],
            });

        outgoing.chain(incoming).collect()
    }

    /// Like [`relationships_of`](Self::relationships_of), keeping only edges
    /// of one relationship when `kind` is given
    pub fn relationships_of_kind(&self, id: &str, kind: Option<&Relationship>) -> Vec<EdgeRef<'_>> {
        let mut edges = self.relationships_of(id);
        if let Some(kind) = kind {
            edges.retain(|e| &e.edge.relationship == kind);
        }
        edges
    }

    /// True if the exact edge exists
    pub fn has_edge(&self, source_id: &str, target_id: &str, relationship: &Relationship) -> bool {
        self.keys.contains(&(
            source_id.to_string(),
            target_id.to_string(),
            relationship.clone(),
        ))
    }

    /// Parent/child/sibling edges whose registered target does not declare
    /// the inverse edge back. Reported, never corrected.
    pub fn asymmetries(&self) -> Vec<Finding> {
        self.edges
            .iter()
            .filter(|e| self.sources.contains(&e.target_id) && e.source_id != e.target_id)
            .filter_map(|e| {
                let inverse = e.relationship.inverse()?;
                if self.has_edge(&e.target_id, &e.source_id, &inverse) {
                    return None;
                }
                Some(Finding::warning(
                    FindingKind::AsymmetricReference,
                    format!("{}.crossReferences", e.source_id),
                    format!(
                        "'{}' declares '{}' as {} but '{}' has no {} edge back",
                        e.source_id, e.target_id, e.relationship, e.target_id, inverse
                    ),
                ))
            })
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of registered records
    pub fn node_count(&self) -> usize {
        self.sources.len()
    }

    pub fn contains_record(&self, id: &str) -> bool {
        self.sources.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContentType, CrossReference};

    fn record(id: &str, refs: &[(&str, Relationship)]) -> ContentRecord {
        refs.iter().fold(
            ContentRecord::new(id, id, ContentType::Condition),
            |r, (target, rel)| r.with_cross_reference(CrossReference::new(*target, rel.clone())),
        )
    }

    #[test]
    fn test_add_record_dedupes_edges() {
        let mut graph = ReferenceGraph::new();
        let a = record(
            "a",
            &[
                ("b", Relationship::Sibling),
                ("b", Relationship::Sibling),
                ("b", Relationship::Related),
                ("", Relationship::Related),
            ],
        );

        assert_eq!(graph.add_record(&a), 2);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_unresolved_pairs_are_distinct() {
        let mut graph = ReferenceGraph::new();
        graph.add_record(&record(
            "a",
            &[("z", Relationship::Sibling), ("z", Relationship::Related), ("b", Relationship::Related)],
        ));

        let known = ["a", "b"];
        let unresolved = graph.unresolved_edges(|id| known.contains(&id));
        assert_eq!(
            unresolved,
            vec![UnresolvedEdge {
                source_id: "a".to_string(),
                target_id: "z".to_string()
            }]
        );
    }

    #[test]
    fn test_relationships_of_includes_incoming() {
        let mut graph = ReferenceGraph::new();
        graph.add_record(&record("a", &[("b", Relationship::Parent)]));
        graph.add_record(&record("c", &[("a", Relationship::Related)]));

        let rels = graph.relationships_of("a");
        assert_eq!(rels.len(), 2);
        assert_eq!(rels[0].direction, Direction::Outgoing);
        assert_eq!(rels[0].edge.target_id, "b");
        assert_eq!(rels[1].direction, Direction::Incoming);
        assert_eq!(rels[1].edge.source_id, "c");

        assert!(graph.relationships_of("nobody").is_empty());
    }

    #[test]
    fn test_relationships_filtered_by_kind() {
        let mut graph = ReferenceGraph::new();
        graph.add_record(&record("a", &[("b", Relationship::Parent), ("c", Relationship::Related)]));
        graph.add_record(&record("d", &[("a", Relationship::Related)]));

        let related = graph.relationships_of_kind("a", Some(&Relationship::Related));
        assert_eq!(related.len(), 2);
        assert!(related.iter().all(|e| e.edge.relationship == Relationship::Related));

        let parents = graph.relationships_of_kind("a", Some(&Relationship::Parent));
        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].edge.target_id, "b");

        assert_eq!(graph.relationships_of_kind("a", None).len(), 3);
    }

    #[test]
    fn test_asymmetry_reported_not_corrected() {
        let mut graph = ReferenceGraph::new();
        graph.add_record(&record("a", &[("b", Relationship::Sibling), ("c", Relationship::Parent)]));
        graph.add_record(&record("b", &[]));
        graph.add_record(&record("c", &[("a", Relationship::Child)]));

        let findings = graph.asymmetries();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::AsymmetricReference);
        assert!(findings[0].message.contains("'b'"));
        assert!(!graph.has_edge("b", "a", &Relationship::Sibling));
    }

    #[test]
    fn test_asymmetry_ignores_unregistered_targets() {
        let mut graph = ReferenceGraph::new();
        graph.add_record(&record("a", &[("ghost", Relationship::Sibling)]));
        assert!(graph.asymmetries().is_empty());
    }
}
