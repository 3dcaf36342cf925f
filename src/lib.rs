//! tierbook - Tiered knowledge-content repository
//!
//! Stores medical knowledge records written at five reading levels, from a
//! child's explanation up to a physician's, and serves them to renderers.
//!
//! # Architecture
//!
//! Content flows through a one-shot build:
//! - Records are loaded from JSON/YAML files in a corpus directory
//! - Every record is validated; findings never abort the build
//! - Cross-references are collected into a reference graph
//! - Published, valid records are indexed by id, category and tag
//!
//! The resulting [`Catalog`] is immutable. Hot reload builds a new one and
//! swaps it into a [`SharedCatalog`].
//!
//! # Modules
//!
//! - `domain`: Data structures (ContentRecord, Levels, Tags, Tier)
//! - `validation`: Structural checks and the publish lifecycle
//! - `graph`: Cross-reference graph
//! - `library`: Index, catalog, corpus store and watcher
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Check every file in the corpus
//! tierbook validate
//!
//! # Look up a record at one level
//! tierbook show condition-asthma --level 2
//!
//! # Find dangling cross-references
//! tierbook graph unresolved
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod graph;
pub mod library;
pub mod validation;

// Re-export main types at crate root for convenience
pub use domain::{ContentRecord, ContentType, LevelContent, LevelNumber, Levels, Status, Tier};
pub use graph::ReferenceGraph;
pub use library::{Catalog, ContentIndex, CorpusStore, CorpusWatcher, IndexError, NotFound, SharedCatalog};
pub use validation::{validate, Finding, FindingKind, Severity, ValidationResult, Validator};
