//! Domain types for the content repository.
//!
//! This module contains the core data structures:
//! - ContentRecord: one topic with five levels of explanation
//! - LevelContent: a single explanation tier
//! - ContentTags: indexing tags
//! - Tier: audience metadata for each level

pub mod level;
pub mod record;
pub mod tags;
pub mod tier;

// Re-export commonly used types
pub use level::{KeyTerm, LevelContent, LevelNumber, Levels, TextBlock};
pub use record::{
    Citation, CitationType, ContentRecord, ContentType, CrossReference, Media, Relationship, Status,
};
pub use tags::{ClinicalRelevance, ContentTags, ExamRelevance};
pub use tier::Tier;
