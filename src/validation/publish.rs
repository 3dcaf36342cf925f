//! Record lifecycle: draft -> published, and revisions.
//!
//! Transitions never mutate the caller's record; they return an updated copy
//! or the validation result that blocked them.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::findings::ValidationResult;
use super::rules::Validator;
use crate::domain::{ContentRecord, Status};

/// A lifecycle transition was refused
#[derive(Debug, Clone, Error)]
#[error("Record '{id}' cannot be published: {} blocking finding(s)", .result.error_count())]
pub struct PublishRejected {
    pub id: String,
    pub result: ValidationResult,
}

impl Validator {
    /// Promote a record to `published` if it passes every check
    pub fn publish(
        &self,
        record: &ContentRecord,
        now: DateTime<Utc>,
    ) -> Result<ContentRecord, PublishRejected> {
        let result = self.validate_for_publish(record);
        if !result.ok {
            tracing::debug!(id = %record.id, errors = result.error_count(), "Publish rejected");
            return Err(PublishRejected {
                id: record.id.clone(),
                result,
            });
        }

        let mut published = record.clone();
        if published.status != Status::Published {
            published.status = Status::Published;
            published.updated_at = Some(now);
        }
        Ok(published)
    }

    /// Apply an edit, bump the version and refresh `updatedAt`.
    ///
    /// Published records are re-validated; an edit that breaks them is
    /// refused. Drafts may be left in any state.
    pub fn revise<F>(
        &self,
        record: &ContentRecord,
        now: DateTime<Utc>,
        edit: F,
    ) -> Result<ContentRecord, PublishRejected>
    where
        F: FnOnce(&mut ContentRecord),
    {
        let mut revised = record.clone();
        edit(&mut revised);

        // Identity is immutable once published
        if record.status == Status::Published {
            revised.id = record.id.clone();
        }
        revised.version = record.version.saturating_add(1);
        revised.updated_at = Some(now);

        if revised.status == Status::Published {
            let result = self.validate(&revised);
            if !result.ok {
                return Err(PublishRejected {
                    id: revised.id,
                    result,
                });
            }
        }

        Ok(revised)
    }
}
