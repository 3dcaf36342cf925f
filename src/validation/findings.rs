//! Validation findings and results.
//!
//! Findings are data, not errors: the validator reports every problem it can
//! see so authoring tools get complete feedback in one pass.

use serde::{Deserialize, Serialize};

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Reported but does not block publishing
    Warning,
    /// Blocks publishing
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Stable machine-readable code for a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    EmptyId,
    InvalidIdFormat,
    EmptyName,
    UnknownContentType,
    MissingLevel,
    UnexpectedLevel,
    LevelMismatch,
    EmptySummary,
    EmptyExplanation,
    NoKeyTerms,
    EmptyKeyTerm,
    DuplicateKeyTerm,
    EmptyDefinition,
    MissingClinicalNotes,
    PlaceholderText,
    EmptyCitationId,
    DuplicateCitationId,
    EmptyCitationTitle,
    EmptyReferenceTarget,
    UnknownRelationship,
    SelfReference,
    AsymmetricReference,
    UnknownClinicalRelevance,
    UnknownExamType,
    EmptyShelfExam,
    SuspectIcdCode,
    DuplicateMediaId,
    InvalidVersion,
    MissingTimestamp,
    TimestampOrder,
    PublishedWithErrors,
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Path of the offending field (e.g. `levels.3.summary`)
    pub field: String,

    pub message: String,

    pub severity: Severity,

    pub kind: FindingKind,
}

impl Finding {
    pub fn error(kind: FindingKind, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Error,
            kind,
        }
    }

    pub fn warning(kind: FindingKind, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Warning,
            kind,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.field, self.message)
    }
}

/// Outcome of validating one record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True when there are no error-severity findings
    pub ok: bool,

    pub findings: Vec<Finding>,
}

impl ValidationResult {
    pub fn from_findings(findings: Vec<Finding>) -> Self {
        let ok = !findings.iter().any(Finding::is_error);
        Self { ok, findings }
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| !f.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// True if any finding has the given kind
    pub fn has(&self, kind: FindingKind) -> bool {
        self.findings.iter().any(|f| f.kind == kind)
    }
}
