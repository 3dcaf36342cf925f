//! Validation Layer: decides whether a candidate record may be published.
//!
//! Validation is a pure function. It never panics on malformed input and
//! reports every problem as a [`Finding`], distinguishing blocking errors
//! from advisory warnings.

pub mod findings;
pub mod publish;
pub mod rules;

pub use findings::{Finding, FindingKind, Severity, ValidationResult};
pub use publish::PublishRejected;
pub use rules::{is_valid_id, validate, ValidationSettings, Validator};
