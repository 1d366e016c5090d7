//! Record validation
//!
//! A pure check of a candidate record. Hard errors block a mutation;
//! warnings are reported back so the caller can decide whether to go on.

use serde::Serialize;
use thiserror::Error;

use crate::models::RecordDraft;

/// Titles shorter than this draw a warning
pub const MIN_TITLE_CHARS: usize = 3;

/// Bodies shorter than this draw a warning
pub const MIN_BODY_CHARS: usize = 10;

/// Outcome of validating a candidate record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Validation {
    /// True when there are no hard errors; warnings never affect this
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convert into the warnings on success, or a `ValidationError`
    pub fn into_result(self) -> Result<Vec<String>, ValidationError> {
        if self.is_valid() {
            Ok(self.warnings)
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}

/// Hard validation failure; carries every error message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Validation failed: {}", .errors.join(", "))]
pub struct ValidationError {
    pub errors: Vec<String>,
}

/// Validate a candidate record
pub fn validate(draft: &RecordDraft) -> Validation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if draft.title.trim().is_empty() {
        errors.push("Title is required".to_string());
    }
    if draft.body.trim().is_empty() {
        errors.push("Content is required".to_string());
    }
    if draft.kind.is_none() {
        errors.push("Content type is required".to_string());
    }
    if draft.metadata.author.trim().is_empty() {
        errors.push("Author is required".to_string());
    }

    if !draft.title.is_empty() && draft.title.chars().count() < MIN_TITLE_CHARS {
        warnings.push(format!(
            "Title should be at least {} characters",
            MIN_TITLE_CHARS
        ));
    }
    if !draft.body.is_empty() && draft.body.chars().count() < MIN_BODY_CHARS {
        warnings.push("Content should be more descriptive".to_string());
    }
    if draft.metadata.tags.is_empty() {
        warnings.push("Consider adding tags for better organization".to_string());
    }

    Validation { errors, warnings }
}
