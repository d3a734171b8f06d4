//! Extraction and validation errors

use thiserror::Error;

/// Longest fragment of model output kept in a diagnostic
const MAX_FRAGMENT_CHARS: usize = 500;

/// Why a model response could not be turned into a `TripPlan`
#[derive(Debug, Error, PartialEq)]
pub enum ExtractError {
    /// No JSON object found, or the candidate text is not valid JSON
    #[error("Malformed output: {reason}")]
    MalformedOutput {
        reason: String,
        /// The offending substring, truncated (diagnostics only)
        fragment: Option<String>,
    },

    /// JSON is present but does not satisfy the plan schema
    #[error("Schema violation at '{field}': expected {expected}")]
    SchemaViolation { field: String, expected: String },
}

impl ExtractError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedOutput {
            reason: reason.into(),
            fragment: None,
        }
    }

    pub fn malformed_with_fragment(reason: impl Into<String>, fragment: &str) -> Self {
        let fragment = if fragment.chars().count() > MAX_FRAGMENT_CHARS {
            let head: String = fragment.chars().take(MAX_FRAGMENT_CHARS).collect();
            format!("{}...", head)
        } else {
            fragment.to_string()
        };
        Self::MalformedOutput {
            reason: reason.into(),
            fragment: Some(fragment),
        }
    }

    pub fn violation(field: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::SchemaViolation {
            field: field.into(),
            expected: expected.into(),
        }
    }
}
