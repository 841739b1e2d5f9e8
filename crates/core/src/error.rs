use serde::Serialize;

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Form field name, e.g. `"label_width"`.
    pub field: String,
    /// Machine-readable rule code, e.g. `"range"` or `"not_a_number"`.
    pub code: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
        }
    }

    pub fn not_a_number(field: &str) -> Self {
        Self::new(field, "not_a_number")
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {}", describe(.0))]
    ValidationFailed(Vec<FieldViolation>),

    #[error("Invalid page dimension: {field} must be a positive number")]
    InvalidDimension { field: &'static str },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("A submission is already in flight for this form")]
    SubmissionInFlight,
}

impl CoreError {
    pub fn violation(field: &str, code: &str) -> Self {
        Self::ValidationFailed(vec![FieldViolation::new(field, code)])
    }

    /// `true` for every failure the user fixes by correcting form input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationFailed(_) | Self::InvalidDimension { .. }
        )
    }
}

fn describe(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{} ({})", v.field, v.code))
        .collect::<Vec<_>>()
        .join(", ")
}
