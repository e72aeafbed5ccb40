//! Per-field violation taxonomy
//!
//! The display text of a violation is the message surfaced to submitters.

use thiserror::Error;

use crate::schema::ViolationKind;

/// A response field that failed required, type, or constraint checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldViolation {
    #[error("The field \"{label}\" is required")]
    Required { label: String },

    #[error("The field \"{label}\" must be a valid email")]
    InvalidEmail { label: String },

    #[error("The field \"{label}\" must be a valid number")]
    InvalidNumber { label: String },

    #[error("The field \"{label}\" must be a valid date")]
    InvalidDate { label: String },

    #[error("The field \"{label}\" must be a valid time (HH:MM)")]
    InvalidTime { label: String },

    #[error("The selected value for \"{label}\" is not valid")]
    InvalidChoice { label: String },

    #[error("The field \"{label}\" contains invalid options: {invalid}")]
    InvalidOptions { label: String, invalid: String },

    #[error("The field \"{label}\" must be a boolean or a list of options")]
    InvalidCheckbox { label: String },

    #[error("The field \"{label}\" must reference an uploaded file")]
    InvalidFile { label: String },

    #[error("The field \"{label}\" must be text")]
    InvalidText { label: String },

    #[error("The field \"{label}\" must be at least {min} characters")]
    TooShort { label: String, min: String },

    #[error("The field \"{label}\" must be at most {max} characters")]
    TooLong { label: String, max: String },

    #[error("The field \"{label}\" must be at least {min}")]
    BelowMinimum { label: String, min: String },

    #[error("The field \"{label}\" must be at most {max}")]
    AboveMaximum { label: String, max: String },

    #[error("{}", mismatch_text(.label, .message))]
    PatternMismatch { label: String, message: Option<String> },

    #[error("Invalid validation pattern configured for this field (\"{label}\"): {reason}")]
    InvalidPattern { label: String, reason: String },
}

fn mismatch_text(label: &str, message: &Option<String>) -> String {
    match message {
        Some(custom) if !custom.trim().is_empty() => custom.clone(),
        _ => format!("The field \"{}\" does not match the required format", label),
    }
}

impl FieldViolation {
    /// Stable code for the violation
    pub fn code(&self) -> &'static str {
        match self {
            FieldViolation::Required { .. } => "FORM_FIELD_REQUIRED",
            FieldViolation::InvalidEmail { .. } => "FORM_FIELD_INVALID_EMAIL",
            FieldViolation::InvalidNumber { .. } => "FORM_FIELD_INVALID_NUMBER",
            FieldViolation::InvalidDate { .. } => "FORM_FIELD_INVALID_DATE",
            FieldViolation::InvalidTime { .. } => "FORM_FIELD_INVALID_TIME",
            FieldViolation::InvalidChoice { .. } => "FORM_FIELD_INVALID_CHOICE",
            FieldViolation::InvalidOptions { .. } => "FORM_FIELD_INVALID_OPTIONS",
            FieldViolation::InvalidCheckbox { .. } => "FORM_FIELD_INVALID_CHECKBOX",
            FieldViolation::InvalidFile { .. } => "FORM_FIELD_INVALID_FILE",
            FieldViolation::InvalidText { .. } => "FORM_FIELD_INVALID_TEXT",
            FieldViolation::TooShort { .. } => "FORM_FIELD_TOO_SHORT",
            FieldViolation::TooLong { .. } => "FORM_FIELD_TOO_LONG",
            FieldViolation::BelowMinimum { .. } => "FORM_FIELD_BELOW_MINIMUM",
            FieldViolation::AboveMaximum { .. } => "FORM_FIELD_ABOVE_MAXIMUM",
            FieldViolation::PatternMismatch { .. } => "FORM_FIELD_PATTERN_MISMATCH",
            FieldViolation::InvalidPattern { .. } => "FORM_FIELD_INVALID_PATTERN",
        }
    }

    pub fn kind(&self) -> ViolationKind {
        match self {
            FieldViolation::InvalidPattern { .. } => ViolationKind::PatternCompilation,
            _ => ViolationKind::FieldValidation,
        }
    }
}
