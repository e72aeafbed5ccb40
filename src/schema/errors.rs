//! Schema error types
//!
//! Error codes:
//! - FORM_SCHEMA_MALFORMED (FATAL when loading, REJECT otherwise)
//! - FORM_SCHEMA_INTEGRITY_FAILED (REJECT)
//! - FORM_UNKNOWN_SCHEMA (REJECT)
//! - FORM_SCHEMA_IMMUTABLE (REJECT)
//!
//! Integrity violations found while checking a raw definition are typed as
//! [`SchemaViolation`]; their display text is what callers receive.

use std::fmt;

use thiserror::Error;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Request rejected, caller may fix and retry
    Reject,
    /// Registry cannot be brought up
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Broad class of a validation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// The form definition itself is malformed
    SchemaStructure,
    /// A response field failed required/type/constraint checks
    FieldValidation,
    /// An admin-authored pattern does not compile
    PatternCompilation,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::SchemaStructure => "SCHEMA_STRUCTURE",
            ViolationKind::FieldValidation => "FIELD_VALIDATION",
            ViolationKind::PatternCompilation => "PATTERN_COMPILATION",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single integrity problem in a raw form definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("Form schema must be an object")]
    NotAnObject,

    #[error("Form title is required and must be a non-empty string")]
    MissingTitle,

    #[error("Form fields must be an array")]
    FieldsNotArray,

    #[error("Form must have at least one field")]
    NoFields,

    #[error("Field at index {index} must be an object")]
    FieldNotObject { index: usize },

    #[error("Field at index {index}: id is required and must be a non-empty string")]
    MissingFieldId { index: usize },

    #[error("Field at index {index}: label is required and must be a non-empty string")]
    MissingFieldLabel { index: usize },

    #[error("Field at index {index}: type must be one of: {valid}")]
    InvalidFieldType { index: usize, valid: String },

    #[error("Field at index {index}: {field_type} fields must have a non-empty options array")]
    MissingOptions { index: usize, field_type: String },

    #[error("Field at index {index}, option {option}: option must be an object")]
    OptionNotObject { index: usize, option: usize },

    #[error("Field at index {index}, option {option}: value is required")]
    MissingOptionValue { index: usize, option: usize },

    #[error("Field at index {index}, option {option}: label is required and must be a non-empty string")]
    MissingOptionLabel { index: usize, option: usize },

    #[error("Duplicate field id: \"{id}\"")]
    DuplicateFieldId { id: String },
}

impl SchemaViolation {
    /// Stable code for the violation
    pub fn code(&self) -> &'static str {
        match self {
            SchemaViolation::NotAnObject => "FORM_SCHEMA_NOT_OBJECT",
            SchemaViolation::MissingTitle => "FORM_SCHEMA_MISSING_TITLE",
            SchemaViolation::FieldsNotArray => "FORM_SCHEMA_FIELDS_NOT_ARRAY",
            SchemaViolation::NoFields => "FORM_SCHEMA_NO_FIELDS",
            SchemaViolation::FieldNotObject { .. } => "FORM_SCHEMA_FIELD_NOT_OBJECT",
            SchemaViolation::MissingFieldId { .. } => "FORM_SCHEMA_MISSING_FIELD_ID",
            SchemaViolation::MissingFieldLabel { .. } => "FORM_SCHEMA_MISSING_FIELD_LABEL",
            SchemaViolation::InvalidFieldType { .. } => "FORM_SCHEMA_INVALID_FIELD_TYPE",
            SchemaViolation::MissingOptions { .. } => "FORM_SCHEMA_MISSING_OPTIONS",
            SchemaViolation::OptionNotObject { .. } => "FORM_SCHEMA_OPTION_NOT_OBJECT",
            SchemaViolation::MissingOptionValue { .. } => "FORM_SCHEMA_MISSING_OPTION_VALUE",
            SchemaViolation::MissingOptionLabel { .. } => "FORM_SCHEMA_MISSING_OPTION_LABEL",
            SchemaViolation::DuplicateFieldId { .. } => "FORM_SCHEMA_DUPLICATE_ID",
        }
    }

    pub fn kind(&self) -> ViolationKind {
        ViolationKind::SchemaStructure
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Schema file unreadable or not a valid definition
    FormSchemaMalformed,
    /// Definition failed the integrity check
    FormSchemaIntegrityFailed,
    /// No schema registered under the key
    FormUnknownSchema,
    /// Attempt to replace an activated schema
    FormSchemaImmutable,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::FormSchemaMalformed => "FORM_SCHEMA_MALFORMED",
            SchemaErrorCode::FormSchemaIntegrityFailed => "FORM_SCHEMA_INTEGRITY_FAILED",
            SchemaErrorCode::FormUnknownSchema => "FORM_UNKNOWN_SCHEMA",
            SchemaErrorCode::FormSchemaImmutable => "FORM_SCHEMA_IMMUTABLE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::FormSchemaMalformed => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    /// Schema key if applicable
    key: Option<String>,
    /// Every integrity violation, for FORM_SCHEMA_INTEGRITY_FAILED
    violations: Vec<String>,
}

impl SchemaError {
    /// Create an error for a schema file that cannot be read or parsed
    pub fn malformed_schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::FormSchemaMalformed,
            message: format!("Malformed schema '{}': {}", path.into(), reason.into()),
            key: None,
            violations: Vec::new(),
        }
    }

    /// Create an integrity failure carrying every violation found
    pub fn integrity_failed(violations: Vec<String>) -> Self {
        Self {
            code: SchemaErrorCode::FormSchemaIntegrityFailed,
            message: format!("Form schema failed {} integrity check(s)", violations.len()),
            key: None,
            violations,
        }
    }

    /// Create an unknown schema error
    pub fn unknown_schema(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            code: SchemaErrorCode::FormUnknownSchema,
            message: format!("Form schema '{}' not found", key),
            key: Some(key),
            violations: Vec::new(),
        }
    }

    /// Create a schema immutable error
    pub fn schema_immutable(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            code: SchemaErrorCode::FormSchemaImmutable,
            message: format!("Form schema '{}' is already active and cannot be replaced", key),
            key: Some(key),
            violations: Vec::new(),
        }
    }

    /// Attach the registry key the error concerns
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)?;
        if !self.violations.is_empty() {
            write!(f, " ({})", self.violations.join("; "))?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
