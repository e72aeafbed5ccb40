//! Result types returned by the field and response validators

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::violations::FieldViolation;

/// Outcome of validating one field value.
///
/// `error` is present iff the value was rejected, `sanitized_value` iff it
/// was accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidationResult {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sanitized_value: Option<Value>,
    /// Typed cause of the rejection
    #[serde(skip)]
    pub violation: Option<FieldViolation>,
}

impl FieldValidationResult {
    pub fn valid(sanitized_value: Value) -> Self {
        Self {
            is_valid: true,
            error: None,
            sanitized_value: Some(sanitized_value),
            violation: None,
        }
    }

    pub fn invalid(violation: FieldViolation) -> Self {
        Self {
            is_valid: false,
            error: Some(violation.to_string()),
            sanitized_value: None,
            violation: Some(violation),
        }
    }
}

impl From<Result<Value, FieldViolation>> for FieldValidationResult {
    fn from(outcome: Result<Value, FieldViolation>) -> Self {
        match outcome {
            Ok(value) => Self::valid(value),
            Err(violation) => Self::invalid(violation),
        }
    }
}

/// Outcome of validating a whole response against a form.
///
/// `sanitized_data` holds only the fields that validated; a rejected field
/// is absent rather than null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub sanitized_data: Map<String, Value>,
}

impl FormValidationResult {
    /// Message returned when the schema has no usable field list.
    pub const INVALID_SCHEMA: &'static str = "invalid form schema";

    /// Result for a schema that cannot be used at all.
    pub fn invalid_schema() -> Self {
        Self {
            is_valid: false,
            errors: vec![Self::INVALID_SCHEMA.to_string()],
            warnings: Vec::new(),
            sanitized_data: Map::new(),
        }
    }
}
