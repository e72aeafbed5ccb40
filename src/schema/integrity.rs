//! Integrity checking of raw form definitions
//!
//! A definition must pass this check before it may be activated. The check
//! never stops at the first problem: every violation is collected so an
//! author sees the complete list in one pass. Only two structural gates end
//! the pass early:
//! - the definition is not an object
//! - `fields` is not an array

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::SchemaViolation;
use super::types::FieldType;

/// Outcome of a schema integrity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_violations(violations: &[SchemaViolation]) -> Self {
        Self {
            is_valid: violations.is_empty(),
            errors: violations.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Stateless checker for raw form definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaIntegrityChecker;

impl SchemaIntegrityChecker {
    pub fn new() -> Self {
        Self
    }

    /// Checks a raw definition and reports every violation as a message.
    pub fn validate_form_schema(&self, raw: &Value) -> ValidationResult {
        ValidationResult::from_violations(&self.violations(raw))
    }

    /// Checks a raw definition and returns the typed violations.
    pub fn violations(&self, raw: &Value) -> Vec<SchemaViolation> {
        let mut violations = Vec::new();

        let schema = match raw.as_object() {
            Some(obj) => obj,
            None => {
                violations.push(SchemaViolation::NotAnObject);
                return violations;
            }
        };

        if non_blank_str(schema.get("title")).is_none() {
            violations.push(SchemaViolation::MissingTitle);
        }

        let fields = match schema.get("fields").and_then(Value::as_array) {
            Some(fields) => fields,
            None => {
                violations.push(SchemaViolation::FieldsNotArray);
                return violations;
            }
        };

        if fields.is_empty() {
            violations.push(SchemaViolation::NoFields);
        }

        let mut seen_ids = HashSet::new();
        for (index, field) in fields.iter().enumerate() {
            let Some(field) = field.as_object() else {
                violations.push(SchemaViolation::FieldNotObject { index });
                continue;
            };

            check_field(index, field, &mut violations);

            if let Some(id) = non_blank_str(field.get("id")) {
                if !seen_ids.insert(id) {
                    violations.push(SchemaViolation::DuplicateFieldId { id: id.to_string() });
                }
            }
        }

        violations
    }
}

/// Convenience wrapper over [`SchemaIntegrityChecker::validate_form_schema`].
pub fn validate_form_schema(raw: &Value) -> ValidationResult {
    SchemaIntegrityChecker::new().validate_form_schema(raw)
}

fn check_field(index: usize, field: &Map<String, Value>, violations: &mut Vec<SchemaViolation>) {
    if non_blank_str(field.get("id")).is_none() {
        violations.push(SchemaViolation::MissingFieldId { index });
    }

    if non_blank_str(field.get("label")).is_none() {
        violations.push(SchemaViolation::MissingFieldLabel { index });
    }

    let field_type = field
        .get("type")
        .and_then(Value::as_str)
        .and_then(FieldType::from_name);

    let Some(field_type) = field_type else {
        violations.push(SchemaViolation::InvalidFieldType {
            index,
            valid: FieldType::valid_names(),
        });
        return;
    };

    if !field_type.requires_options() {
        return;
    }

    let options = match field.get("options").and_then(Value::as_array) {
        Some(options) if !options.is_empty() => options,
        _ => {
            violations.push(SchemaViolation::MissingOptions {
                index,
                field_type: field_type.type_name().to_string(),
            });
            return;
        }
    };

    for (option, entry) in options.iter().enumerate() {
        let Some(entry) = entry.as_object() else {
            violations.push(SchemaViolation::OptionNotObject { index, option });
            continue;
        };

        if entry.get("value").map_or(true, Value::is_null) {
            violations.push(SchemaViolation::MissingOptionValue { index, option });
        }

        if non_blank_str(entry.get("label")).is_none() {
            violations.push(SchemaViolation::MissingOptionLabel { index, option });
        }
    }
}

/// Returns the string if present, a string, and not blank.
fn non_blank_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}
