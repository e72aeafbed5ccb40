//! Per-field validation
//!
//! Stages, in order, each stopping on the first failure:
//! 1. Emptiness: optional empty fields take their default, required ones fail
//! 2. Type check, dispatched on the field type
//! 3. Constraints: length or numeric range, then pattern
//! 4. Sanitizing of the accepted value
//!
//! Compiled field patterns are cached per validator (and shared by its
//! clones), so a long-running caller compiles each distinct pattern once.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use serde_json::Value;

use super::result::FieldValidationResult;
use super::sanitize::{coerce_number, get_default_value, is_empty, parse_date, sanitize_value};
use super::violations::FieldViolation;
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{FieldType, FieldValidation, FormField};

/// Default compiled-size limit for admin-authored patterns (1 MiB).
pub const DEFAULT_PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Distinct patterns kept compiled per validator; later ones compile per call.
pub const PATTERN_CACHE_CAPACITY: usize = 512;

lazy_static! {
    /// Deliberately loose address shape: something@something.tld
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();

    /// 24-hour HH:MM
    static ref TIME_REGEX: Regex = Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").unwrap();
}

/// Successfully compiled patterns, keyed by source text.
///
/// Failed compiles are not cached; each attempt is rejected and logged again.
#[derive(Debug, Default)]
struct PatternCache {
    compiled: RwLock<HashMap<String, Regex>>,
}

impl PatternCache {
    fn get(&self, pattern: &str) -> Option<Regex> {
        self.compiled.read().ok()?.get(pattern).cloned()
    }

    fn insert(&self, pattern: &str, regex: &Regex) {
        if let Ok(mut compiled) = self.compiled.write() {
            if compiled.len() < PATTERN_CACHE_CAPACITY {
                compiled.insert(pattern.to_string(), regex.clone());
            }
        }
    }

    fn len(&self) -> usize {
        self.compiled.read().map_or(0, |compiled| compiled.len())
    }
}

/// Validates single field values.
///
/// Holds configuration and the compiled-pattern cache only; no per-call
/// state, so one validator may be shared across threads.
#[derive(Debug, Clone)]
pub struct FieldValidator {
    pattern_size_limit: usize,
    patterns: Arc<PatternCache>,
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self {
            pattern_size_limit: DEFAULT_PATTERN_SIZE_LIMIT,
            patterns: Arc::default(),
        }
    }
}

impl FieldValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the compiled size of field patterns.
    pub fn with_pattern_size_limit(mut self, limit: usize) -> Self {
        self.pattern_size_limit = limit;
        // Patterns compiled under the old limit no longer apply.
        self.patterns = Arc::default();
        self
    }

    pub fn pattern_size_limit(&self) -> usize {
        self.pattern_size_limit
    }

    /// Number of patterns currently held compiled
    pub fn cached_patterns(&self) -> usize {
        self.patterns.len()
    }

    /// Validates `value` (absent when `None`) against `field`.
    pub fn validate_field(
        &self,
        field: &FormField,
        value: Option<&Value>,
    ) -> FieldValidationResult {
        self.check(field, value).into()
    }

    /// Validates `value` against a raw field definition that does not read
    /// as a typed field (unknown or absent `type`, missing `label`, ...).
    ///
    /// Emptiness and constraint checks still apply. An accepted value is
    /// passed through unchanged; an empty optional one takes the
    /// definition's `defaultValue`, or null.
    pub fn validate_untyped_field(
        &self,
        definition: &Value,
        value: Option<&Value>,
    ) -> FieldValidationResult {
        self.check_untyped(&untyped_shape(definition), value).into()
    }

    fn check(&self, field: &FormField, value: Option<&Value>) -> Result<Value, FieldViolation> {
        let value = match value {
            Some(v) if !is_empty(Some(v)) => v,
            _ if field.required => {
                return Err(FieldViolation::Required {
                    label: field.label.clone(),
                })
            }
            _ => return Ok(get_default_value(field)),
        };

        validate_by_type(field, value)?;

        if let Some(rules) = &field.validation {
            self.validate_constraints(field, rules, value)?;
        }

        Ok(sanitize_value(field, value))
    }

    fn check_untyped(
        &self,
        shape: &FormField,
        value: Option<&Value>,
    ) -> Result<Value, FieldViolation> {
        let value = match value {
            Some(v) if !is_empty(Some(v)) => v,
            _ if shape.required => {
                return Err(FieldViolation::Required {
                    label: shape.label.clone(),
                })
            }
            _ => return Ok(shape.default_value.clone().unwrap_or(Value::Null)),
        };

        if let Some(rules) = &shape.validation {
            self.validate_constraints(shape, rules, value)?;
        }

        Ok(value.clone())
    }

    fn validate_constraints(
        &self,
        field: &FormField,
        rules: &FieldValidation,
        value: &Value,
    ) -> Result<(), FieldViolation> {
        let label = || field.label.clone();

        if field.field_type == FieldType::Number {
            if let Some(n) = coerce_number(value) {
                if let Some(min) = rules.min.filter(|min| n < *min) {
                    return Err(FieldViolation::BelowMinimum {
                        label: label(),
                        min: min.to_string(),
                    });
                }
                if let Some(max) = rules.max.filter(|max| n > *max) {
                    return Err(FieldViolation::AboveMaximum {
                        label: label(),
                        max: max.to_string(),
                    });
                }
            }
        } else if let Value::String(s) = value {
            let len = s.chars().count() as f64;
            if let Some(min) = rules.min.filter(|min| len < *min) {
                return Err(FieldViolation::TooShort {
                    label: label(),
                    min: min.to_string(),
                });
            }
            if let Some(max) = rules.max.filter(|max| len > *max) {
                return Err(FieldViolation::TooLong {
                    label: label(),
                    max: max.to_string(),
                });
            }
        }

        if let (Some(pattern), Value::String(s)) = (&rules.pattern, value) {
            let regex = self.compile_pattern(field, pattern)?;
            if !regex.is_match(s) {
                return Err(FieldViolation::PatternMismatch {
                    label: label(),
                    message: rules.message.clone(),
                });
            }
        }

        Ok(())
    }

    /// Compiles an untrusted pattern; failure becomes a field violation.
    fn compile_pattern(&self, field: &FormField, pattern: &str) -> Result<Regex, FieldViolation> {
        if let Some(regex) = self.patterns.get(pattern) {
            return Ok(regex);
        }

        let regex = RegexBuilder::new(pattern)
            .size_limit(self.pattern_size_limit)
            .build()
            .map_err(|e| {
                let reason = e.to_string();
                log_event_with_fields(
                    Event::PatternRejected,
                    &[
                        ("field", field.id.as_str()),
                        ("pattern", pattern),
                        ("reason", reason.as_str()),
                    ],
                );
                FieldViolation::InvalidPattern {
                    label: field.label.clone(),
                    reason,
                }
            })?;

        self.patterns.insert(pattern, &regex);
        Ok(regex)
    }
}

/// Convenience wrapper using the default configuration.
pub fn validate_field(field: &FormField, value: Option<&Value>) -> FieldValidationResult {
    FieldValidator::default().validate_field(field, value)
}

/// Constraint-bearing stand-in for an untyped definition.
///
/// Typed as text: every non-number type applies `min`/`max` to string
/// length, which is what an untyped field gets.
fn untyped_shape(definition: &Value) -> FormField {
    let id = non_blank(definition, "id").unwrap_or_default();
    let label = non_blank(definition, "label").unwrap_or(id);

    let mut shape = FormField::new(id, FieldType::Text, label);
    shape.required = definition
        .get("required")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    shape.validation = definition
        .get("validation")
        .and_then(|v| serde_json::from_value(v.clone()).ok());
    shape.default_value = definition
        .get("defaultValue")
        .filter(|v| !v.is_null())
        .cloned();
    shape
}

fn non_blank<'a>(definition: &'a Value, key: &str) -> Option<&'a str> {
    definition
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Type check of a non-empty value.
fn validate_by_type(field: &FormField, value: &Value) -> Result<(), FieldViolation> {
    let label = || field.label.clone();

    match field.field_type {
        FieldType::Email => match value {
            Value::String(s) if EMAIL_REGEX.is_match(s.trim()) => Ok(()),
            _ => Err(FieldViolation::InvalidEmail { label: label() }),
        },
        FieldType::Number => match coerce_number(value) {
            Some(_) => Ok(()),
            None => Err(FieldViolation::InvalidNumber { label: label() }),
        },
        FieldType::Date => match parse_date(value) {
            Some(_) => Ok(()),
            None => Err(FieldViolation::InvalidDate { label: label() }),
        },
        FieldType::Time => match value {
            Value::String(s) if TIME_REGEX.is_match(s) => Ok(()),
            _ => Err(FieldViolation::InvalidTime { label: label() }),
        },
        FieldType::Select | FieldType::Radio => {
            if field.option_values().any(|o| same_value(o, value)) {
                Ok(())
            } else {
                Err(FieldViolation::InvalidChoice { label: label() })
            }
        }
        FieldType::Checkbox => match value {
            Value::Bool(_) => Ok(()),
            Value::Array(items) => {
                if field.options.is_empty() {
                    return Ok(());
                }
                let invalid: Vec<String> = items
                    .iter()
                    .filter(|item| !field.option_values().any(|o| same_value(o, item)))
                    .map(Value::to_string)
                    .collect();
                if invalid.is_empty() {
                    Ok(())
                } else {
                    Err(FieldViolation::InvalidOptions {
                        label: label(),
                        invalid: invalid.join(", "),
                    })
                }
            }
            _ => Err(FieldViolation::InvalidCheckbox { label: label() }),
        },
        FieldType::File | FieldType::Photo => match value {
            Value::String(s) if !s.trim().is_empty() => Ok(()),
            _ => Err(FieldViolation::InvalidFile { label: label() }),
        },
        FieldType::Text | FieldType::Textarea => match value {
            Value::String(_) => Ok(()),
            _ => Err(FieldViolation::InvalidText { label: label() }),
        },
    }
}

/// Strict equality, except numbers compare by numeric value.
fn same_value(option: &Value, value: &Value) -> bool {
    match (option, value) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => option == value,
    }
}
