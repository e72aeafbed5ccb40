//! formgate - integrity checks for dynamic form definitions and
//! validation of the responses submitted against them
//!
//! - [`schema`]: form definition model, integrity checker, schema loader
//! - [`validation`]: per-field validation, sanitizing, whole-response validation
//! - [`observability`]: structured JSON-line logging
//! - [`cli`]: `check`, `validate` and `serve` commands

pub mod cli;
pub mod observability;
pub mod schema;
pub mod validation;

pub use schema::{validate_form_schema, FieldType, FormField, FormSchema, ValidationResult};
pub use validation::{
    validate_field, validate_form_response, FieldValidationResult, FieldValidator,
    FormValidationResult, ResponseValidator,
};
