//! Response validation subsystem
//!
//! Checks submitted answers against a runtime-defined form schema without
//! compile-time knowledge of its shape, then normalizes what it accepts.
//!
//! # Usage
//!
//! ```ignore
//! use formgate::schema::FormSchema;
//! use formgate::validation::ResponseValidator;
//!
//! let schema = FormSchema::from_value(&raw_schema)?;
//! let result = ResponseValidator::new().validate_form_response(&schema, &answers);
//! if !result.is_valid {
//!     // reject with result.errors
//! }
//! ```
//!
//! # Guarantees
//!
//! - Problems are accumulated, never thrown
//! - Sanitizing is idempotent
//! - A malformed field pattern is a field error, never a panic
//! - Validators hold no per-call state and are safe to share

mod field;
mod response;
mod result;
mod rules;
mod sanitize;
mod violations;

pub use field::{validate_field, FieldValidator, DEFAULT_PATTERN_SIZE_LIMIT, PATTERN_CACHE_CAPACITY};
pub use response::{validate_form_response, ResponseValidator};
pub use result::{FieldValidationResult, FormValidationResult};
pub use rules::{BusinessRule, RuleReport};
pub use sanitize::{
    coerce_number, get_default_value, is_empty, number_value, parse_date, sanitize_value,
    DATE_FORMAT,
};
pub use violations::FieldViolation;
