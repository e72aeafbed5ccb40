//! Form schema subsystem
//!
//! Form definitions are authored at runtime and are untrusted until they
//! pass the integrity check. Only checked definitions become typed
//! [`FormSchema`] values that the response validator accepts.
//!
//! # Design Principles
//!
//! - Every violation is reported, not only the first
//! - Field ids are unique within a form
//! - Choice fields always declare their options
//! - Activated schemas are immutable

mod errors;
mod integrity;
mod loader;
mod types;

pub use errors::{
    SchemaError, SchemaErrorCode, SchemaResult, SchemaViolation, Severity, ViolationKind,
};
pub use integrity::{validate_form_schema, SchemaIntegrityChecker, ValidationResult};
pub use loader::SchemaLoader;
pub use types::{FieldOption, FieldType, FieldValidation, FormField, FormSchema, FormSettings};
