//! Schema Integrity Tests
//!
//! Integrity checks on raw form definitions:
//! - Every problem is reported, nothing short-circuits
//! - Duplicate field ids are detected
//! - Choice fields need options
//! - Typed schemas only exist after the integrity check passes
//! - Loaded schemas are immutable

use formgate::schema::{
    validate_form_schema, FieldType, FormField, FormSchema, SchemaErrorCode, SchemaIntegrityChecker,
    SchemaLoader, SchemaViolation,
};
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn contact_schema() -> Value {
    json!({
        "title": "Contact",
        "fields": [
            { "id": "name", "type": "text", "label": "Name", "required": true },
            { "id": "email", "type": "email", "label": "Email" },
            {
                "id": "topic",
                "type": "select",
                "label": "Topic",
                "options": [
                    { "value": "sales", "label": "Sales" },
                    { "value": "support", "label": "Support" }
                ]
            }
        ]
    })
}

// =============================================================================
// Accepted Definitions
// =============================================================================

/// A well-formed definition passes with no errors.
#[test]
fn test_well_formed_schema_is_valid() {
    let result = validate_form_schema(&contact_schema());
    assert!(result.is_valid);
    assert!(result.errors.is_empty());
}

/// A passing definition reads into a typed schema with defaults applied.
#[test]
fn test_from_value_applies_settings_defaults() {
    let schema = FormSchema::from_value(&contact_schema()).unwrap();
    assert_eq!(schema.fields.len(), 3);
    assert_eq!(schema.version, "1.0.0");
    assert_eq!(schema.settings.submit_button_text, "Submit");
    assert!(!schema.settings.allow_multiple_submissions);
    assert_eq!(schema.field("topic").unwrap().field_type, FieldType::Select);
}

// =============================================================================
// Rejected Definitions
// =============================================================================

/// Two fields sharing an id fail and the message names the id.
#[test]
fn test_duplicate_field_id_detected() {
    let schema = json!({
        "title": "Signup",
        "fields": [
            { "id": "email", "type": "email", "label": "Email" },
            { "id": "email", "type": "text", "label": "Email again" }
        ]
    });

    let result = validate_form_schema(&schema);
    assert!(!result.is_valid);
    assert!(result.errors.iter().any(|e| e.contains("email")));
}

/// Non-object input is rejected with a single error.
#[test]
fn test_non_object_schema() {
    for raw in [json!(null), json!("form"), json!([1, 2]), json!(7)] {
        let result = validate_form_schema(&raw);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
    }
}

/// Problems across fields are all reported in one pass.
#[test]
fn test_errors_accumulate_across_fields() {
    let schema = json!({
        "title": "   ",
        "fields": [
            { "type": "text", "label": "No id" },
            { "id": "b", "type": "wheel", "label": "Bad type" },
            { "id": "c", "type": "radio", "label": "No options" }
        ]
    });

    let violations = SchemaIntegrityChecker.violations(&schema);
    assert!(violations.contains(&SchemaViolation::MissingTitle));
    assert!(violations
        .iter()
        .any(|v| matches!(v, SchemaViolation::MissingFieldId { .. })));
    assert!(violations
        .iter()
        .any(|v| matches!(v, SchemaViolation::InvalidFieldType { .. })));
    assert!(violations
        .iter()
        .any(|v| matches!(v, SchemaViolation::MissingOptions { .. })));
}

/// Choice fields with an empty option list are rejected.
#[test]
fn test_choice_fields_require_options() {
    for kind in ["select", "radio"] {
        let schema = json!({
            "title": "Poll",
            "fields": [{ "id": "pick", "type": kind, "label": "Pick", "options": [] }]
        });
        assert!(!validate_form_schema(&schema).is_valid, "{} accepted", kind);
    }
}

/// A failing definition never becomes a typed schema.
#[test]
fn test_from_value_refuses_failing_schema() {
    let err = FormSchema::from_value(&json!({ "title": "Empty", "fields": [] })).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::FormSchemaIntegrityFailed);
    assert_eq!(err.violations(), ["Form must have at least one field"]);
}

/// The check gives the same answer every time.
#[test]
fn test_integrity_check_is_deterministic() {
    let schema = json!({ "fields": [{ "id": "x" }, { "id": "x" }] });
    let first = validate_form_schema(&schema);
    for _ in 0..50 {
        assert_eq!(validate_form_schema(&schema), first);
    }
}

// =============================================================================
// Loader Tests
// =============================================================================

/// Schemas are loaded from `<key>.json` files in the schema directory.
#[test]
fn test_loader_reads_directory() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("contact.json"),
        serde_json::to_string(&contact_schema()).unwrap(),
    )
    .unwrap();
    fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

    let mut loader = SchemaLoader::new(tmp.path());
    assert_eq!(loader.load_all().unwrap(), 1);
    assert!(loader.exists("contact"));
    assert!(loader.get("notes").is_none());
}

/// A definition that fails integrity stops the load.
#[test]
fn test_loader_rejects_broken_definition() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("broken.json"), r#"{"title":"Broken","fields":[]}"#).unwrap();

    let mut loader = SchemaLoader::new(tmp.path());
    let err = loader.load_all().unwrap_err();
    assert_eq!(err.key(), Some("broken"));
    assert_eq!(loader.schema_count(), 0);
}

/// An active schema cannot be replaced.
#[test]
fn test_registered_schema_is_immutable() {
    let tmp = TempDir::new().unwrap();
    let mut loader = SchemaLoader::new(tmp.path());
    let schema = FormSchema::new("One", vec![FormField::new("a", FieldType::Text, "A")]);

    loader.register("one", schema.clone()).unwrap();
    let err = loader.register("one", schema).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::FormSchemaImmutable);
}

/// A saved schema loads back under the same key.
#[test]
fn test_save_then_load() {
    let tmp = TempDir::new().unwrap();
    let schema = FormSchema::from_value(&contact_schema()).unwrap();

    let writer = SchemaLoader::new(tmp.path());
    writer.save_schema("contact", &schema).unwrap();

    let mut reader = SchemaLoader::new(tmp.path());
    reader.load_all().unwrap();
    assert_eq!(reader.get("contact"), Some(&schema));
}
