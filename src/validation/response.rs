//! Whole-response validation
//!
//! One pass over the form's fields:
//! - photo fields are skipped (they travel in a separate upload list)
//! - a rejected field adds its error and is left out of `sanitized_data`
//! - an accepted field stores its sanitized value
//!
//! Undeclared response keys produce a single warning. Business rules run
//! last, unconditionally. Each call owns its accumulators, so one validator
//! may be shared across threads.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::field::FieldValidator;
use super::result::FormValidationResult;
use super::rules::{BusinessRule, RuleReport};
use crate::schema::{FieldType, FormField, FormSchema};

/// Validates complete responses against a form schema.
#[derive(Default)]
pub struct ResponseValidator {
    fields: FieldValidator,
    rules: Vec<Box<dyn BusinessRule>>,
}

impl ResponseValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `fields` for the per-field checks.
    pub fn with_field_validator(mut self, fields: FieldValidator) -> Self {
        self.fields = fields;
        self
    }

    /// Register a cross-field rule; rules run in registration order.
    pub fn with_rule(mut self, rule: impl BusinessRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn field_validator(&self) -> &FieldValidator {
        &self.fields
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Validates `response` against a typed schema.
    ///
    /// A response that is not an object is treated as having no answers.
    pub fn validate_form_response(
        &self,
        schema: &FormSchema,
        response: &Value,
    ) -> FormValidationResult {
        let entries: Vec<FieldEntry<'_>> = schema.fields.iter().map(FieldEntry::Typed).collect();
        self.validate_entries(schema, &entries, response)
    }

    /// Validates `response` against an untyped schema.
    ///
    /// Only a schema without a `fields` array yields the "invalid form
    /// schema" result. Otherwise the definition is read leniently: a field
    /// that does not read as a typed field (unknown type, missing label, ...)
    /// passes its answer through unchanged, and field entries without a
    /// string `id` are ignored.
    pub fn validate_form_response_value(
        &self,
        schema: &Value,
        response: &Value,
    ) -> FormValidationResult {
        let raw_fields = match schema.get("fields").and_then(Value::as_array) {
            Some(fields) => fields,
            None => return FormValidationResult::invalid_schema(),
        };

        let readable: Vec<Option<FormField>> = raw_fields
            .iter()
            .map(|raw| serde_json::from_value(raw.clone()).ok())
            .collect();

        let entries: Vec<FieldEntry<'_>> = raw_fields
            .iter()
            .zip(&readable)
            .filter_map(|(raw, typed)| match typed {
                Some(field) => Some(FieldEntry::Typed(field)),
                None => raw
                    .get("id")
                    .and_then(Value::as_str)
                    .map(|id| FieldEntry::Untyped { id, definition: raw }),
            })
            .collect();

        let typed = lenient_schema(schema, readable.iter().flatten().cloned().collect());
        self.validate_entries(&typed, &entries, response)
    }

    /// Runs every registered rule over the sanitized data.
    pub fn validate_business_rules(
        &self,
        schema: &FormSchema,
        data: &Map<String, Value>,
    ) -> (Vec<String>, Vec<String>) {
        let mut report = RuleReport::new();
        for rule in &self.rules {
            rule.check(schema, data, &mut report);
        }
        report.into_parts()
    }

    fn validate_entries(
        &self,
        schema: &FormSchema,
        entries: &[FieldEntry<'_>],
        response: &Value,
    ) -> FormValidationResult {
        let answers = response.as_object();

        let mut errors = Vec::new();
        let mut sanitized_data = Map::new();

        for entry in entries.iter().filter(|entry| !entry.is_photo()) {
            let value = answers.and_then(|a| a.get(entry.id()));
            let outcome = match entry {
                FieldEntry::Typed(field) => self.fields.validate_field(field, value),
                FieldEntry::Untyped { definition, .. } => {
                    self.fields.validate_untyped_field(definition, value)
                }
            };

            match (outcome.error, outcome.sanitized_value) {
                (Some(error), _) => errors.push(error),
                (None, Some(value)) => {
                    sanitized_data.insert(entry.id().to_string(), value);
                }
                (None, None) => {}
            }
        }

        let mut warnings = Vec::new();
        if let Some(answers) = answers {
            let declared: HashSet<&str> = entries.iter().map(FieldEntry::id).collect();
            let extra: Vec<&str> = answers
                .keys()
                .map(String::as_str)
                .filter(|k| !declared.contains(k))
                .collect();
            if !extra.is_empty() {
                warnings.push(format!("Unknown fields were ignored: {}", extra.join(", ")));
            }
        }

        let (rule_errors, rule_warnings) = self.validate_business_rules(schema, &sanitized_data);
        errors.extend(rule_errors);
        warnings.extend(rule_warnings);

        FormValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            sanitized_data,
        }
    }
}

/// One field of a validation pass.
enum FieldEntry<'a> {
    Typed(&'a FormField),
    /// Raw definition that does not read as a typed field
    Untyped { id: &'a str, definition: &'a Value },
}

impl FieldEntry<'_> {
    fn id(&self) -> &str {
        match self {
            FieldEntry::Typed(field) => field.id.as_str(),
            FieldEntry::Untyped { id, .. } => *id,
        }
    }

    fn is_photo(&self) -> bool {
        match self {
            FieldEntry::Typed(field) => field.field_type == FieldType::Photo,
            FieldEntry::Untyped { definition, .. } => {
                definition.get("type").and_then(Value::as_str)
                    == Some(FieldType::Photo.type_name())
            }
        }
    }
}

/// Typed view of an untyped definition, handed to business rules.
fn lenient_schema(raw: &Value, fields: Vec<FormField>) -> FormSchema {
    let title = raw.get("title").and_then(Value::as_str).unwrap_or_default();
    let mut schema = FormSchema::new(title, fields);

    schema.description = raw
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);
    if let Some(version) = raw.get("version").and_then(Value::as_str) {
        schema.version = version.to_string();
    }
    if let Some(settings) = raw
        .get("settings")
        .and_then(|s| serde_json::from_value(s.clone()).ok())
    {
        schema.settings = settings;
    }

    schema
}

/// Convenience wrapper using a validator with no business rules.
pub fn validate_form_response(schema: &FormSchema, response: &Value) -> FormValidationResult {
    ResponseValidator::new().validate_form_response(schema, response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldValidation;
    use serde_json::json;

    fn intake_schema() -> FormSchema {
        FormSchema::new(
            "Intake",
            vec![
                FormField::new("name", FieldType::Text, "Name").required(),
                FormField::new("email", FieldType::Email, "Email"),
                FormField::new("age", FieldType::Number, "Age").with_validation(FieldValidation {
                    min: Some(0.0),
                    max: Some(130.0),
                    ..Default::default()
                }),
                FormField::new("photo", FieldType::Photo, "Photo").required(),
            ],
        )
    }

    #[test]
    fn test_valid_response() {
        let result = validate_form_response(
            &intake_schema(),
            &json!({ "name": "  Amy ", "email": "AMY@EXAMPLE.ORG", "age": "31" }),
        );
        assert!(result.is_valid, "{:?}", result.errors);
        assert_eq!(
            Value::Object(result.sanitized_data),
            json!({ "name": "Amy", "email": "amy@example.org", "age": 31 })
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_rejected_fields_absent_from_output() {
        let result = validate_form_response(
            &intake_schema(),
            &json!({ "name": "", "email": "nope", "age": 200 }),
        );
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 3);
        assert!(result.sanitized_data.is_empty());
    }

    #[test]
    fn test_errors_follow_field_order() {
        let response = json!({ "email": "x", "age": "old" });
        let result = validate_form_response(&intake_schema(), &response);
        assert!(result.errors[0].contains("\"Name\""));
        assert!(result.errors[1].contains("\"Email\""));
        assert!(result.errors[2].contains("\"Age\""));
    }

    #[test]
    fn test_defaults_fill_optional_fields() {
        let result = validate_form_response(&intake_schema(), &json!({ "name": "Bo" }));
        assert!(result.is_valid);
        assert_eq!(result.sanitized_data["email"], json!(""));
        assert_eq!(result.sanitized_data["age"], json!(0));
    }

    #[test]
    fn test_photo_field_never_evaluated() {
        let result = validate_form_response(&intake_schema(), &json!({ "name": "Bo" }));
        assert!(result.is_valid);
        assert!(!result.sanitized_data.contains_key("photo"));
    }

    #[test]
    fn test_extra_fields_warn() {
        let result = validate_form_response(
            &intake_schema(),
            &json!({ "name": "Bo", "zeta": 1, "alpha": 2 }),
        );
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("alpha"));
        assert!(result.warnings[0].contains("zeta"));
    }

    #[test]
    fn test_non_object_response() {
        let result = validate_form_response(&intake_schema(), &json!(["Bo"]));
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_business_rules_run_unconditionally() {
        let validator = ResponseValidator::new()
            .with_rule(|_: &FormSchema, _: &Map<String, Value>, report: &mut RuleReport| {
                report.warning("rule ran");
            })
            .with_rule(|_: &FormSchema, data: &Map<String, Value>, report: &mut RuleReport| {
                if data.get("age") == Some(&json!(0)) {
                    report.error("Age must be given for this intake");
                }
            });
        assert_eq!(validator.rule_count(), 2);

        let response = json!({ "email": "bad" });
        let result = validator.validate_form_response(&intake_schema(), &response);
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.errors[2], "Age must be given for this intake");
        assert_eq!(result.warnings, vec!["rule ran"]);
    }

    #[test]
    fn test_untyped_schema_guard() {
        let validator = ResponseValidator::new();
        for schema in [json!({ "title": "T" }), json!({ "fields": "x" }), json!(null)] {
            let result = validator.validate_form_response_value(&schema, &json!({}));
            assert_eq!(result, FormValidationResult::invalid_schema());
        }
    }

    #[test]
    fn test_untyped_schema_without_title_still_validates() {
        let schema = json!({ "fields": [{ "id": "name", "type": "text", "label": "Name" }] });
        let result = ResponseValidator::new()
            .validate_form_response_value(&schema, &json!({ "name": " Amy " }));
        assert!(result.is_valid, "{:?}", result.errors);
        assert_eq!(Value::Object(result.sanitized_data), json!({ "name": "Amy" }));
    }

    #[test]
    fn test_untyped_schema_unknown_type_passes_through() {
        let schema = json!({
            "title": "T",
            "fields": [
                { "id": "a", "type": "color", "label": "A" },
                { "id": "email", "type": "email", "label": "Email" },
                { "label": "no id" },
                "not a field"
            ]
        });
        let result = ResponseValidator::new().validate_form_response_value(
            &schema,
            &json!({ "a": "#FF0000", "email": " X@Y.IO " }),
        );
        assert!(result.is_valid, "{:?}", result.errors);
        assert!(result.warnings.is_empty());
        assert_eq!(
            Value::Object(result.sanitized_data),
            json!({ "a": "#FF0000", "email": "x@y.io" })
        );
    }

    #[test]
    fn test_untyped_schema_required_unknown_type() {
        let schema = json!({
            "fields": [
                { "id": "sig", "type": "signature", "label": "Signature", "required": true },
                { "id": "pic", "type": "photo", "required": true }
            ]
        });
        let result = ResponseValidator::new().validate_form_response_value(&schema, &json!({}));
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["The field \"Signature\" is required"]);
    }

    #[test]
    fn test_untyped_schema_rules_see_title() {
        let validator = ResponseValidator::new().with_rule(
            |schema: &FormSchema, _: &Map<String, Value>, report: &mut RuleReport| {
                report.warning(format!("checked {}", schema.title));
            },
        );
        let schema = json!({
            "title": "Survey",
            "fields": [{ "id": "q", "type": "slider", "label": "Q" }]
        });
        let result = validator.validate_form_response_value(&schema, &json!({ "q": 3 }));
        assert_eq!(result.warnings, vec!["checked Survey"]);
        assert_eq!(result.sanitized_data["q"], json!(3));
    }

    #[test]
    fn test_untyped_schema_validates() {
        let schema = json!({
            "title": "T",
            "fields": [{ "id": "when", "type": "date", "label": "When", "required": true }]
        });
        let result = ResponseValidator::new()
            .validate_form_response_value(&schema, &json!({ "when": "2024-06-01T09:00:00Z" }));
        assert!(result.is_valid);
        assert_eq!(result.sanitized_data["when"], json!("2024-06-01"));
    }
}
