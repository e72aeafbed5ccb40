//! Form schema type definitions
//!
//! Supported field types:
//! - text, textarea: free text
//! - number: numeric value (strings are coerced)
//! - email: address, normalized to lowercase
//! - date: calendar date, normalized to `YYYY-MM-DD`
//! - time: `HH:MM` 24-hour clock
//! - select, radio: exactly one of the declared options
//! - checkbox: boolean, or a list of declared options
//! - file, photo: reference to an uploaded object

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::errors::{SchemaError, SchemaResult};
use super::integrity::validate_form_schema;

/// Closed set of field types a form may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Email,
    Date,
    Time,
    Select,
    Radio,
    Checkbox,
    File,
    Photo,
}

impl FieldType {
    /// Every field type, in declaration order.
    pub const ALL: [FieldType; 11] = [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Number,
        FieldType::Email,
        FieldType::Date,
        FieldType::Time,
        FieldType::Select,
        FieldType::Radio,
        FieldType::Checkbox,
        FieldType::File,
        FieldType::Photo,
    ];

    /// Returns the wire name of the type
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Number => "number",
            FieldType::Email => "email",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::File => "file",
            FieldType::Photo => "photo",
        }
    }

    /// Looks up a type by its wire name.
    pub fn from_name(name: &str) -> Option<FieldType> {
        Self::ALL.iter().copied().find(|t| t.type_name() == name)
    }

    /// Choice types must declare a non-empty option list.
    pub fn requires_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio | FieldType::Checkbox)
    }

    /// Comma-separated list of all type names, for error messages.
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|t| t.type_name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// One selectable option of a choice field.
///
/// `value` is a string or a number on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: Value,
    pub label: String,
}

impl FieldOption {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Constraint block of a field.
///
/// `min`/`max` bound the character length of text values and the numeric
/// value of number fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    /// Unique within the owning schema
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FormField {
    /// Create an optional field with no constraints
    pub fn new(id: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type,
            label: label.into(),
            placeholder: None,
            required: false,
            validation: None,
            options: Vec::new(),
            default_value: None,
            description: None,
        }
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach a constraint block
    pub fn with_validation(mut self, validation: FieldValidation) -> Self {
        self.validation = Some(validation);
        self
    }

    /// Attach options; the label of each option mirrors its value
    pub fn with_options<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.options = values
            .into_iter()
            .map(|v| {
                let value = v.into();
                let label = match &value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                FieldOption { value, label }
            })
            .collect();
        self
    }

    /// Set an explicit default value
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Option values in declaration order
    pub fn option_values(&self) -> impl Iterator<Item = &Value> {
        self.options.iter().map(|o| &o.value)
    }
}

/// Presentation settings of a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSettings {
    #[serde(default)]
    pub allow_multiple_submissions: bool,
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,
    #[serde(default = "default_submit_button_text")]
    pub submit_button_text: String,
    #[serde(default = "default_success_message")]
    pub success_message: String,
}

fn default_show_progress() -> bool {
    true
}
fn default_submit_button_text() -> String {
    "Submit".to_string()
}
fn default_success_message() -> String {
    "Thank you for your submission!".to_string()
}
fn default_version() -> String {
    "1.0.0".to_string()
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            allow_multiple_submissions: false,
            show_progress: default_show_progress(),
            submit_button_text: default_submit_button_text(),
            success_message: default_success_message(),
        }
    }
}

/// Complete form definition.
///
/// Immutable input to the engine; validation never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub settings: FormSettings,
}

impl FormSchema {
    /// Create a schema with default version and settings
    pub fn new(title: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            title: title.into(),
            description: None,
            version: default_version(),
            fields,
            settings: FormSettings::default(),
        }
    }

    /// Integrity-checks a raw definition, then reads it into a typed schema.
    ///
    /// Every accumulated integrity violation is reported in the error.
    pub fn from_value(raw: &Value) -> SchemaResult<Self> {
        let report = validate_form_schema(raw);
        if !report.is_valid {
            return Err(SchemaError::integrity_failed(report.errors));
        }

        serde_json::from_value(raw.clone())
            .map_err(|e| SchemaError::malformed_schema("<inline>", e.to_string()))
    }

    /// Looks up a field by id
    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }
}
