//! CLI command implementations
//!
//! - check: integrity report for one form definition
//! - validate: one response from stdin against one form definition
//! - serve: JSON-line requests against every form in the schema directory
//!
//! Validation outcomes are written to stdout. Lifecycle and per-response
//! events go to the structured log on stderr.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use serde_json::Value;

use crate::observability::{log_event_with_fields, Event, Logger};
use crate::schema::{validate_form_schema, FormSchema, SchemaError, SchemaLoader, ValidationResult};
use crate::validation::{FormValidationResult, ResponseValidator};

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{
    read_request, read_requests_from, write_error_to, write_response, write_response_to,
};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run a CLI command
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Check { schema } => check(&schema),
        Command::Validate { schema, config } => validate(&schema, config.as_deref()),
        Command::Serve { config } => serve(&config),
    }
}

/// Check a form definition file and print its integrity report
pub fn check(schema_path: &Path) -> CliResult<()> {
    let raw = read_json_file(schema_path)?;
    let result = check_schema(&raw, &schema_path.display().to_string());
    write_response(serde_json::to_value(&result)?)
}

/// Run the integrity check and log the outcome
pub fn check_schema(raw: &Value, source: &str) -> ValidationResult {
    let result = validate_form_schema(raw);
    let errors = result.errors.len().to_string();
    if result.is_valid {
        log_event_with_fields(Event::SchemaChecked, &[("schema", source)]);
    } else {
        log_event_with_fields(
            Event::SchemaRejected,
            &[("schema", source), ("errors", errors.as_str())],
        );
    }
    result
}

/// Validate a single response from stdin
///
/// A definition that fails its integrity check is logged as rejected and
/// then read leniently: without a `fields` array it produces the "invalid
/// form schema" result, otherwise its readable fields are still validated.
pub fn validate(schema_path: &Path, config_path: Option<&Path>) -> CliResult<()> {
    let config = load_config(config_path)?;
    let validator = ResponseValidator::new().with_field_validator(config.field_validator());

    let raw = read_json_file(schema_path)?;
    let source = schema_path.display().to_string();
    let response = read_request()?;

    let result = match FormSchema::from_value(&raw) {
        Ok(schema) => evaluate(&validator, &source, &schema, &response),
        Err(e) => {
            log_event_with_fields(
                Event::SchemaRejected,
                &[("schema", source.as_str()), ("code", e.code().code())],
            );
            validator.validate_form_response_value(&raw, &response)
        }
    };

    write_response(serde_json::to_value(&result)?)
}

/// Load every schema in the configured directory and serve stdin requests
pub fn serve(config_path: &Path) -> CliResult<()> {
    let config = load_config(Some(config_path))?;

    let mut loader = SchemaLoader::new(config.schema_path());
    loader.load_all()?;

    let validator = ResponseValidator::new().with_field_validator(config.field_validator());

    let forms = loader.schema_count().to_string();
    log_event_with_fields(Event::Serving, &[("forms", forms.as_str())]);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serve_requests(&loader, &validator, stdin.lock(), &mut out)?;

    Ok(())
}

/// Answer one `{"form": <key>, "data": {...}}` request per input line.
///
/// A bad request produces an error envelope and the loop continues.
/// Returns the number of requests handled.
pub fn serve_requests<R: BufRead, W: Write>(
    loader: &SchemaLoader,
    validator: &ResponseValidator,
    input: R,
    out: &mut W,
) -> CliResult<usize> {
    let mut handled = 0;

    for request in read_requests_from(input) {
        let outcome = request
            .map_err(RequestFailure::from)
            .and_then(|request| handle_request(loader, validator, &request));

        match outcome {
            Ok(result) => write_response_to(out, serde_json::to_value(&result)?)?,
            Err(failure) => {
                log_event_with_fields(
                    Event::RequestFailed,
                    &[("code", failure.code), ("message", failure.message.as_str())],
                );
                write_error_to(out, failure.code, &failure.message)?;
            }
        }

        handled += 1;
    }

    Ok(handled)
}

/// Error envelope contents for a single request
struct RequestFailure {
    code: &'static str,
    message: String,
}

impl From<CliError> for RequestFailure {
    fn from(e: CliError) -> Self {
        Self {
            code: e.code_str(),
            message: e.message().to_string(),
        }
    }
}

impl From<SchemaError> for RequestFailure {
    fn from(e: SchemaError) -> Self {
        Self {
            code: e.code().code(),
            message: e.message().to_string(),
        }
    }
}

fn handle_request(
    loader: &SchemaLoader,
    validator: &ResponseValidator,
    request: &Value,
) -> Result<FormValidationResult, RequestFailure> {
    let key = request
        .get("form")
        .and_then(Value::as_str)
        .ok_or_else(|| CliError::bad_request("request must name a form"))?;

    let schema = loader.require(key)?;
    let data = request.get("data").unwrap_or(&Value::Null);

    Ok(evaluate(validator, key, schema, data))
}

/// Validate and log the outcome of one response
fn evaluate(
    validator: &ResponseValidator,
    form: &str,
    schema: &FormSchema,
    response: &Value,
) -> FormValidationResult {
    let result = validator.validate_form_response(schema, response);

    let extra = undeclared_keys(schema, response);
    if !extra.is_empty() {
        let keys = extra.join(",");
        log_event_with_fields(
            Event::ExtraFieldsIgnored,
            &[("form", form), ("keys", keys.as_str())],
        );
    }

    let errors = result.errors.len().to_string();
    let event = if result.is_valid {
        Event::ResponseValidated
    } else {
        Event::ResponseRejected
    };
    log_event_with_fields(event, &[("form", form), ("errors", errors.as_str())]);

    result
}

fn undeclared_keys<'a>(schema: &FormSchema, response: &'a Value) -> Vec<&'a str> {
    response
        .as_object()
        .map(|answers| {
            answers
                .keys()
                .map(String::as_str)
                .filter(|key| schema.field(key).is_none())
                .collect()
        })
        .unwrap_or_default()
}

fn load_config(path: Option<&Path>) -> CliResult<Config> {
    let config = Config::load_or_default(path)?;
    Logger::set_min_severity(config.severity()?);

    if let Some(path) = path {
        let shown = path.display().to_string();
        log_event_with_fields(Event::ConfigLoaded, &[("path", shown.as_str())]);
    }

    Ok(config)
}

fn read_json_file(path: &Path) -> CliResult<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        CliError::io_error(format!("Failed to read {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        CliError::from(SchemaError::malformed_schema(
            path.display().to_string(),
            e.to_string(),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldType, FormField};
    use serde_json::json;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn contact_loader() -> SchemaLoader {
        let mut loader = SchemaLoader::new("/nonexistent");
        let schema = FormSchema::new(
            "Contact",
            vec![
                FormField::new("name", FieldType::Text, "Name").required(),
                FormField::new("age", FieldType::Number, "Age"),
            ],
        );
        loader.register("contact", schema).unwrap();
        loader
    }

    fn run_serve(input: &str) -> Vec<Value> {
        let loader = contact_loader();
        let validator = ResponseValidator::new();
        let mut out = Vec::new();
        serve_requests(&loader, &validator, Cursor::new(input), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_serve_valid_request() {
        let lines = run_serve(r#"{"form":"contact","data":{"name":" Ada ","age":"36"}}"#);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["status"], "ok");
        assert_eq!(lines[0]["data"]["isValid"], true);
        assert_eq!(lines[0]["data"]["sanitizedData"], json!({"name": "Ada", "age": 36}));
    }

    #[test]
    fn test_serve_continues_after_failures() {
        let input = concat!(
            "not json\n",
            "{\"form\":\"survey\",\"data\":{}}\n",
            "{\"data\":{}}\n",
            "{\"form\":\"contact\",\"data\":{}}\n",
        );
        let lines = run_serve(input);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["code"], "FORM_CLI_IO_ERROR");
        assert_eq!(lines[1]["code"], "FORM_UNKNOWN_SCHEMA");
        assert_eq!(lines[2]["code"], "FORM_CLI_BAD_REQUEST");
        assert_eq!(lines[3]["status"], "ok");
        assert_eq!(lines[3]["data"]["isValid"], false);
        assert_eq!(
            lines[3]["data"]["errors"],
            json!(["The field \"Name\" is required"])
        );
    }

    #[test]
    fn test_serve_missing_data_is_empty_response() {
        let lines = run_serve(r#"{"form":"contact"}"#);
        assert_eq!(lines[0]["data"]["isValid"], false);
        assert_eq!(lines[0]["data"]["warnings"], json!([]));
    }

    #[test]
    fn test_undeclared_keys() {
        let loader = contact_loader();
        let schema = loader.get("contact").unwrap();
        let response = json!({"name": "Ada", "zip": "1", "avatar": "x"});
        assert_eq!(undeclared_keys(schema, &response), vec!["avatar", "zip"]);
        assert!(undeclared_keys(schema, &json!("text")).is_empty());
    }

    #[test]
    fn test_check_schema_reports_errors() {
        let result = check_schema(&json!({"fields": []}), "inline");
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec![
                "Form title is required and must be a non-empty string",
                "Form must have at least one field"
            ]
        );
    }

    #[test]
    fn test_read_json_file_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = read_json_file(&path).unwrap_err();
        assert_eq!(err.code_str(), "FORM_CLI_SCHEMA_ERROR");
        assert!(err.message().contains("FORM_SCHEMA_MALFORMED"));
    }
}
