//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events of the validation service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,
    /// Schema directory loaded
    SchemasLoaded,

    // Authoring
    /// Schema passed the integrity check
    SchemaChecked,
    /// Schema failed the integrity check
    SchemaRejected,

    // Submissions
    /// Response accepted
    ResponseValidated,
    /// Response rejected with field errors
    ResponseRejected,
    /// Response carried undeclared keys
    ExtraFieldsIgnored,
    /// A field pattern failed to compile
    PatternRejected,

    // Server
    /// Ready for requests on stdin
    Serving,
    /// A request could not be processed
    RequestFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::SchemaChecked => "SCHEMA_CHECKED",
            Event::SchemaRejected => "SCHEMA_REJECTED",
            Event::ResponseValidated => "RESPONSE_VALIDATED",
            Event::ResponseRejected => "RESPONSE_REJECTED",
            Event::ExtraFieldsIgnored => "EXTRA_FIELDS_IGNORED",
            Event::PatternRejected => "PATTERN_REJECTED",
            Event::Serving => "FORMGATE_SERVING",
            Event::RequestFailed => "REQUEST_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::PatternRejected => Severity::Warn,
            Event::RequestFailed => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
