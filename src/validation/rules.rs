//! Cross-field business rules
//!
//! Rules run after per-field validation, over the sanitized data only, and
//! may add errors or warnings. No rules are registered by default.

use serde_json::{Map, Value};

use crate::schema::FormSchema;

/// Errors and warnings raised by business rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleReport {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl RuleReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the response with `message`.
    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Flag `message` without rejecting the response.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.errors, self.warnings)
    }
}

/// A cross-field invariant checked against sanitized response data.
pub trait BusinessRule: Send + Sync {
    fn check(&self, schema: &FormSchema, data: &Map<String, Value>, report: &mut RuleReport);
}

impl<F> BusinessRule for F
where
    F: Fn(&FormSchema, &Map<String, Value>, &mut RuleReport) + Send + Sync,
{
    fn check(&self, schema: &FormSchema, data: &Map<String, Value>, report: &mut RuleReport) {
        self(schema, data, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EndAfterStart;

    impl BusinessRule for EndAfterStart {
        fn check(&self, _schema: &FormSchema, data: &Map<String, Value>, report: &mut RuleReport) {
            let (Some(start), Some(end)) = (
                data.get("start").and_then(Value::as_str),
                data.get("end").and_then(Value::as_str),
            ) else {
                return;
            };
            if end < start {
                report.error("End date must not precede start date");
            }
        }
    }

    #[test]
    fn test_struct_rule() {
        let schema = FormSchema::new("Project", Vec::new());
        let mut data = Map::new();
        data.insert("start".into(), json!("2024-05-01"));
        data.insert("end".into(), json!("2024-04-01"));

        let mut report = RuleReport::new();
        EndAfterStart.check(&schema, &data, &mut report);
        assert_eq!(report.errors(), ["End date must not precede start date"]);
        assert!(report.warnings().is_empty());
    }

    #[test]
    fn test_closure_rule() {
        let rule = |_: &FormSchema, data: &Map<String, Value>, report: &mut RuleReport| {
            if data.is_empty() {
                report.warning("Nothing was answered");
            }
        };
        let schema = FormSchema::new("Empty", Vec::new());
        let mut report = RuleReport::new();
        rule.check(&schema, &Map::new(), &mut report);

        let (errors, warnings) = report.into_parts();
        assert!(errors.is_empty());
        assert_eq!(warnings, vec!["Nothing was answered"]);
    }
}
