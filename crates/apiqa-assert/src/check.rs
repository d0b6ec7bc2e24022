//! Bundled expectations for one response.
//!
//! [`Expectations::run`] applies every configured check and collects the
//! outcomes; a failing check does not stop the ones after it.

use std::fmt;
use std::time::Duration;

use apiqa_schema::SchemaRegistry;
use serde::Serialize;

use crate::assertions;
use crate::error::AssertionError;
use crate::snapshot::ResponseSnapshot;

/// What a response is expected to look like. Unset fields are not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expectations {
    /// Exact status code.
    pub status: Option<u16>,
    /// Media type of `Content-Type`.
    pub content_type: Option<String>,
    /// Upper bound on elapsed time.
    pub max_time: Option<Duration>,
    /// Schema the body must satisfy.
    pub schema: Option<String>,
    /// Treat the body as an array of `schema` resources.
    pub each: bool,
}

impl Expectations {
    /// No checks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect an exact status code.
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Expect a content type.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Expect the response within `limit`.
    pub fn max_time(mut self, limit: Duration) -> Self {
        self.max_time = Some(limit);
        self
    }

    /// Expect the body to satisfy `schema`; with `each`, every element of
    /// an array body.
    pub fn schema(mut self, schema: impl Into<String>, each: bool) -> Self {
        self.schema = Some(schema.into());
        self.each = each;
        self
    }

    /// Run every configured check against `response`.
    pub fn run(&self, response: &ResponseSnapshot, registry: &SchemaRegistry) -> CheckReport {
        let mut outcomes = Vec::new();
        if let Some(expected) = self.status {
            outcomes.push(CheckOutcome::new(
                "status_code",
                assertions::status_code(response, expected),
            ));
        }
        if let Some(expected) = &self.content_type {
            outcomes.push(CheckOutcome::new(
                "content_type",
                assertions::content_type(response, expected),
            ));
        }
        if let Some(limit) = self.max_time {
            outcomes.push(CheckOutcome::new(
                "response_time",
                assertions::response_time(response, limit),
            ));
        }
        if let Some(schema) = &self.schema {
            let (name, result) = if self.each {
                (
                    "json_schema_each",
                    assertions::json_schema_each(response, registry, schema),
                )
            } else {
                ("json_schema", assertions::json_schema(response, registry, schema))
            };
            outcomes.push(CheckOutcome::new(name, result));
        }
        CheckReport { outcomes }
    }
}

/// One executed check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckOutcome {
    /// Check name, e.g. `status_code`.
    pub name: &'static str,
    /// Whether it passed.
    pub passed: bool,
    /// Failure message; absent when passed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip)]
    error: Option<AssertionError>,
}

impl CheckOutcome {
    fn new(name: &'static str, result: Result<(), AssertionError>) -> Self {
        match result {
            Ok(()) => Self {
                name,
                passed: true,
                message: None,
                error: None,
            },
            Err(e) => Self {
                name,
                passed: false,
                message: Some(e.to_string()),
                error: Some(e),
            },
        }
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&AssertionError> {
        self.error.as_ref()
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            None => write!(f, "PASS {}", self.name),
            Some(message) => write!(f, "FAIL {}: {message}", self.name),
        }
    }
}

/// Outcomes of [`Expectations::run`], in check order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    outcomes: Vec<CheckOutcome>,
}

impl CheckReport {
    /// True when every check passed. An empty report passes.
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    /// Every outcome.
    pub fn outcomes(&self) -> &[CheckOutcome] {
        &self.outcomes
    }

    /// Failed outcomes only.
    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }

    /// Outcome of the named check.
    pub fn outcome(&self, name: &str) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            writeln!(f, "{outcome}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiqa_schema::samples;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::builtin().unwrap()
    }

    #[test]
    fn empty_expectations_pass() {
        let report = Expectations::new().run(&ResponseSnapshot::new(500), &registry());
        assert!(report.passed());
        assert!(report.outcomes().is_empty());
    }

    #[test]
    fn all_checks_run_after_a_failure() {
        let response = ResponseSnapshot::new(404)
            .with_json(&samples::valid_post())
            .with_elapsed(Duration::from_millis(10));
        let report = Expectations::new()
            .status(200)
            .content_type("application/json")
            .max_time(Duration::from_secs(3))
            .schema("post", false)
            .run(&response, &registry());

        assert!(!report.passed());
        assert_eq!(report.outcomes().len(), 4);
        assert_eq!(report.failures().count(), 1);
        let failed = report.outcome("status_code").unwrap();
        assert_eq!(
            failed.error(),
            Some(&AssertionError::StatusCode {
                expected: 200,
                actual: 404
            })
        );
        assert!(report.outcome("json_schema").unwrap().passed);
    }

    #[test]
    fn each_selects_collection_check() {
        let response = ResponseSnapshot::new(200).with_json(&json!([samples::valid_post(), {}]));
        let report = Expectations::new()
            .schema("post", true)
            .run(&response, &registry());
        let outcome = report.outcome("json_schema_each").unwrap();
        assert!(!outcome.passed);
        match outcome.error() {
            Some(AssertionError::Schema { result }) => {
                assert_eq!(result.len(), 4);
                assert!(result.violations()[0].path.to_string().starts_with("1."));
            }
            other => panic!("Expected schema failure, got: {other:?}"),
        }
    }

    #[test]
    fn display_lists_pass_and_fail() {
        let response = ResponseSnapshot::new(201);
        let report = Expectations::new()
            .status(201)
            .content_type("application/json")
            .run(&response, &registry());
        let text = report.to_string();
        assert!(text.contains("PASS status_code"));
        assert!(text.contains("FAIL content_type: expected Content-Type application/json"));
    }

    #[test]
    fn serializes_without_messages_for_passes() {
        let report = Expectations::new()
            .status(200)
            .run(&ResponseSnapshot::new(200), &registry());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            json!({"outcomes": [{"name": "status_code", "passed": true}]})
        );
    }
}
