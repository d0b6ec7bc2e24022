//! # Assertions
//!
//! One function per check. Every function logs the check at `debug`, the
//! pass at `info` and the failure at `error`, then returns the outcome.
//!
//! JSON assertions decode the body on each call; a body that is not JSON
//! fails with [`AssertionError::InvalidJson`].

use std::time::Duration;

use apiqa_core::{FieldPath, JsonType};
use apiqa_schema::SchemaRegistry;
use serde_json::Value;

use crate::error::AssertionError;
use crate::snapshot::ResponseSnapshot;

pub(crate) fn logged<T>(
    check: &str,
    outcome: Result<T, AssertionError>,
) -> Result<T, AssertionError> {
    match &outcome {
        Ok(_) => tracing::info!(check, "assertion passed"),
        Err(e) => tracing::error!(check, error = %e, "assertion failed"),
    }
    outcome
}

/// Status code equals `expected`.
pub fn status_code(response: &ResponseSnapshot, expected: u16) -> Result<(), AssertionError> {
    tracing::debug!(expected, "asserting status code");
    let actual = response.status();
    let outcome = if actual == expected {
        Ok(())
    } else {
        Err(AssertionError::StatusCode { expected, actual })
    };
    logged("status_code", outcome)
}

/// Status code is one of `expected`.
pub fn status_code_in(response: &ResponseSnapshot, expected: &[u16]) -> Result<(), AssertionError> {
    tracing::debug!(?expected, "asserting status code in set");
    let actual = response.status();
    let outcome = if expected.contains(&actual) {
        Ok(())
    } else {
        Err(AssertionError::StatusCodeNotIn {
            expected: expected.to_vec(),
            actual,
        })
    };
    logged("status_code_in", outcome)
}

/// Elapsed time is at most `limit`.
pub fn response_time(response: &ResponseSnapshot, limit: Duration) -> Result<(), AssertionError> {
    tracing::debug!(?limit, "asserting response time");
    let actual = response.elapsed();
    let outcome = if actual <= limit {
        Ok(())
    } else {
        Err(AssertionError::ResponseTime { limit, actual })
    };
    logged("response_time", outcome)
}

/// Media type of `Content-Type` equals `expected`, ignoring parameters.
pub fn content_type(response: &ResponseSnapshot, expected: &str) -> Result<(), AssertionError> {
    tracing::debug!(expected, "asserting content type");
    let actual = response.content_type();
    let outcome = if actual.is_some_and(|a| a.eq_ignore_ascii_case(expected)) {
        Ok(())
    } else {
        Err(AssertionError::ContentType {
            expected: expected.to_string(),
            actual: actual.map(str::to_string),
        })
    };
    logged("content_type", outcome)
}

/// Header `name` is present.
pub fn header_exists(response: &ResponseSnapshot, name: &str) -> Result<(), AssertionError> {
    let outcome = match response.header(name) {
        Some(_) => Ok(()),
        None => Err(AssertionError::HeaderMissing {
            name: name.to_string(),
        }),
    };
    logged("header_exists", outcome)
}

/// Header `name` equals `expected`.
pub fn header_value(
    response: &ResponseSnapshot,
    name: &str,
    expected: &str,
) -> Result<(), AssertionError> {
    let actual = response.header(name);
    let outcome = if actual == Some(expected) {
        Ok(())
    } else {
        Err(AssertionError::HeaderValue {
            name: name.to_string(),
            expected: expected.to_string(),
            actual: actual.map(str::to_string),
        })
    };
    logged("header_value", outcome)
}

/// Body text contains `text`.
pub fn text_contains(
    response: &ResponseSnapshot,
    text: &str,
    case_sensitive: bool,
) -> Result<(), AssertionError> {
    let found = if case_sensitive {
        response.text().contains(text)
    } else {
        response.text().to_lowercase().contains(&text.to_lowercase())
    };
    let outcome = if found {
        Ok(())
    } else {
        Err(AssertionError::TextMissing {
            text: text.to_string(),
        })
    };
    logged("text_contains", outcome)
}

fn lookup(document: &Value, path: &str) -> Result<(FieldPath, Value), AssertionError> {
    let path = FieldPath::parse(path)?;
    match path.resolve(document) {
        Some(Value::Null) | None => Err(AssertionError::KeyMissing { path }),
        Some(value) => {
            let value = value.clone();
            Ok((path, value))
        }
    }
}

/// The key path resolves to a non-null value, which is returned.
pub fn json_key_exists(response: &ResponseSnapshot, path: &str) -> Result<Value, AssertionError> {
    tracing::debug!(path, "checking key exists");
    let outcome = response
        .json()
        .and_then(|doc| lookup(&doc, path))
        .map(|(_, value)| value);
    logged("json_key_exists", outcome)
}

/// The key path resolves to exactly `expected`.
pub fn json_key_value(
    response: &ResponseSnapshot,
    path: &str,
    expected: &Value,
) -> Result<(), AssertionError> {
    tracing::debug!(path, %expected, "asserting key value");
    let outcome = response.json().and_then(|doc| {
        let path = FieldPath::parse(path)?;
        let actual = path.resolve(&doc).cloned().unwrap_or(Value::Null);
        if &actual == expected {
            Ok(())
        } else {
            Err(AssertionError::KeyValue {
                path,
                expected: expected.clone(),
                actual,
            })
        }
    });
    logged("json_key_value", outcome)
}

/// Every key path resolves to a value of its declared type. Stops at the
/// first failing key.
pub fn json_types(
    response: &ResponseSnapshot,
    expected: &[(&str, JsonType)],
) -> Result<(), AssertionError> {
    let outcome = response.json().and_then(|doc| {
        for (path, expected) in expected {
            let (path, value) = lookup(&doc, path)?;
            if !expected.accepts(&value) {
                return Err(AssertionError::KeyType {
                    path,
                    expected: *expected,
                    actual: JsonType::of(&value),
                });
            }
        }
        Ok(())
    });
    logged("json_types", outcome)
}

/// The key path holds an array of `expected` elements. The empty path
/// checks the body itself.
pub fn json_array_length(
    response: &ResponseSnapshot,
    path: &str,
    expected: usize,
) -> Result<(), AssertionError> {
    let outcome = response.json().and_then(|doc| {
        let path = FieldPath::parse(path)?;
        let value = path
            .resolve(&doc)
            .ok_or_else(|| AssertionError::KeyMissing { path: path.clone() })?;
        let Value::Array(items) = value else {
            return Err(AssertionError::NotAnArray {
                actual: JsonType::of(value),
                path,
            });
        };
        if items.len() == expected {
            Ok(())
        } else {
            Err(AssertionError::ArrayLength {
                path,
                expected,
                actual: items.len(),
            })
        }
    });
    logged("json_array_length", outcome)
}

/// Every top-level key of `expected` is present in the body with an equal
/// value. All missing and mismatched keys are reported together.
pub fn json_contains(response: &ResponseSnapshot, expected: &Value) -> Result<(), AssertionError> {
    let outcome = response.json().and_then(|doc| {
        let mut missing = Vec::new();
        if let Value::Object(expected) = expected {
            for (key, value) in expected {
                match doc.get(key) {
                    None => missing.push(key.clone()),
                    Some(actual) if actual != value => {
                        missing.push(format!("{key} (value mismatch)"))
                    }
                    Some(_) => {}
                }
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AssertionError::Contains { missing })
        }
    });
    logged("json_contains", outcome)
}

/// The body is one resource satisfying `schema_name`.
pub fn json_schema(
    response: &ResponseSnapshot,
    registry: &SchemaRegistry,
    schema_name: &str,
) -> Result<(), AssertionError> {
    tracing::debug!(schema = schema_name, "validating JSON schema");
    let outcome = response.json().and_then(|doc| {
        let result = registry.validate(schema_name, &doc)?;
        if result.is_valid() {
            Ok(())
        } else {
            Err(AssertionError::Schema { result })
        }
    });
    logged("json_schema", outcome)
}

/// The body is an array whose every element satisfies `schema_name`.
pub fn json_schema_each(
    response: &ResponseSnapshot,
    registry: &SchemaRegistry,
    schema_name: &str,
) -> Result<(), AssertionError> {
    tracing::debug!(schema = schema_name, "validating JSON schema for each element");
    let outcome = response.json().and_then(|doc| {
        let result = registry.validate_each(schema_name, &doc)?;
        if result.is_valid() {
            Ok(())
        } else {
            Err(AssertionError::Schema { result })
        }
    });
    logged("json_schema_each", outcome)
}
