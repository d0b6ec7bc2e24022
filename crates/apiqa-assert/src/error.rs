//! Assertion failures.

use std::time::Duration;

use apiqa_core::{FieldPath, JsonType, PathError, UnknownSchemaError};
use apiqa_schema::ValidationResult;
use serde_json::Value;
use thiserror::Error;

/// A response did not meet an expectation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssertionError {
    /// Status code differs.
    #[error("expected status code {expected}, got {actual}")]
    StatusCode {
        /// Expected code.
        expected: u16,
        /// Received code.
        actual: u16,
    },

    /// Status code outside the accepted set.
    #[error("expected status code in {expected:?}, got {actual}")]
    StatusCodeNotIn {
        /// Accepted codes.
        expected: Vec<u16>,
        /// Received code.
        actual: u16,
    },

    /// Response took longer than allowed.
    #[error("response time {actual:?} exceeded limit {limit:?}")]
    ResponseTime {
        /// Upper bound.
        limit: Duration,
        /// Measured time.
        actual: Duration,
    },

    /// Content type differs (parameters after `;` ignored).
    #[error("expected Content-Type {expected}, got {}", .actual.as_deref().unwrap_or("<none>"))]
    ContentType {
        /// Expected media type.
        expected: String,
        /// Received media type, if any.
        actual: Option<String>,
    },

    /// Header absent.
    #[error("header '{name}' not found in response")]
    HeaderMissing {
        /// Header name.
        name: String,
    },

    /// Header present with a different value, or absent.
    #[error(
        "expected header '{name}' = {expected}, got {}",
        .actual.as_deref().unwrap_or("<none>")
    )]
    HeaderValue {
        /// Header name.
        name: String,
        /// Expected value.
        expected: String,
        /// Received value, if any.
        actual: Option<String>,
    },

    /// Body text does not contain the expected substring.
    #[error("text {text:?} not found in response")]
    TextMissing {
        /// Expected substring.
        text: String,
    },

    /// Body is not JSON.
    #[error("response is not valid JSON: {reason}")]
    InvalidJson {
        /// Parser message.
        reason: String,
    },

    /// Key path does not resolve.
    #[error("key '{path}' not found in response")]
    KeyMissing {
        /// Requested path.
        path: FieldPath,
    },

    /// Key resolves to a different value.
    #[error("expected '{path}' = {expected}, got {actual}")]
    KeyValue {
        /// Requested path.
        path: FieldPath,
        /// Expected value.
        expected: Value,
        /// Received value.
        actual: Value,
    },

    /// Key resolves to a value of another type.
    #[error("expected '{path}' to be {expected}, got {actual}")]
    KeyType {
        /// Requested path.
        path: FieldPath,
        /// Expected type.
        expected: JsonType,
        /// Received type.
        actual: JsonType,
    },

    /// Key does not hold an array.
    #[error("data at path '{path}' is not an array (found {actual})")]
    NotAnArray {
        /// Requested path.
        path: FieldPath,
        /// Received type.
        actual: JsonType,
    },

    /// Array has another length.
    #[error("expected array length {expected} at '{path}', got {actual}")]
    ArrayLength {
        /// Requested path.
        path: FieldPath,
        /// Expected length.
        expected: usize,
        /// Received length.
        actual: usize,
    },

    /// Partial match failed; lists every missing or mismatched key.
    #[error("response doesn't contain expected data; missing: {}", .missing.join(", "))]
    Contains {
        /// `key` or `key (value mismatch)` entries.
        missing: Vec<String>,
    },

    /// Required security headers absent; lists every one.
    #[error("missing security headers: {}", .missing.join(", "))]
    SecurityHeaders {
        /// Header names as requested.
        missing: Vec<String>,
    },

    /// Pagination metadata disagrees with the expectation.
    #[error("pagination validation failed: {}", .problems.join("; "))]
    Pagination {
        /// One entry per mismatched field.
        problems: Vec<String>,
    },

    /// Date string does not parse in the expected format.
    #[error("invalid date at '{path}': {value:?} is not {format} ({reason})")]
    DateFormat {
        /// Requested path.
        path: FieldPath,
        /// The string found.
        value: String,
        /// `ISO-8601` or the strftime pattern.
        format: String,
        /// Parser message.
        reason: String,
    },

    /// Date lies in the future.
    #[error("future date not allowed at '{path}': {value}")]
    FutureDate {
        /// Requested path.
        path: FieldPath,
        /// The string found.
        value: String,
    },

    /// Date is older than the allowed age.
    #[error("date {value} at '{path}' is older than {max_age_days} days")]
    DateTooOld {
        /// Requested path.
        path: FieldPath,
        /// The string found.
        value: String,
        /// Allowed age.
        max_age_days: u32,
    },

    /// Rate-limit headers disagree with the expectation or each other.
    #[error("rate limit validation failed: {}", .problems.join("; "))]
    RateLimit {
        /// One entry per problem.
        problems: Vec<String>,
    },

    /// Consistency needs at least two responses.
    #[error("need at least 2 responses to check consistency, got {count}")]
    TooFewResponses {
        /// Responses given.
        count: usize,
    },

    /// Responses disagree on the value at a path, or lack it.
    #[error("data inconsistency at '{path}': {}", .problems.join("; "))]
    Inconsistent {
        /// Compared path.
        path: FieldPath,
        /// One entry per differing or unusable response.
        problems: Vec<String>,
    },

    /// Body does not satisfy the schema.
    #[error("schema validation failed: {result}")]
    Schema {
        /// The full validation result.
        result: ValidationResult,
    },

    /// Schema name not registered.
    #[error(transparent)]
    UnknownSchema(#[from] UnknownSchemaError),

    /// Malformed key path.
    #[error(transparent)]
    Path(#[from] PathError),
}
