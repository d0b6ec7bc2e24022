//! # Recorded Responses
//!
//! A `ResponseSnapshot` is everything the assertions need from an HTTP
//! exchange: status, headers, body text and elapsed time.
//!
//! ## File Format
//!
//! ```json
//! {
//!   "status": 200,
//!   "headers": {"Content-Type": "application/json; charset=utf-8"},
//!   "body": {"id": 1, "title": "..."},
//!   "elapsed_ms": 142
//! }
//! ```
//!
//! `body` may be any JSON value, which is kept as its serialized text, or a
//! string, which is kept verbatim. Header names are case-insensitive.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::error::AssertionError;

/// A recorded HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RecordedResponse")]
pub struct ResponseSnapshot {
    status: u16,
    headers: BTreeMap<String, String>,
    body: String,
    elapsed: Duration,
}

#[derive(Deserialize)]
struct RecordedResponse {
    status: u16,
    #[serde(default)]
    headers: BTreeMap<String, String>,
    #[serde(default)]
    body: Value,
    #[serde(default)]
    elapsed_ms: u64,
}

impl From<RecordedResponse> for ResponseSnapshot {
    fn from(recorded: RecordedResponse) -> Self {
        let body = match recorded.body {
            Value::String(text) => text,
            Value::Null => String::new(),
            other => other.to_string(),
        };
        let mut snapshot = ResponseSnapshot::new(recorded.status)
            .with_text(body)
            .with_elapsed(Duration::from_millis(recorded.elapsed_ms));
        for (name, value) in recorded.headers {
            snapshot = snapshot.with_header(&name, value);
        }
        snapshot
    }
}

impl ResponseSnapshot {
    /// A response with the given status, no headers, empty body.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: String::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Add or replace a header.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Set a JSON body and the matching content type.
    pub fn with_json(self, body: &Value) -> Self {
        self.with_header("content-type", "application/json")
            .with_text(body.to_string())
    }

    /// Set the raw body text.
    pub fn with_text(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the elapsed time.
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// Parse a recorded-response document.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// All headers, names lowercased.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Media type of the `Content-Type` header, without parameters.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
            .map(|v| v.split(';').next().unwrap_or_default().trim())
    }

    /// Raw body text.
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON.
    pub fn json(&self) -> Result<Value, AssertionError> {
        serde_json::from_str(&self.body).map_err(|e| AssertionError::InvalidJson {
            reason: e.to_string(),
        })
    }

    /// Time between request and response.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
