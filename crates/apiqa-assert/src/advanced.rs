//! # Advanced Assertions
//!
//! Checks on response metadata that production APIs carry beyond the
//! resource itself: security headers, pagination fields, date fields,
//! rate-limit headers, and agreement between several responses.
//!
//! Header and field names are matched against common aliases; the first
//! alias present is used. Multi-part checks report every problem at once.

use apiqa_core::{FieldPath, JsonType};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::assertions::logged;
use crate::error::AssertionError;
use crate::snapshot::ResponseSnapshot;

/// Headers [`security_headers`] callers usually require.
pub const DEFAULT_SECURITY_HEADERS: &[&str] =
    &["X-Content-Type-Options", "X-Frame-Options", "X-XSS-Protection"];

const PAGE_SIZE_KEYS: &[&str] = &["page_size", "limit", "per_page", "size"];
const TOTAL_COUNT_KEYS: &[&str] = &["total", "total_count", "count", "total_items"];
const HAS_NEXT_KEYS: &[&str] = &["has_next", "has_next_page", "next_page_url"];
const ITEMS_KEYS: &[&str] = &["data", "items", "results", "records"];

const LIMIT_HEADERS: &[&str] = &["X-RateLimit-Limit", "X-Rate-Limit-Limit", "RateLimit-Limit"];
const REMAINING_HEADERS: &[&str] = &[
    "X-RateLimit-Remaining",
    "X-Rate-Limit-Remaining",
    "RateLimit-Remaining",
];

/// Every header in `required` is present.
pub fn security_headers(
    response: &ResponseSnapshot,
    required: &[&str],
) -> Result<(), AssertionError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| response.header(name).is_none())
        .map(|name| name.to_string())
        .collect();
    let outcome = if missing.is_empty() {
        Ok(())
    } else {
        Err(AssertionError::SecurityHeaders { missing })
    };
    logged("security_headers", outcome)
}

/// Expected pagination metadata. Unset fields are not checked, and a field
/// absent from the body is not checked either.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageExpectations {
    /// Page size; also an upper bound on the number of items.
    pub page_size: Option<u64>,
    /// Total item count.
    pub total_count: Option<u64>,
    /// Whether a next page exists.
    pub has_next: Option<bool>,
}

fn first_key<'a>(body: &'a Value, aliases: &[&'static str]) -> Option<(&'static str, &'a Value)> {
    aliases
        .iter()
        .find_map(|key| body.get(*key).map(|value| (*key, value)))
}

/// Truthiness of a JSON value: `null`, `false`, zero and empty containers
/// are false.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// The top-level pagination fields agree with `expected`.
pub fn pagination(
    response: &ResponseSnapshot,
    expected: &PageExpectations,
) -> Result<(), AssertionError> {
    let outcome = response.json().and_then(|body| {
        let mut problems = Vec::new();

        if let Some(size) = expected.page_size {
            if let Some((key, items)) = first_key(&body, ITEMS_KEYS) {
                match items {
                    Value::Array(items) if items.len() as u64 > size => {
                        problems.push(format!("too many items: {} > {size}", items.len()));
                    }
                    Value::Array(_) => {}
                    other => problems.push(format!(
                        "'{key}' is not an array (found {})",
                        JsonType::of(other)
                    )),
                }
            }
            if let Some((_, actual)) = first_key(&body, PAGE_SIZE_KEYS) {
                if actual.as_u64() != Some(size) {
                    problems.push(format!("page size mismatch: {actual} != {size}"));
                }
            }
        }

        if let Some(total) = expected.total_count {
            if let Some((_, actual)) = first_key(&body, TOTAL_COUNT_KEYS) {
                if actual.as_u64() != Some(total) {
                    problems.push(format!("total count mismatch: {actual} != {total}"));
                }
            }
        }

        if let Some(has_next) = expected.has_next {
            if let Some((_, actual)) = first_key(&body, HAS_NEXT_KEYS) {
                if truthy(actual) != has_next {
                    problems.push(format!("has next page mismatch: {actual} != {has_next}"));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AssertionError::Pagination { problems })
        }
    });
    logged("pagination", outcome)
}

/// How a date string is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DateFormat {
    /// RFC 3339 / ISO-8601: date-time with or without offset, or a bare
    /// date. Values without an offset are taken as UTC.
    #[default]
    Iso8601,
    /// A strftime pattern such as `%Y-%m-%d` or `%d/%m/%Y %H:%M`.
    Pattern(String),
}

impl std::fmt::Display for DateFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Iso8601 => f.write_str("ISO-8601"),
            Self::Pattern(pattern) => f.write_str(pattern),
        }
    }
}

impl DateFormat {
    /// Parse `text`, normalizing to UTC.
    pub fn parse(&self, text: &str) -> Result<DateTime<Utc>, String> {
        match self {
            Self::Iso8601 => {
                if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                    return Ok(dt.with_timezone(&Utc));
                }
                if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
                    return Ok(Utc.from_utc_datetime(&naive));
                }
                let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| e.to_string())?;
                midnight(date)
            }
            Self::Pattern(pattern) => {
                if let Ok(dt) = DateTime::parse_from_str(text, pattern) {
                    return Ok(dt.with_timezone(&Utc));
                }
                if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
                    return Ok(Utc.from_utc_datetime(&naive));
                }
                let date = NaiveDate::parse_from_str(text, pattern).map_err(|e| e.to_string())?;
                midnight(date)
            }
        }
    }
}

fn midnight(date: NaiveDate) -> Result<DateTime<Utc>, String> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| format!("{date} has no midnight"))
}

/// Constraints on a date field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRule {
    /// Expected format.
    pub format: DateFormat,
    /// Whether dates after now pass.
    pub allow_future: bool,
    /// Oldest allowed date, in days before now.
    pub max_age_days: Option<u32>,
}

impl Default for DateRule {
    fn default() -> Self {
        Self {
            format: DateFormat::Iso8601,
            allow_future: true,
            max_age_days: None,
        }
    }
}

/// The key path holds a date string satisfying `rule`. Returns the parsed
/// date.
pub fn json_date(
    response: &ResponseSnapshot,
    path: &str,
    rule: &DateRule,
) -> Result<DateTime<Utc>, AssertionError> {
    tracing::debug!(path, format = %rule.format, "asserting date field");
    let outcome = response.json().and_then(|body| {
        let path = FieldPath::parse(path)?;
        let value = match path.resolve(&body) {
            None | Some(Value::Null) => return Err(AssertionError::KeyMissing { path }),
            Some(value) => value,
        };
        let Value::String(text) = value else {
            return Err(AssertionError::KeyType {
                path,
                expected: JsonType::String,
                actual: JsonType::of(value),
            });
        };
        check_date(path, text, rule, Utc::now())
    });
    logged("json_date", outcome)
}

fn check_date(
    path: FieldPath,
    text: &str,
    rule: &DateRule,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, AssertionError> {
    let parsed = rule
        .format
        .parse(text)
        .map_err(|reason| AssertionError::DateFormat {
            path: path.clone(),
            value: text.to_string(),
            format: rule.format.to_string(),
            reason,
        })?;
    if !rule.allow_future && parsed > now {
        return Err(AssertionError::FutureDate {
            path,
            value: text.to_string(),
        });
    }
    if let Some(days) = rule.max_age_days {
        let oldest = now.checked_sub_signed(chrono::Duration::days(i64::from(days)));
        if oldest.is_some_and(|oldest| parsed < oldest) {
            return Err(AssertionError::DateTooOld {
                path,
                value: text.to_string(),
                max_age_days: days,
            });
        }
    }
    Ok(parsed)
}

/// Expected rate-limit header values. Unset fields are not checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitExpectations {
    /// Requests allowed per window.
    pub limit: Option<u64>,
    /// Requests left in the window.
    pub remaining: Option<u64>,
}

fn rate_header(
    response: &ResponseSnapshot,
    aliases: &[&str],
    problems: &mut Vec<String>,
) -> Option<u64> {
    let (name, raw) = aliases
        .iter()
        .find_map(|name| response.header(name).map(|value| (*name, value)))?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            problems.push(format!("header '{name}' is not an integer: {raw:?}"));
            None
        }
    }
}

/// Rate-limit headers match `expected`, and remaining never exceeds the
/// limit. Absent headers are not checked.
pub fn rate_limit(
    response: &ResponseSnapshot,
    expected: &RateLimitExpectations,
) -> Result<(), AssertionError> {
    let mut problems = Vec::new();
    let limit = rate_header(response, LIMIT_HEADERS, &mut problems);
    let remaining = rate_header(response, REMAINING_HEADERS, &mut problems);

    if let (Some(expected), Some(actual)) = (expected.limit, limit) {
        if actual != expected {
            problems.push(format!("rate limit mismatch: {actual} != {expected}"));
        }
    }
    if let (Some(expected), Some(actual)) = (expected.remaining, remaining) {
        if actual != expected {
            problems.push(format!("remaining requests mismatch: {actual} != {expected}"));
        }
    }
    if let (Some(limit), Some(remaining)) = (limit, remaining) {
        if remaining > limit {
            problems.push(format!("remaining ({remaining}) cannot exceed limit ({limit})"));
        }
    }

    let outcome = if problems.is_empty() {
        Ok(())
    } else {
        Err(AssertionError::RateLimit { problems })
    };
    logged("rate_limit", outcome)
}

/// Every response holds the same value at `path`. Numbers may differ by up
/// to `tolerance`. Returns the value from the first response.
pub fn json_consistent(
    responses: &[ResponseSnapshot],
    path: &str,
    tolerance: f64,
) -> Result<Value, AssertionError> {
    let outcome = consistent(responses, path, tolerance);
    logged("json_consistent", outcome)
}

fn consistent(
    responses: &[ResponseSnapshot],
    path: &str,
    tolerance: f64,
) -> Result<Value, AssertionError> {
    if responses.len() < 2 {
        return Err(AssertionError::TooFewResponses {
            count: responses.len(),
        });
    }
    let path = FieldPath::parse(path)?;

    let mut problems = Vec::new();
    let mut values = Vec::with_capacity(responses.len());
    for (index, response) in responses.iter().enumerate() {
        let Ok(body) = response.json() else {
            problems.push(format!("response {index}: invalid JSON"));
            continue;
        };
        match path.resolve(&body) {
            None | Some(Value::Null) => {
                problems.push(format!("response {index}: field '{path}' not found"));
            }
            Some(value) => values.push((index, value.clone())),
        }
    }
    if !problems.is_empty() {
        return Err(AssertionError::Inconsistent { path, problems });
    }

    let (_, reference) = values.remove(0);
    for (index, value) in &values {
        let same = match (reference.as_f64(), value.as_f64()) {
            (Some(a), Some(b)) => (a - b).abs() <= tolerance,
            _ => value == &reference,
        };
        if !same {
            problems.push(format!(
                "response {index}: {value} differs from reference {reference}"
            ));
        }
    }
    if problems.is_empty() {
        Ok(reference)
    } else {
        Err(AssertionError::Inconsistent { path, problems })
    }
}
