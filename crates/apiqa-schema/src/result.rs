//! # Validation Results
//!
//! A [`ValidationResult`] is a value object created fresh by every
//! validation call and owned by the caller. Its violation list is fixed at
//! construction; there is no API to add or remove violations afterwards.

use std::fmt;

use apiqa_core::FieldPath;
use serde::{Serialize, Serializer};

/// The constraint a violation failed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    /// A required field is absent.
    MissingRequired,
    /// The field has the wrong JSON type.
    TypeMismatch,
    /// A string is shorter than `minLength` or longer than `maxLength`.
    LengthOutOfRange,
    /// A string does not match its `pattern`.
    PatternMismatch,
    /// A number is below `minimum` or above `maximum`.
    OutOfRange,
    /// A string does not match its `format`.
    FormatMismatch,
    /// The document could not be decoded as JSON, so no schema check ran.
    InvalidJson,
    /// Any other draft-07 keyword, reported by conformance validation.
    Keyword(String),
}

impl ViolationKind {
    /// Stable snake_case code used in reports and metrics.
    pub fn code(&self) -> &str {
        match self {
            Self::MissingRequired => "missing_required",
            Self::TypeMismatch => "type_mismatch",
            Self::LengthOutOfRange => "length_out_of_range",
            Self::PatternMismatch => "pattern_mismatch",
            Self::OutOfRange => "out_of_range",
            Self::FormatMismatch => "format_mismatch",
            Self::InvalidJson => "invalid_json",
            Self::Keyword(keyword) => keyword,
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for ViolationKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// A single failed check, localized to a field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Location of the offending value (or of the missing field).
    pub path: FieldPath,
    /// The constraint that failed.
    #[serde(rename = "constraint")]
    pub kind: ViolationKind,
    /// Human-readable description.
    pub message: String,
}

impl Violation {
    /// Build a violation.
    pub fn new(path: FieldPath, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
        }
    }

    /// The same violation, relocated under `prefix`.
    pub fn prefixed(&self, prefix: &FieldPath) -> Self {
        Self {
            path: self.path.prefixed(prefix),
            kind: self.kind.clone(),
            message: self.message.clone(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "  (root): [{}] {}", self.kind, self.message)
        } else {
            write!(f, "  {}: [{}] {}", self.path, self.kind, self.message)
        }
    }
}

/// Outcome of one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    schema: String,
    valid: bool,
    violations: Vec<Violation>,
}

impl ValidationResult {
    /// Build a result. The pass flag is derived from `violations`.
    pub fn new(schema: impl Into<String>, violations: Vec<Violation>) -> Self {
        Self {
            schema: schema.into(),
            valid: violations.is_empty(),
            violations,
        }
    }

    /// Name of the schema that was validated against.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// True iff there are no violations.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Violations in the order they were found.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// True if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations located exactly at `path` (dotted text form).
    pub fn at(&self, path: &str) -> Vec<&Violation> {
        self.violations
            .iter()
            .filter(|v| v.path.to_string() == path)
            .collect()
    }

    /// True if some violation of `kind` is located at `path`.
    pub fn has(&self, kind: &ViolationKind, path: &str) -> bool {
        self.at(path).iter().any(|v| &v.kind == kind)
    }

    /// Consumes self and returns the violations.
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return write!(f, "valid against schema '{}'", self.schema);
        }
        write!(
            f,
            "{} violation(s) against schema '{}':",
            self.violations.len(),
            self.schema
        )?;
        for v in &self.violations {
            write!(f, "\n{v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(text: &str) -> FieldPath {
        FieldPath::parse(text).unwrap()
    }

    #[test]
    fn pass_flag_follows_violations() {
        assert!(ValidationResult::new("user", vec![]).is_valid());
        let failed = ValidationResult::new(
            "user",
            vec![Violation::new(
                path("email"),
                ViolationKind::MissingRequired,
                "required field 'email' is missing",
            )],
        );
        assert!(!failed.is_valid());
        assert_eq!(failed.len(), 1);
        assert!(failed.has(&ViolationKind::MissingRequired, "email"));
        assert!(!failed.has(&ViolationKind::TypeMismatch, "email"));
    }

    #[test]
    fn violation_display_format() {
        let v = Violation::new(
            path("address.zipcode"),
            ViolationKind::PatternMismatch,
            r#""abc" does not match pattern ^[0-9]{5}$"#,
        );
        let display = v.to_string();
        assert!(display.contains("address.zipcode"));
        assert!(display.contains("[pattern_mismatch]"));
    }

    #[test]
    fn violation_display_root() {
        let v = Violation::new(
            FieldPath::root(),
            ViolationKind::TypeMismatch,
            "expected object, found array",
        );
        assert!(v.to_string().contains("(root)"));
    }

    #[test]
    fn serializes_with_codes() {
        let result = ValidationResult::new(
            "post",
            vec![Violation::new(
                path("id"),
                ViolationKind::OutOfRange,
                "0 is less than minimum 1",
            )],
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["schema"], "post");
        assert_eq!(json["valid"], false);
        assert_eq!(json["violations"][0]["path"], "id");
        assert_eq!(json["violations"][0]["constraint"], "out_of_range");
    }

    #[test]
    fn keyword_kind_uses_keyword_as_code() {
        let kind = ViolationKind::Keyword("enum".into());
        assert_eq!(kind.code(), "enum");
    }

    #[test]
    fn prefixed_relocates_path() {
        let v = Violation::new(path("email"), ViolationKind::MissingRequired, "m");
        let moved = v.prefixed(&FieldPath::root().index(2));
        assert_eq!(moved.path.to_string(), "2.email");
        assert_eq!(moved.kind, v.kind);
    }
}
