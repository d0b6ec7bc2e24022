//! # Constraint Model
//!
//! A compiled schema is a tree of [`Constraint`]s. Every field owns an
//! ordered `Vec<Constraint>`; [`check_field`] walks that list with one
//! routine, [`check`], regardless of constraint kind.
//!
//! ## Ordering
//!
//! The compiler emits constraints in a fixed order:
//!
//! 1. `Required`
//! 2. `Type`
//! 3. `Length`, `Pattern`, `Format`, `Range`
//! 4. `Nested`
//!
//! [`check`] returns [`Flow::Stop`] when a field is absent or has the wrong
//! type, which is what makes a missing field skip its nested checks and a
//! type mismatch supersede the finer-grained ones.

use std::cmp::Ordering;

use apiqa_core::{FieldPath, JsonType};
use regex::Regex;
use serde_json::{Number, Value};

use crate::result::{Violation, ViolationKind};

/// A regular expression that must match the whole value.
#[derive(Debug, Clone)]
pub struct AnchoredPattern {
    source: String,
    regex: Regex,
}

impl AnchoredPattern {
    /// Compile `source` wrapped in `^(?:...)$`.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written in the schema.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the entire `text` matches.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// String formats that are checked rather than treated as annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringFormat {
    /// `local@domain.tld`.
    Email,
    /// Absolute `http` or `https` URL.
    Uri,
}

impl StringFormat {
    /// Look up a checked format by its draft-07 name. Unknown names are
    /// annotations and return `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "email" => Some(Self::Email),
            "uri" => Some(Self::Uri),
            _ => None,
        }
    }

    /// The draft-07 format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Uri => "uri",
        }
    }

    /// Regular expression implementing the format check.
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::Email => r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}",
            Self::Uri => {
                r"https?://(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b[-a-zA-Z0-9()@:%_+.~#?&/=]*"
            }
        }
    }
}

/// One structural check on a field.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// The field must be present.
    Required,
    /// The value must have this JSON type.
    Type(JsonType),
    /// String length bounds, inclusive, in Unicode scalar values.
    Length {
        /// `minLength`.
        min: Option<u64>,
        /// `maxLength`.
        max: Option<u64>,
    },
    /// The string must match this pattern in full.
    Pattern(AnchoredPattern),
    /// The string must satisfy this format.
    Format {
        /// Which format.
        format: StringFormat,
        /// Compiled matcher for the format.
        matcher: AnchoredPattern,
    },
    /// Numeric bounds, inclusive.
    Range {
        /// `minimum`.
        minimum: Option<Number>,
        /// `maximum`.
        maximum: Option<Number>,
    },
    /// The object must satisfy a nested shape.
    Nested(Shape),
}

/// A named field and its ordered constraints.
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Property name.
    pub name: String,
    /// Constraints, in evaluation order.
    pub constraints: Vec<Constraint>,
}

impl FieldRule {
    /// True if the field carries a `Required` constraint.
    pub fn is_required(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c, Constraint::Required))
    }
}

/// The fields of an object.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    /// Fields, required ones first in declaration order.
    pub fields: Vec<FieldRule>,
}

impl Shape {
    /// Look up a field rule by name.
    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of the required fields.
    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.is_required())
            .map(|f| f.name.as_str())
            .collect()
    }
}

/// Whether to keep evaluating the remaining constraints of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Evaluate the next constraint.
    Continue,
    /// Skip the rest of this field.
    Stop,
}

/// Evaluate every constraint of one field, appending violations to `out`.
pub fn check_field(
    constraints: &[Constraint],
    path: &FieldPath,
    value: Option<&Value>,
    out: &mut Vec<Violation>,
) {
    for constraint in constraints {
        if check(constraint, path, value, out) == Flow::Stop {
            break;
        }
    }
}

/// Evaluate a single constraint.
///
/// `value` is `None` when the field is absent from its parent object.
pub fn check(
    constraint: &Constraint,
    path: &FieldPath,
    value: Option<&Value>,
    out: &mut Vec<Violation>,
) -> Flow {
    let Some(value) = value else {
        if matches!(constraint, Constraint::Required) {
            let name = path.leaf().unwrap_or_default();
            out.push(Violation::new(
                path.clone(),
                ViolationKind::MissingRequired,
                format!("required field '{name}' is missing"),
            ));
        }
        return Flow::Stop;
    };

    match constraint {
        Constraint::Required => Flow::Continue,

        Constraint::Type(expected) => {
            if expected.accepts(value) {
                Flow::Continue
            } else {
                out.push(Violation::new(
                    path.clone(),
                    ViolationKind::TypeMismatch,
                    format!("expected {expected}, found {}", JsonType::of(value)),
                ));
                Flow::Stop
            }
        }

        Constraint::Length { min, max } => {
            if let Value::String(s) = value {
                let len = s.chars().count() as u64;
                if let Some(min) = min.filter(|min| len < *min) {
                    out.push(Violation::new(
                        path.clone(),
                        ViolationKind::LengthOutOfRange,
                        format!("length {len} is below minLength {min}"),
                    ));
                } else if let Some(max) = max.filter(|max| len > *max) {
                    out.push(Violation::new(
                        path.clone(),
                        ViolationKind::LengthOutOfRange,
                        format!("length {len} exceeds maxLength {max}"),
                    ));
                }
            }
            Flow::Continue
        }

        Constraint::Pattern(pattern) => {
            if let Value::String(s) = value {
                if !pattern.is_match(s) {
                    out.push(Violation::new(
                        path.clone(),
                        ViolationKind::PatternMismatch,
                        format!("{s:?} does not match pattern {}", pattern.source()),
                    ));
                }
            }
            Flow::Continue
        }

        Constraint::Format { format, matcher } => {
            if let Value::String(s) = value {
                if !matcher.is_match(s) {
                    out.push(Violation::new(
                        path.clone(),
                        ViolationKind::FormatMismatch,
                        format!("{s:?} is not a valid {}", format.as_str()),
                    ));
                }
            }
            Flow::Continue
        }

        Constraint::Range { minimum, maximum } => {
            if let Value::Number(n) = value {
                if let Some(min) =
                    minimum.as_ref().filter(|min| compare(n, min) == Ordering::Less)
                {
                    out.push(Violation::new(
                        path.clone(),
                        ViolationKind::OutOfRange,
                        format!("{n} is less than minimum {min}"),
                    ));
                } else if let Some(max) =
                    maximum.as_ref().filter(|max| compare(n, max) == Ordering::Greater)
                {
                    out.push(Violation::new(
                        path.clone(),
                        ViolationKind::OutOfRange,
                        format!("{n} is greater than maximum {max}"),
                    ));
                }
            }
            Flow::Continue
        }

        Constraint::Nested(shape) => {
            if let Value::Object(map) = value {
                for field in &shape.fields {
                    check_field(
                        &field.constraints,
                        &path.child(field.name.as_str()),
                        map.get(&field.name),
                        out,
                    );
                }
            }
            Flow::Continue
        }
    }
}

/// Numeric comparison that stays exact for integers.
fn compare(value: &Number, bound: &Number) -> Ordering {
    if let (Some(a), Some(b)) = (value.as_i64(), bound.as_i64()) {
        return a.cmp(&b);
    }
    if let (Some(a), Some(b)) = (value.as_u64(), bound.as_u64()) {
        return a.cmp(&b);
    }
    let a = value.as_f64().unwrap_or(f64::NAN);
    let b = bound.as_f64().unwrap_or(f64::NAN);
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(constraints: &[Constraint], value: Option<&Value>) -> Vec<Violation> {
        let mut out = Vec::new();
        check_field(constraints, &FieldPath::root().child("f"), value, &mut out);
        out
    }

    #[test]
    fn anchored_pattern_matches_whole_value() {
        let p = AnchoredPattern::new("[a-z]+").unwrap();
        assert!(p.is_match("abc"));
        assert!(!p.is_match("abc1"));
        assert!(!p.is_match("1abc"));
        assert_eq!(p.source(), "[a-z]+");
    }

    #[test]
    fn anchored_pattern_tolerates_explicit_anchors() {
        let p = AnchoredPattern::new("^[a-zA-Z0-9._-]+$").unwrap();
        assert!(p.is_match("Bret"));
        assert!(!p.is_match("bad user!"));
    }

    #[test]
    fn alternation_is_anchored_as_a_group() {
        let p = AnchoredPattern::new("a|b").unwrap();
        assert!(p.is_match("a"));
        assert!(!p.is_match("ab"));
        assert!(!p.is_match("xa"));
    }

    #[test]
    fn missing_required_stops_field() {
        let out = run(&[Constraint::Required, Constraint::Type(JsonType::String)], None);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, ViolationKind::MissingRequired);
        assert_eq!(out[0].message, "required field 'f' is missing");
    }

    #[test]
    fn absent_optional_field_is_skipped() {
        let out = run(&[Constraint::Type(JsonType::String)], None);
        assert!(out.is_empty());
    }

    #[test]
    fn type_mismatch_supersedes_finer_checks() {
        let constraints = [
            Constraint::Type(JsonType::String),
            Constraint::Length {
                min: Some(5),
                max: None,
            },
            Constraint::Pattern(AnchoredPattern::new("[a-z]+").unwrap()),
        ];
        let out = run(&constraints, Some(&json!(12)));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, ViolationKind::TypeMismatch);
        assert_eq!(out[0].message, "expected string, found integer");
    }

    #[test]
    fn length_and_pattern_both_reported() {
        let constraints = [
            Constraint::Type(JsonType::String),
            Constraint::Length {
                min: Some(5),
                max: None,
            },
            Constraint::Pattern(AnchoredPattern::new("[a-z]+").unwrap()),
        ];
        let out = run(&constraints, Some(&json!("A1")));
        let kinds: Vec<_> = out.iter().map(|v| v.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![ViolationKind::LengthOutOfRange, ViolationKind::PatternMismatch]
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let constraints = [Constraint::Length {
            min: None,
            max: Some(3),
        }];
        assert!(run(&constraints, Some(&json!("äöü"))).is_empty());
        assert_eq!(run(&constraints, Some(&json!("äöüß"))).len(), 1);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let constraints = [Constraint::Range {
            minimum: Some(Number::from(1)),
            maximum: Some(Number::from(10)),
        }];
        assert!(run(&constraints, Some(&json!(1))).is_empty());
        assert!(run(&constraints, Some(&json!(10))).is_empty());
        let low = run(&constraints, Some(&json!(0)));
        assert_eq!(low[0].kind, ViolationKind::OutOfRange);
        assert_eq!(low[0].message, "0 is less than minimum 1");
        let high = run(&constraints, Some(&json!(10.5)));
        assert_eq!(high[0].kind, ViolationKind::OutOfRange);
    }

    #[test]
    fn email_format() {
        let format = StringFormat::Email;
        let constraints = [Constraint::Format {
            format,
            matcher: AnchoredPattern::new(format.pattern()).unwrap(),
        }];
        assert!(run(&constraints, Some(&json!("Sincere@april.biz"))).is_empty());
        let out = run(&constraints, Some(&json!("not-an-email")));
        assert_eq!(out[0].kind, ViolationKind::FormatMismatch);
    }

    #[test]
    fn uri_format() {
        let format = StringFormat::Uri;
        let matcher = AnchoredPattern::new(format.pattern()).unwrap();
        assert!(matcher.is_match("https://example.com/path?q=1"));
        assert!(matcher.is_match("http://www.hildegard.org"));
        assert!(!matcher.is_match("hildegard.org"));
    }

    #[test]
    fn unknown_format_names_are_annotations() {
        assert_eq!(StringFormat::from_name("email"), Some(StringFormat::Email));
        assert_eq!(StringFormat::from_name("date-time"), None);
    }

    #[test]
    fn nested_prefixes_paths() {
        let shape = Shape {
            fields: vec![FieldRule {
                name: "zipcode".into(),
                constraints: vec![Constraint::Required, Constraint::Type(JsonType::String)],
            }],
        };
        let mut out = Vec::new();
        check_field(
            &[Constraint::Nested(shape)],
            &FieldPath::root().child("address"),
            Some(&json!({})),
            &mut out,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].path.to_string(), "address.zipcode");
    }

    #[test]
    fn compare_mixed_number_kinds() {
        assert_eq!(compare(&Number::from(5), &Number::from(5u64)), Ordering::Equal);
        assert_eq!(compare(&Number::from(-1), &Number::from(0)), Ordering::Less);
        let half = Number::from_f64(0.5).unwrap();
        assert_eq!(compare(&half, &Number::from(1)), Ordering::Less);
    }
}
