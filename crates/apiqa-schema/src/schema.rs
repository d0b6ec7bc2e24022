//! # Schema Compilation
//!
//! Turns a draft-07 JSON Schema document into the [`Constraint`] model.
//!
//! ## Supported Keywords
//!
//! `type`, `required`, `properties`, `minLength`, `maxLength`, `minimum`,
//! `maximum`, `pattern`, `format`.
//!
//! Annotation keywords (`$schema`, `$id`, `title`, `description`, ...) are
//! accepted and ignored. Anything else is rejected with
//! [`SchemaError::UnsupportedKeyword`] so that a schema never silently
//! validates less than its author intended. Documents that need the rest of
//! draft-07 can still be checked through
//! [`SchemaRegistry::conformance`](crate::SchemaRegistry::conformance).

use apiqa_core::{FieldPath, JsonType};
use serde_json::{Map, Value};

use crate::constraint::{check_field, AnchoredPattern, Constraint, FieldRule, Shape, StringFormat};
use crate::error::SchemaError;
use crate::result::ValidationResult;

/// Keywords that carry no validation semantics.
const ANNOTATION_KEYWORDS: &[&str] = &[
    "$schema",
    "$id",
    "$comment",
    "title",
    "description",
    "examples",
    "default",
    "additionalProperties",
];

/// Keywords the compiler turns into constraints.
const SUPPORTED_KEYWORDS: &[&str] = &[
    "type",
    "required",
    "properties",
    "minLength",
    "maxLength",
    "minimum",
    "maximum",
    "pattern",
    "format",
];

/// A named, compiled, immutable schema.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    title: Option<String>,
    constraints: Vec<Constraint>,
    document: Value,
}

impl Schema {
    /// Compile a draft-07 document under `name`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::UnsupportedKeyword` for keywords outside the
    /// compiled subset, `SchemaError::InvalidKeyword` for malformed keyword
    /// values, and `SchemaError::InvalidPattern` for bad regular expressions.
    pub fn compile(name: impl Into<String>, document: Value) -> Result<Self, SchemaError> {
        let name = name.into();
        let constraints = Compiler { schema_name: &name }.node(&document, "", false)?;
        let title = document
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(Self {
            name,
            title,
            constraints,
            document,
        })
    }

    /// Registered name (`user`, `post`, ...).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The document's `title`, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Root constraints.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The root object shape, if the schema declares one.
    pub fn shape(&self) -> Option<&Shape> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::Nested(shape) => Some(shape),
            _ => None,
        })
    }

    /// The original JSON Schema document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Validate `value`, collecting every violation.
    pub fn validate(&self, value: &Value) -> ValidationResult {
        let mut violations = Vec::new();
        check_field(&self.constraints, &FieldPath::root(), Some(value), &mut violations);
        ValidationResult::new(self.name.as_str(), violations)
    }
}

struct Compiler<'a> {
    schema_name: &'a str,
}

impl Compiler<'_> {
    /// Compile one schema node into an ordered constraint list.
    fn node(
        &self,
        node: &Value,
        path: &str,
        required: bool,
    ) -> Result<Vec<Constraint>, SchemaError> {
        let obj = node
            .as_object()
            .ok_or_else(|| self.invalid(path, "$node", "schema node must be an object"))?;

        for keyword in obj.keys() {
            let known = SUPPORTED_KEYWORDS.contains(&keyword.as_str())
                || ANNOTATION_KEYWORDS.contains(&keyword.as_str());
            if !known {
                return Err(SchemaError::UnsupportedKeyword {
                    schema_name: self.schema_name.to_string(),
                    path: display_pointer(path),
                    keyword: keyword.clone(),
                });
            }
        }

        let mut constraints = Vec::new();

        if required {
            constraints.push(Constraint::Required);
        }

        if let Some(t) = obj.get("type") {
            let name = t
                .as_str()
                .ok_or_else(|| self.invalid(path, "type", "only a single type name is supported"))?;
            let json_type: JsonType = name
                .parse()
                .map_err(|e: String| self.invalid(path, "type", &e))?;
            constraints.push(Constraint::Type(json_type));
        }

        let min_length = self.length_bound(obj, path, "minLength")?;
        let max_length = self.length_bound(obj, path, "maxLength")?;
        if min_length.is_some() || max_length.is_some() {
            constraints.push(Constraint::Length {
                min: min_length,
                max: max_length,
            });
        }

        if let Some(p) = obj.get("pattern") {
            let source = p
                .as_str()
                .ok_or_else(|| self.invalid(path, "pattern", "must be a string"))?;
            let pattern = AnchoredPattern::new(source).map_err(|e| SchemaError::InvalidPattern {
                schema_name: self.schema_name.to_string(),
                path: display_pointer(path),
                pattern: source.to_string(),
                reason: e.to_string(),
            })?;
            constraints.push(Constraint::Pattern(pattern));
        }

        if let Some(f) = obj.get("format") {
            let name = f
                .as_str()
                .ok_or_else(|| self.invalid(path, "format", "must be a string"))?;
            match StringFormat::from_name(name) {
                Some(format) => {
                    let matcher = AnchoredPattern::new(format.pattern()).map_err(|e| {
                        SchemaError::InvalidPattern {
                            schema_name: self.schema_name.to_string(),
                            path: display_pointer(path),
                            pattern: format.pattern().to_string(),
                            reason: e.to_string(),
                        }
                    })?;
                    constraints.push(Constraint::Format { format, matcher });
                }
                None => {
                    tracing::debug!(
                        schema = self.schema_name,
                        path = %display_pointer(path),
                        format = name,
                        "format treated as annotation"
                    );
                }
            }
        }

        let minimum = self.numeric_bound(obj, path, "minimum")?;
        let maximum = self.numeric_bound(obj, path, "maximum")?;
        if minimum.is_some() || maximum.is_some() {
            constraints.push(Constraint::Range { minimum, maximum });
        }

        if obj.contains_key("properties") || obj.contains_key("required") {
            constraints.push(Constraint::Nested(self.shape(obj, path)?));
        }

        Ok(constraints)
    }

    fn shape(&self, obj: &Map<String, Value>, path: &str) -> Result<Shape, SchemaError> {
        let required: Vec<&str> = match obj.get("required") {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .ok_or_else(|| self.invalid(path, "required", "entries must be strings"))
                })
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(self.invalid(path, "required", "must be an array")),
        };

        let empty = Map::new();
        let properties = match obj.get("properties") {
            None => &empty,
            Some(Value::Object(props)) => props,
            Some(_) => return Err(self.invalid(path, "properties", "must be an object")),
        };

        for name in required.iter().copied() {
            self.field_name(path, "required", name)?;
        }
        for name in properties.keys() {
            self.field_name(path, "properties", name)?;
        }

        let mut fields = Vec::new();
        for name in &required {
            if fields.iter().any(|f: &FieldRule| f.name == *name) {
                continue;
            }
            let constraints = match properties.get(*name) {
                Some(node) => self.node(node, &child_pointer(path, name), true)?,
                None => vec![Constraint::Required],
            };
            fields.push(FieldRule {
                name: name.to_string(),
                constraints,
            });
        }
        for (name, node) in properties {
            if required.contains(&name.as_str()) {
                continue;
            }
            fields.push(FieldRule {
                name: name.clone(),
                constraints: self.node(node, &child_pointer(path, name), false)?,
            });
        }

        Ok(Shape { fields })
    }

    fn length_bound(
        &self,
        obj: &Map<String, Value>,
        path: &str,
        keyword: &str,
    ) -> Result<Option<u64>, SchemaError> {
        obj.get(keyword)
            .map(|v| {
                v.as_u64()
                    .ok_or_else(|| self.invalid(path, keyword, "must be a non-negative integer"))
            })
            .transpose()
    }

    fn numeric_bound(
        &self,
        obj: &Map<String, Value>,
        path: &str,
        keyword: &str,
    ) -> Result<Option<serde_json::Number>, SchemaError> {
        match obj.get(keyword) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(Some(n.clone())),
            Some(_) => Err(self.invalid(path, keyword, "must be a number")),
        }
    }

    /// Field names become path segments, so they must be non-empty and
    /// free of the `.` separator.
    fn field_name(&self, path: &str, keyword: &str, name: &str) -> Result<(), SchemaError> {
        if name.is_empty() {
            return Err(self.invalid(path, keyword, "field names must not be empty"));
        }
        if name.contains('.') {
            let reason = format!("field name {name:?} must not contain '.'");
            return Err(self.invalid(path, keyword, &reason));
        }
        Ok(())
    }

    fn invalid(&self, path: &str, keyword: &str, reason: &str) -> SchemaError {
        SchemaError::InvalidKeyword {
            schema_name: self.schema_name.to_string(),
            path: display_pointer(path),
            keyword: keyword.to_string(),
            reason: reason.to_string(),
        }
    }
}

fn child_pointer(path: &str, property: &str) -> String {
    let escaped = property.replace('~', "~0").replace('/', "~1");
    format!("{path}/properties/{escaped}")
}

fn display_pointer(path: &str) -> String {
    if path.is_empty() {
        "#".to_string()
    } else {
        format!("#{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ViolationKind;
    use serde_json::json;

    #[test]
    fn compiles_required_before_optional() {
        let schema = Schema::compile(
            "thing",
            json!({
                "type": "object",
                "required": ["b", "a"],
                "properties": {
                    "a": {"type": "string"},
                    "b": {"type": "integer"},
                    "c": {"type": "string"}
                }
            }),
        )
        .unwrap();
        let shape = schema.shape().unwrap();
        let names: Vec<_> = shape.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(shape.required_fields(), vec!["b", "a"]);
    }

    #[test]
    fn required_without_property_definition() {
        let schema = Schema::compile("thing", json!({"required": ["id"]})).unwrap();
        let result = schema.validate(&json!({}));
        assert!(result.has(&ViolationKind::MissingRequired, "id"));
        assert!(schema.validate(&json!({"id": "anything"})).is_valid());
    }

    #[test]
    fn constraint_order_is_fixed() {
        let schema = Schema::compile(
            "thing",
            json!({
                "type": "object",
                "required": ["u"],
                "properties": {
                    "u": {"pattern": "[a-z]+", "maxLength": 3, "type": "string"}
                }
            }),
        )
        .unwrap();
        let field = schema.shape().unwrap().field("u").unwrap();
        assert!(matches!(field.constraints[0], Constraint::Required));
        assert!(matches!(field.constraints[1], Constraint::Type(JsonType::String)));
        assert!(matches!(field.constraints[2], Constraint::Length { .. }));
        assert!(matches!(field.constraints[3], Constraint::Pattern(_)));
    }

    #[test]
    fn rejects_unsupported_keyword_with_location() {
        let err = Schema::compile(
            "thing",
            json!({
                "type": "object",
                "properties": {"kind": {"enum": ["a", "b"]}}
            }),
        )
        .unwrap_err();
        match err {
            SchemaError::UnsupportedKeyword { path, keyword, .. } => {
                assert_eq!(keyword, "enum");
                assert_eq!(path, "#/properties/kind");
            }
            other => panic!("Expected UnsupportedKeyword, got: {other}"),
        }
    }

    #[test]
    fn rejects_dotted_field_names() {
        let err = Schema::compile(
            "thing",
            json!({"required": ["a.b"], "properties": {"a.b": {"type": "string"}}}),
        )
        .unwrap_err();
        match err {
            SchemaError::InvalidKeyword { keyword, path, .. } => {
                assert_eq!(keyword, "required");
                assert_eq!(path, "#");
            }
            other => panic!("Expected InvalidKeyword, got: {other}"),
        }

        let err = Schema::compile(
            "thing",
            json!({"properties": {"geo": {"properties": {"lat.lng": {}}}}}),
        )
        .unwrap_err();
        match err {
            SchemaError::InvalidKeyword { keyword, path, .. } => {
                assert_eq!(keyword, "properties");
                assert_eq!(path, "#/properties/geo");
            }
            other => panic!("Expected InvalidKeyword, got: {other}"),
        }
    }

    #[test]
    fn rejects_empty_field_names() {
        let err = Schema::compile("thing", json!({"required": [""]})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidKeyword { .. }));
    }

    #[test]
    fn rejects_type_arrays() {
        let err = Schema::compile("thing", json!({"type": ["string", "null"]})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidKeyword { .. }));
    }

    #[test]
    fn rejects_invalid_pattern() {
        let err = Schema::compile("thing", json!({"type": "string", "pattern": "(unclosed"}))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));
    }

    #[test]
    fn rejects_negative_length() {
        let err = Schema::compile("thing", json!({"minLength": -1})).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidKeyword { ref keyword, .. } if keyword == "minLength"
        ));
    }

    #[test]
    fn annotations_are_ignored() {
        let schema = Schema::compile(
            "thing",
            json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "title": "Thing",
                "description": "d",
                "additionalProperties": false,
                "type": "object"
            }),
        )
        .unwrap();
        assert_eq!(schema.title(), Some("Thing"));
        assert!(schema.validate(&json!({"extra": 1})).is_valid());
    }

    #[test]
    fn unknown_format_is_not_checked() {
        let schema =
            Schema::compile("thing", json!({"type": "string", "format": "date-time"})).unwrap();
        assert!(schema.validate(&json!("not a date")).is_valid());
    }

    #[test]
    fn non_object_root_is_single_type_mismatch() {
        let schema = Schema::compile(
            "thing",
            json!({"type": "object", "required": ["id"]}),
        )
        .unwrap();
        let result = schema.validate(&json!([1, 2]));
        assert_eq!(result.len(), 1);
        assert!(result.has(&ViolationKind::TypeMismatch, ""));
    }

    #[test]
    fn pointer_escaping() {
        assert_eq!(child_pointer("", "a/b"), "/properties/a~1b");
        assert_eq!(display_pointer(""), "#");
    }
}
