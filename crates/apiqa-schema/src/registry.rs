//! # Schema Registry
//!
//! Holds the compiled schemas by name and is the entry point for every
//! validation call.
//!
//! ## Builtin Schemas
//!
//! `user` and `post` are embedded from the repository's `schemas/`
//! directory at compile time and compiled once per process by
//! [`builtin_registry`]. Additional schemas are loaded from any directory
//! of `*.schema.json` files with [`SchemaRegistry::load_dir`].
//!
//! ## Thread Safety
//!
//! `SchemaRegistry` is `Send + Sync` and never mutated by validation, so a
//! single instance can serve concurrent callers.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use apiqa_core::{FieldPath, JsonType, UnknownSchemaError};
use serde_json::Value;

use crate::error::SchemaError;
use crate::result::{ValidationResult, Violation, ViolationKind};
use crate::schema::Schema;

/// Suffix identifying schema files in a directory.
const SCHEMA_FILE_SUFFIX: &str = ".schema.json";

/// Embedded builtin schema documents, by name.
const BUILTIN_DOCUMENTS: &[(&str, &str)] = &[
    ("user", include_str!("../../../schemas/user.schema.json")),
    ("post", include_str!("../../../schemas/post.schema.json")),
];

static BUILTIN: OnceLock<Result<SchemaRegistry, String>> = OnceLock::new();

/// The process-wide registry of builtin schemas, compiled on first use.
///
/// # Errors
///
/// Returns `SchemaError::SchemaLoadError` if an embedded document fails to
/// compile. The failure is cached; later calls return the same error.
pub fn builtin_registry() -> Result<&'static SchemaRegistry, SchemaError> {
    BUILTIN
        .get_or_init(|| SchemaRegistry::builtin().map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|reason| SchemaError::SchemaLoadError {
            schema_name: "builtin".to_string(),
            reason: reason.clone(),
        })
}

/// Validate `value` against a builtin schema.
///
/// # Errors
///
/// Returns `SchemaError::UnknownSchema` if `schema_name` is not a builtin
/// schema. Invalid data is reported in the returned result, never as an
/// error.
pub fn validate(schema_name: &str, value: &Value) -> Result<ValidationResult, SchemaError> {
    Ok(builtin_registry()?.validate(schema_name, value)?)
}

/// Compiled schemas indexed by name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Schema>,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the embedded `user` and `post` schemas.
    ///
    /// # Errors
    ///
    /// Returns an error if an embedded document is not valid JSON or does
    /// not compile.
    pub fn builtin() -> Result<Self, SchemaError> {
        let mut registry = Self::new();
        for (name, source) in BUILTIN_DOCUMENTS {
            let document: Value =
                serde_json::from_str(source).map_err(|e| SchemaError::SchemaLoadError {
                    schema_name: name.to_string(),
                    reason: format!("invalid JSON: {e}"),
                })?;
            registry.insert(Schema::compile(*name, document)?);
        }
        Ok(registry)
    }

    /// Builtin schemas plus every `*.schema.json` file in `dir`.
    pub fn with_dir(dir: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let mut registry = Self::builtin()?;
        registry.load_dir(dir)?;
        Ok(registry)
    }

    /// Load every `*.schema.json` file in `dir`.
    ///
    /// The schema name is the file name without the `.schema.json` suffix.
    /// Files are loaded in name order; a name that is already registered is
    /// replaced. Nothing is registered unless every file compiles.
    ///
    /// Returns the number of schemas loaded.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::SchemaLoadError` if the directory or a file
    /// cannot be read or parsed, or a compilation error for the first file
    /// that does not compile.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, SchemaError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| SchemaError::SchemaLoadError {
            schema_name: dir.display().to_string(),
            reason: format!("cannot read schema directory: {e}"),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(name) = file_name.strip_suffix(SCHEMA_FILE_SUFFIX) {
                if !name.is_empty() {
                    files.push((name.to_string(), path.clone()));
                }
            }
        }
        files.sort();

        let mut staged = Vec::with_capacity(files.len());
        for (name, path) in &files {
            let content = std::fs::read_to_string(path)?;
            let document: Value =
                serde_json::from_str(&content).map_err(|e| SchemaError::SchemaLoadError {
                    schema_name: name.clone(),
                    reason: format!("invalid JSON: {e}"),
                })?;
            staged.push(Schema::compile(name.as_str(), document)?);
            tracing::debug!(schema = %name, path = %path.display(), "compiled schema");
        }

        let loaded = staged.len();
        for schema in staged {
            self.insert(schema);
        }
        Ok(loaded)
    }

    /// Register a compiled schema, returning the one it replaced.
    pub fn insert(&mut self, schema: Schema) -> Option<Schema> {
        let replaced = self.schemas.insert(schema.name().to_string(), schema);
        if let Some(old) = &replaced {
            tracing::warn!(schema = old.name(), "schema replaced by a later definition");
        }
        replaced
    }

    /// Look up a schema by name.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Look up a schema or produce the caller-facing error.
    pub fn require(&self, name: &str) -> Result<&Schema, UnknownSchemaError> {
        self.schemas
            .get(name)
            .ok_or_else(|| UnknownSchemaError::new(name, self.schemas.keys().cloned()))
    }

    /// The original document of a schema.
    pub fn document(&self, name: &str) -> Option<&Value> {
        self.get(name).map(Schema::document)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    /// Iterate over schemas in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Validate one resource against a named schema.
    ///
    /// Every applicable check runs; the result lists all violations.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSchemaError` if `schema_name` is not registered.
    pub fn validate(
        &self,
        schema_name: &str,
        value: &Value,
    ) -> Result<ValidationResult, UnknownSchemaError> {
        let schema = self.require(schema_name)?;
        let result = schema.validate(value);
        record(&result);
        Ok(result)
    }

    /// Validate a JSON array where every element is a resource of the
    /// named schema. Violation paths are prefixed with the element index.
    ///
    /// A value that is not an array yields a single `type_mismatch` at the
    /// root.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSchemaError` if `schema_name` is not registered.
    pub fn validate_each(
        &self,
        schema_name: &str,
        value: &Value,
    ) -> Result<ValidationResult, UnknownSchemaError> {
        let schema = self.require(schema_name)?;
        let violations = match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .flat_map(|(index, item)| {
                    let prefix = FieldPath::root().index(index);
                    schema
                        .validate(item)
                        .into_violations()
                        .into_iter()
                        .map(move |v| v.prefixed(&prefix))
                })
                .collect(),
            other => vec![Violation::new(
                FieldPath::root(),
                ViolationKind::TypeMismatch,
                format!("expected array, found {}", JsonType::of(other)),
            )],
        };
        let result = ValidationResult::new(schema_name, violations);
        record(&result);
        Ok(result)
    }
}

/// Log and count one finished validation.
fn record(result: &ValidationResult) {
    let outcome = if result.is_valid() { "pass" } else { "fail" };
    tracing::debug!(
        schema = result.schema(),
        outcome,
        violations = result.len(),
        "validated"
    );
    metrics::counter!(
        "apiqa_validations_total",
        "schema" => result.schema().to_string(),
        "outcome" => outcome
    )
    .increment(1);
    for v in result.violations() {
        metrics::counter!(
            "apiqa_violations_total",
            "schema" => result.schema().to_string(),
            "constraint" => v.kind.code().to_string()
        )
        .increment(1);
    }
}
