//! Errors raised while loading, compiling, or looking up schemas.
//!
//! None of these describe bad response data. A response that fails its
//! schema is a [`ValidationResult`](crate::ValidationResult) with
//! violations, not an error.

use apiqa_core::UnknownSchemaError;
use thiserror::Error;

/// Error loading or resolving a schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// No schema is registered under the requested name.
    #[error(transparent)]
    UnknownSchema(#[from] UnknownSchemaError),

    /// The schema file could not be read or parsed.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoadError {
        /// Schema file name or identifier.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// The document uses a keyword outside the compiled subset.
    #[error("schema '{schema_name}' uses unsupported keyword '{keyword}' at '{path}'")]
    UnsupportedKeyword {
        /// Schema name.
        schema_name: String,
        /// JSON Pointer to the schema node holding the keyword.
        path: String,
        /// The keyword.
        keyword: String,
    },

    /// A supported keyword carries a value of the wrong shape.
    #[error("schema '{schema_name}' has invalid '{keyword}' at '{path}': {reason}")]
    InvalidKeyword {
        /// Schema name.
        schema_name: String,
        /// JSON Pointer to the schema node holding the keyword.
        path: String,
        /// The keyword.
        keyword: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A `pattern` keyword is not a valid regular expression.
    #[error("schema '{schema_name}' has invalid pattern {pattern:?} at '{path}': {reason}")]
    InvalidPattern {
        /// Schema name.
        schema_name: String,
        /// JSON Pointer to the schema node holding the pattern.
        path: String,
        /// The pattern source.
        pattern: String,
        /// Regex compiler message.
        reason: String,
    },

    /// The draft-07 conformance validator could not be built.
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuildError {
        /// Schema name.
        schema_name: String,
        /// Reason the validator could not be built.
        reason: String,
    },

    /// IO error reading a schema directory.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
