//! # Error Types
//!
//! Errors shared across the workspace. All errors use `thiserror`.
//!
//! Data problems (a response body that does not match its schema) are not
//! errors at this level: they are reported as violations. The types here
//! cover caller mistakes only.

use thiserror::Error;

/// A validation call named a schema that is not registered.
///
/// This is a programming error on the caller's side and is never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown schema '{name}' (registered: {})", .registered.join(", "))]
pub struct UnknownSchemaError {
    /// The name the caller asked for.
    pub name: String,
    /// Names that were registered at the time of the call, sorted.
    pub registered: Vec<String>,
}

impl UnknownSchemaError {
    /// Build the error from the requested name and the registered names.
    pub fn new<I, S>(name: impl Into<String>, registered: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registered: Vec<String> = registered.into_iter().map(Into::into).collect();
        registered.sort();
        Self {
            name: name.into(),
            registered,
        }
    }
}

/// A field path string could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Two consecutive dots, or a leading/trailing dot.
    #[error("empty segment at position {position} in path '{path}'")]
    EmptySegment {
        /// The offending path.
        path: String,
        /// Zero-based index of the empty segment.
        position: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_schema_lists_registered_names_sorted() {
        let err = UnknownSchemaError::new("comment", ["user", "post"]);
        assert_eq!(err.registered, vec!["post".to_string(), "user".to_string()]);
        assert_eq!(
            err.to_string(),
            "unknown schema 'comment' (registered: post, user)"
        );
    }

    #[test]
    fn path_error_display() {
        let err = PathError::EmptySegment {
            path: "a..b".into(),
            position: 1,
        };
        assert!(err.to_string().contains("a..b"));
        assert!(err.to_string().contains("position 1"));
    }
}
