//! # Field Paths
//!
//! A `FieldPath` locates a value inside a decoded JSON document. The text
//! form joins segments with dots (`address.geo.lat`); the root is the
//! empty path. When resolving against a document, a segment that parses as
//! an unsigned integer indexes into an array, so `0.email` is the `email`
//! field of the first element of a list response.
//!
//! Paths serialize as their text form.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::str::FromStr;

use crate::error::PathError;

/// Dot-separated location inside a JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// The empty path, pointing at the document itself.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse the dotted text form. The empty string is the root.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        if text.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for (position, segment) in text.split('.').enumerate() {
            if segment.is_empty() {
                return Err(PathError::EmptySegment {
                    path: text.to_string(),
                    position,
                });
            }
            segments.push(segment.to_string());
        }
        Ok(Self(segments))
    }

    /// Convert an RFC 6901 JSON Pointer (`/address/zipcode`) into a path.
    ///
    /// `~1` and `~0` escapes are decoded. Empty pointer tokens are kept
    /// verbatim, since a JSON key may legitimately be empty.
    pub fn from_pointer(pointer: &str) -> Self {
        let segments = pointer
            .split('/')
            .skip(1)
            .map(|token| token.replace("~1", "/").replace("~0", "~"))
            .collect();
        Self(segments)
    }

    /// A new path with `segment` appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// A new path with an array index appended.
    pub fn index(&self, index: usize) -> Self {
        self.child(index.to_string())
    }

    /// A new path with `prefix` in front of this one.
    pub fn prefixed(&self, prefix: &FieldPath) -> Self {
        let mut segments = prefix.0.clone();
        segments.extend(self.0.iter().cloned());
        Self(segments)
    }

    /// True for the empty path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The individual segments.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The last segment, if any.
    pub fn leaf(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Follow this path through `document`.
    ///
    /// Returns `None` if any segment is missing, or if a segment meets a
    /// scalar value.
    pub fn resolve<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        let mut current = document;
        for segment in &self.0 {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn root_is_empty_string() {
        assert!(FieldPath::root().is_root());
        assert_eq!(FieldPath::root().to_string(), "");
        assert_eq!(FieldPath::parse("").unwrap(), FieldPath::root());
    }

    #[test]
    fn child_joins_with_dots() {
        let p = FieldPath::root().child("address").child("zipcode");
        assert_eq!(p.to_string(), "address.zipcode");
        assert_eq!(p.leaf(), Some("zipcode"));
    }

    #[test]
    fn parse_rejects_empty_segments() {
        assert!(matches!(
            FieldPath::parse("a..b"),
            Err(PathError::EmptySegment { position: 1, .. })
        ));
        assert!(FieldPath::parse(".a").is_err());
        assert!(FieldPath::parse("a.").is_err());
    }

    #[test]
    fn pointer_conversion_decodes_escapes() {
        let p = FieldPath::from_pointer("/address/geo/lat");
        assert_eq!(p.to_string(), "address.geo.lat");
        let escaped = FieldPath::from_pointer("/a~1b/c~0d");
        assert_eq!(escaped.segments(), &["a/b".to_string(), "c~d".to_string()]);
        assert!(FieldPath::from_pointer("").is_root());
    }

    #[test]
    fn prefixed_puts_prefix_first() {
        let inner = FieldPath::parse("email").unwrap();
        let outer = FieldPath::root().index(3);
        assert_eq!(inner.prefixed(&outer).to_string(), "3.email");
    }

    #[test]
    fn resolve_walks_objects_and_arrays() {
        let doc = json!({
            "address": {"geo": {"lat": "-37.3159"}},
            "items": [{"id": 1}, {"id": 2}]
        });
        let lat = FieldPath::parse("address.geo.lat").unwrap();
        assert_eq!(lat.resolve(&doc), Some(&json!("-37.3159")));
        let second = FieldPath::parse("items.1.id").unwrap();
        assert_eq!(second.resolve(&doc), Some(&json!(2)));
        assert_eq!(FieldPath::root().resolve(&doc), Some(&doc));
    }

    #[test]
    fn resolve_missing_returns_none() {
        let doc = json!({"a": {"b": 1}, "list": [1]});
        assert!(FieldPath::parse("a.c").unwrap().resolve(&doc).is_none());
        assert!(FieldPath::parse("a.b.c").unwrap().resolve(&doc).is_none());
        assert!(FieldPath::parse("list.5").unwrap().resolve(&doc).is_none());
        assert!(FieldPath::parse("list.x").unwrap().resolve(&doc).is_none());
    }

    #[test]
    fn serde_uses_text_form() {
        let p = FieldPath::parse("company.name").unwrap();
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"company.name\"");
        let back: FieldPath = serde_json::from_str("\"company.name\"").unwrap();
        assert_eq!(back, p);
        assert!(serde_json::from_str::<FieldPath>("\"a..b\"").is_err());
    }

    proptest! {
        #[test]
        fn display_parse_roundtrip(segments in prop::collection::vec("[a-zA-Z0-9_]{1,8}", 0..6)) {
            let path = segments
                .iter()
                .fold(FieldPath::root(), |p, s| p.child(s.as_str()));
            let reparsed = FieldPath::parse(&path.to_string()).unwrap();
            prop_assert_eq!(reparsed, path);
        }
    }
}
