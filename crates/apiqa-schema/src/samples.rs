//! Canonical sample documents for the builtin schemas.
//!
//! Used as test fixtures and by `apiqa sample`. The valid documents are the
//! first `user` and `post` records served by JSONPlaceholder.

use serde_json::{json, Value};
use std::str::FromStr;

/// Length of every string in a [`SampleKind::LongFields`] document.
pub const LONG_FIELD_LEN: usize = 300;

/// Which variant of a sample document to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleKind {
    /// Satisfies every constraint.
    Valid,
    /// `{}`: every required field missing.
    Empty,
    /// The valid document with every string replaced by a long one.
    LongFields,
    /// The valid user with a malformed `email`. User only.
    InvalidEmail,
}

impl SampleKind {
    /// All kinds.
    pub fn all() -> &'static [SampleKind] {
        &[Self::Valid, Self::Empty, Self::LongFields, Self::InvalidEmail]
    }

    /// Kebab-case name used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Empty => "empty",
            Self::LongFields => "long-fields",
            Self::InvalidEmail => "invalid-email",
        }
    }
}

impl std::fmt::Display for SampleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SampleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown sample kind: {s:?}"))
    }
}

/// A user that satisfies the builtin `user` schema.
pub fn valid_user() -> Value {
    json!({
        "id": 1,
        "name": "Leanne Graham",
        "username": "Bret",
        "email": "Sincere@april.biz",
        "address": {
            "street": "Kulas Light",
            "suite": "Apt. 556",
            "city": "Gwenborough",
            "zipcode": "92998-3874",
            "geo": {
                "lat": "-37.3159",
                "lng": "81.1496"
            }
        },
        "phone": "1-770-736-8031 x56442",
        "website": "hildegard.org",
        "company": {
            "name": "Romaguera-Crona",
            "catchPhrase": "Multi-layered client-server neural-net",
            "bs": "harness real-time e-markets"
        }
    })
}

/// A post that satisfies the builtin `post` schema.
pub fn valid_post() -> Value {
    json!({
        "userId": 1,
        "id": 1,
        "title": "sunt aut facere repellat provident occaecati excepturi optio reprehenderit",
        "body": "quia et suscipit\nsuscipit recusandae consequuntur expedita et cum\nreprehenderit molestiae ut ut quas totam\nnostrum rerum est autem sunt rem eveniet architecto"
    })
}

/// Produce a sample for a builtin schema, or `None` when the schema is not
/// builtin or the kind does not apply to it.
pub fn sample(schema_name: &str, kind: SampleKind) -> Option<Value> {
    let valid = match schema_name {
        "user" => valid_user(),
        "post" => valid_post(),
        _ => return None,
    };
    match kind {
        SampleKind::Valid => Some(valid),
        SampleKind::Empty => Some(json!({})),
        SampleKind::LongFields => Some(lengthen_strings(valid)),
        SampleKind::InvalidEmail => {
            if schema_name != "user" {
                return None;
            }
            let mut user = valid;
            user["email"] = json!("invalid-email-format");
            Some(user)
        }
    }
}

fn lengthen_strings(value: Value) -> Value {
    match value {
        Value::String(_) => Value::String("x".repeat(LONG_FIELD_LEN)),
        Value::Array(items) => Value::Array(items.into_iter().map(lengthen_strings).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, lengthen_strings(v)))
                .collect(),
        ),
        other => other,
    }
}
