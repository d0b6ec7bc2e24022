//! # apiqa-core — Foundational Types
//!
//! Leaf crate of the apiqa workspace. Defines the small set of primitives
//! shared by schema validation and response assertions.
//!
//! ## Key Types
//!
//! 1. **`FieldPath`.** Dot-separated location inside a JSON document
//!    (`address.geo.lat`). Violations and assertion failures always report
//!    locations as a `FieldPath`, never as a bare string.
//!
//! 2. **`JsonType`.** The seven JSON Schema primitive types. One enum,
//!    exhaustive `match` everywhere.
//!
//! 3. **`UnknownSchemaError`.** The only fatal outcome of a validation
//!    call. Malformed data is never an error; it is a violation.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `apiqa-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod json_type;
pub mod path;

pub use error::{PathError, UnknownSchemaError};
pub use json_type::JsonType;
pub use path::FieldPath;
