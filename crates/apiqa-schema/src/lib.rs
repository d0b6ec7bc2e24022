//! # apiqa-schema — Response Schema Validation
//!
//! Validates decoded API response bodies against named resource schemas
//! (`user`, `post`, plus any loaded from disk).
//!
//! ## Validation (`registry`, `schema`, `constraint`)
//!
//! Schema documents are draft-07 JSON Schema. At load time each document is
//! compiled into an ordered list of [`Constraint`]s per field. Validation
//! walks the value once, evaluating every constraint with a single routine,
//! and returns a [`ValidationResult`] carrying every violation found:
//!
//! - [`SchemaRegistry::validate`] — one resource.
//! - [`SchemaRegistry::validate_each`] — a JSON array of resources.
//! - [`validate`] — shortcut over the builtin registry.
//!
//! Malformed data never produces an error. The only failure is asking for a
//! schema that is not registered ([`UnknownSchemaError`]).
//!
//! ## Conformance (`conformance`)
//!
//! [`SchemaRegistry::conformance`] runs the complete draft-07 validator from
//! the `jsonschema` crate against the original document, for schemas or
//! keywords beyond the compiled subset.
//!
//! ## Reports and Samples
//!
//! [`BatchReport`] aggregates many results into a pass/fail summary.
//! [`samples`] provides canonical documents for test fixtures.
//!
//! ## Crate Policy
//!
//! - Depends only on `apiqa-core` internally.
//! - Schemas are immutable after load; the registry is `Send + Sync`.
//! - No network access: `$ref` resolution is local only.

pub mod conformance;
pub mod constraint;
pub mod error;
pub mod registry;
pub mod report;
pub mod result;
pub mod samples;
pub mod schema;

pub use apiqa_core::UnknownSchemaError;
pub use constraint::{AnchoredPattern, Constraint, FieldRule, Shape, StringFormat};
pub use error::SchemaError;
pub use registry::{builtin_registry, validate, SchemaRegistry};
pub use report::{BatchReport, ReportEntry, ReportSummary};
pub use result::{ValidationResult, Violation, ViolationKind};
pub use samples::SampleKind;
pub use schema::Schema;
