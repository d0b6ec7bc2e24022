//! # apiqa-assert — Response Assertions
//!
//! Assertions a test runner applies to an HTTP response after fetching it.
//! This crate performs no I/O: responses arrive as [`ResponseSnapshot`]s,
//! built in code or deserialized from a recorded-response file.
//!
//! ## Modules
//!
//! - [`snapshot`] — the recorded response.
//! - [`assertions`] — one function per check, each returning
//!   `Result<_, AssertionError>` and logging its outcome.
//! - [`check`] — [`Expectations`], a bundle of checks that runs them all and
//!   reports every failure at once.
//! - [`advanced`] — security headers, pagination metadata, date fields,
//!   rate-limit headers, and consistency across several responses.
//!
//! ## Crate Policy
//!
//! - Failures carry expected and actual values.
//! - Key paths use [`apiqa_core::FieldPath`] syntax (`address.geo.lat`,
//!   `0.email`).

pub mod advanced;
pub mod assertions;
pub mod check;
pub mod error;
pub mod snapshot;

pub use check::{CheckOutcome, CheckReport, Expectations};
pub use error::AssertionError;
pub use snapshot::ResponseSnapshot;
